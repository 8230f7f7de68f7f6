// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path state: enter/leave transitions when a tracked root→target path changes.
//!
//! Hover and keyboard focus both follow a single node, but the nodes
//! *around* it matter too: moving the pointer from one child to its sibling
//! leaves the first child and enters the second while the shared parent stays
//! hovered. [`PathState`] keeps the current path and computes the minimal set
//! of transitions.
//!
//! ```
//! use trellis_responder::path::{PathState, Transition};
//! let mut hover: PathState<u32> = PathState::new();
//! assert_eq!(hover.update_path(&[1, 2]), vec![Transition::Enter(1), Transition::Enter(2)]);
//! assert_eq!(hover.update_path(&[1, 3]), vec![Transition::Leave(2), Transition::Enter(3)]);
//! ```

use alloc::vec::Vec;

/// Tracks one root→target path.
///
/// Leaves are reported inner-most first, enters outer-most first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathState<K: Copy + Eq> {
    current: Vec<K>,
}

/// A change in path membership.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition<K> {
    /// The node joined the path.
    Enter(K),
    /// The node left the path.
    Leave(K),
}

impl<K: Copy + Eq> PathState<K> {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
        }
    }

    /// The current root→target path.
    pub fn current_path(&self) -> &[K] {
        &self.current
    }

    /// The innermost node of the path.
    pub fn target(&self) -> Option<K> {
        self.current.last().copied()
    }

    /// Returns `true` if `node` is on the path.
    pub fn contains(&self, node: K) -> bool {
        self.current.contains(&node)
    }

    /// Empties the path, returning a leave for every node.
    pub fn clear(&mut self) -> Vec<Transition<K>> {
        let out = self.current.iter().rev().map(|&k| Transition::Leave(k)).collect();
        self.current.clear();
        out
    }

    /// Switches to `new_path`.
    pub fn update_path(&mut self, new_path: &[K]) -> Vec<Transition<K>> {
        let shared = self
            .current
            .iter()
            .zip(new_path)
            .take_while(|(a, b)| a == b)
            .count();

        let mut out = Vec::with_capacity(self.current.len() + new_path.len() - 2 * shared);
        out.extend(self.current[shared..].iter().rev().map(|&k| Transition::Leave(k)));
        out.extend(new_path[shared..].iter().map(|&k| Transition::Enter(k)));
        self.current.clear();
        self.current.extend_from_slice(new_path);
        out
    }

    /// Drops `node` and everything below it without reporting transitions.
    ///
    /// For nodes removed from the tree, which can no longer receive leave
    /// notifications.
    pub fn forget(&mut self, node: K) {
        if let Some(i) = self.current.iter().position(|&k| k == node) {
            self.current.truncate(i);
        }
    }
}
