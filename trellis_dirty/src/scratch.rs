// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable scratch buffers for subtree walks.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

/// Reusable storage for depth-first walks over a tree of keys.
///
/// Subtree invalidation (stylesheet changes, reparenting, teardown) runs
/// often enough that allocating a fresh stack per walk shows up in profiles.
/// Keep one scratch per host and reuse it; buffers retain their capacity.
///
/// ```
/// use trellis_dirty::TraversalScratch;
///
/// // 0 -> [1, 2], 1 -> [3]
/// let children = |k: u32, out: &mut Vec<u32>| match k {
///     0 => out.extend([1, 2]),
///     1 => out.push(3),
///     _ => {}
/// };
///
/// let mut scratch = TraversalScratch::new();
/// let mut order = Vec::new();
/// scratch.preorder(0, children, |k| order.push(k));
/// assert_eq!(order, [0, 1, 3, 2]);
/// ```
#[derive(Debug, Default)]
pub struct TraversalScratch<K>
where
    K: Copy + Eq + Hash,
{
    stack: Vec<K>,
    children: Vec<K>,
    visited: HashSet<K>,
}

impl<K> TraversalScratch<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            children: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Creates an empty scratch buffer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
            visited: HashSet::with_capacity(capacity),
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.children.clear();
        self.visited.clear();
    }

    /// Visits `root` and its descendants in pre-order.
    ///
    /// `children` appends the children of a key, in order, to the buffer it
    /// is handed. A key reached twice is visited once.
    pub fn preorder(
        &mut self,
        root: K,
        mut children: impl FnMut(K, &mut Vec<K>),
        mut visit: impl FnMut(K),
    ) {
        self.reset();
        self.stack.push(root);
        while let Some(key) = self.stack.pop() {
            if !self.visited.insert(key) {
                continue;
            }
            visit(key);
            self.children.clear();
            children(key, &mut self.children);
            self.stack.extend(self.children.drain(..).rev());
        }
    }

    /// Collects `root` and its descendants in pre-order into `out`.
    pub fn collect_preorder(
        &mut self,
        root: K,
        children: impl FnMut(K, &mut Vec<K>),
        out: &mut Vec<K>,
    ) {
        self.preorder(root, children, |k| out.push(k));
    }
}
