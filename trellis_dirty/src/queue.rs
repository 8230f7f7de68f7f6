// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, deduplicated work queue for a single channel.

use alloc::collections::VecDeque;
use core::hash::Hash;

use hashbrown::HashMap;

/// An insertion-ordered set of keys waiting for one pipeline stage.
///
/// Membership is the source of truth for "this key's stage output may be
/// stale". Pushing a key that is already queued keeps its original position.
///
/// Removal of an arbitrary key is `O(1)`: the key is dropped from the
/// membership map and its slot in the ring is skipped lazily when it reaches
/// the front. Each push is tagged with a sequence number so a key that is
/// removed and pushed again is queued at the back, not at its old position.
///
/// ```
/// use trellis_dirty::DirtyQueue;
///
/// let mut queue = DirtyQueue::<u32>::new();
/// assert!(queue.push(3));
/// assert!(queue.push(1));
/// assert!(!queue.push(3));
///
/// queue.remove(3);
/// assert_eq!(queue.pop_front(), Some(1));
/// assert!(queue.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    order: VecDeque<(K, u64)>,
    members: HashMap<K, u64>,
    next_seq: u64,
    generation: u64,
}

impl<K> Default for DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
            members: HashMap::new(),
            next_seq: 0,
            generation: 0,
        }
    }

    /// Creates an empty queue with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashMap::with_capacity(capacity),
            next_seq: 0,
            generation: 0,
        }
    }

    /// Incremented by every mutation that changes membership.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of queued keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if `key` is queued.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.members.contains_key(&key)
    }

    /// Appends `key` unless it is already queued.
    ///
    /// Returns `true` if the key was newly queued.
    pub fn push(&mut self, key: K) -> bool {
        if self.members.contains_key(&key) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.members.insert(key, seq);
        self.order.push_back((key, seq));
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Removes `key` from the queue.
    ///
    /// Returns `true` if the key was queued.
    pub fn remove(&mut self, key: K) -> bool {
        if self.members.remove(&key).is_none() {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        self.compact_if_sparse();
        true
    }

    /// Returns the first live key without removing it.
    #[must_use]
    pub fn front(&self) -> Option<K> {
        self.order
            .iter()
            .find(|(key, seq)| self.is_live(*key, *seq))
            .map(|(key, _)| *key)
    }

    /// Removes and returns the first live key.
    pub fn pop_front(&mut self) -> Option<K> {
        while let Some((key, seq)) = self.order.pop_front() {
            if self.is_live(key, seq) {
                self.members.remove(&key);
                self.generation = self.generation.wrapping_add(1);
                return Some(key);
            }
        }
        None
    }

    /// Iterates queued keys in queue order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.order
            .iter()
            .filter(|(key, seq)| self.is_live(*key, *seq))
            .map(|(key, _)| *key)
    }

    /// Removes every key, keeping allocated capacity.
    pub fn clear(&mut self) {
        if self.members.is_empty() && self.order.is_empty() {
            return;
        }
        self.order.clear();
        self.members.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    fn is_live(&self, key: K, seq: u64) -> bool {
        self.members.get(&key) == Some(&seq)
    }

    /// Drops skipped slots once they dominate the ring.
    fn compact_if_sparse(&mut self) {
        if self.order.len() > 32 && self.order.len() > self.members.len() * 2 {
            let members = &self.members;
            self.order
                .retain(|(key, seq)| members.get(key) == Some(seq));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn keeps_insertion_order_without_duplicates() {
        let mut q = DirtyQueue::new();
        q.push(5_u32);
        q.push(2);
        q.push(5);
        q.push(9);
        assert_eq!(q.len(), 3);
        assert_eq!(q.iter().collect::<Vec<_>>(), [5, 2, 9]);
    }

    #[test]
    fn removed_then_requeued_goes_to_back() {
        let mut q = DirtyQueue::new();
        q.push(1_u32);
        q.push(2);
        assert!(q.remove(1));
        assert!(!q.remove(1));
        q.push(1);
        assert_eq!(q.front(), Some(2));
        assert_eq!(q.pop_front(), Some(2));
        assert_eq!(q.pop_front(), Some(1));
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn push_while_draining_is_seen() {
        let mut q = DirtyQueue::new();
        q.push(1_u32);
        let mut seen = Vec::new();
        while let Some(k) = q.pop_front() {
            seen.push(k);
            if k < 4 {
                q.push(k + 1);
            }
        }
        assert_eq!(seen, [1, 2, 3, 4]);
    }

    #[test]
    fn generation_tracks_membership_changes() {
        let mut q = DirtyQueue::new();
        let g0 = q.generation();
        q.push(1_u32);
        let g1 = q.generation();
        assert!(g1 > g0);
        q.push(1);
        assert_eq!(q.generation(), g1, "duplicate push is not a mutation");
        q.remove(7);
        assert_eq!(q.generation(), g1, "removing an absent key is not a mutation");
        q.clear();
        assert!(q.generation() > g1);
    }

    #[test]
    fn compaction_preserves_order() {
        let mut q = DirtyQueue::new();
        for k in 0..100_u32 {
            q.push(k);
        }
        for k in 0..90_u32 {
            q.remove(k);
        }
        assert_eq!(q.iter().collect::<Vec<_>>(), (90..100).collect::<Vec<_>>());
        assert_eq!(q.pop_front(), Some(90));
    }
}
