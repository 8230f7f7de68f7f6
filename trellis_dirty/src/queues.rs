// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One [`DirtyQueue`] per channel.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::channel::{Channel, ChannelSet};
use crate::queue::DirtyQueue;

/// A bank of ordered work queues, one per channel.
///
/// The bank is sized up front to the number of channels the host uses.
/// Channels with an index beyond that count are a programming error and
/// panic.
///
/// ```
/// use trellis_dirty::{Channel, DirtyQueues};
///
/// const STYLE: Channel = Channel::new(0);
/// const MEASURE: Channel = Channel::new(1);
///
/// let mut queues = DirtyQueues::<u32>::new(2);
/// queues.push(7, MEASURE);
/// queues.push(4, STYLE);
///
/// assert_eq!(queues.first_pending([STYLE, MEASURE]), Some(STYLE));
/// assert_eq!(queues.pop(STYLE), Some(4));
/// assert_eq!(queues.first_pending([STYLE, MEASURE]), Some(MEASURE));
/// ```
#[derive(Clone, Debug)]
pub struct DirtyQueues<K>
where
    K: Copy + Eq + Hash,
{
    queues: Vec<DirtyQueue<K>>,
}

impl<K> DirtyQueues<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates `channels` empty queues.
    #[must_use]
    pub fn new(channels: usize) -> Self {
        Self::with_capacity(channels, 0)
    }

    /// Creates `channels` empty queues, each with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(channels: usize, capacity: usize) -> Self {
        assert!(channels <= 64, "at most 64 channels are supported");
        Self {
            queues: (0..channels)
                .map(|_| DirtyQueue::with_capacity(capacity))
                .collect(),
        }
    }

    /// Returns the queue for `channel`.
    #[must_use]
    pub fn queue(&self, channel: Channel) -> &DirtyQueue<K> {
        &self.queues[channel.index() as usize]
    }

    /// Queues `key` on `channel`; returns `true` if newly queued.
    pub fn push(&mut self, key: K, channel: Channel) -> bool {
        self.queues[channel.index() as usize].push(key)
    }

    /// Queues `key` on every channel in `channels`.
    pub fn push_all(&mut self, key: K, channels: ChannelSet) {
        for channel in channels {
            self.push(key, channel);
        }
    }

    /// Removes `key` from `channel`'s queue; returns `true` if it was queued.
    pub fn remove(&mut self, key: K, channel: Channel) -> bool {
        self.queues[channel.index() as usize].remove(key)
    }

    /// Removes `key` from every queue.
    pub fn remove_key(&mut self, key: K) {
        for queue in &mut self.queues {
            queue.remove(key);
        }
    }

    /// Returns `true` if `key` is queued on `channel`.
    #[must_use]
    pub fn contains(&self, key: K, channel: Channel) -> bool {
        self.queue(channel).contains(key)
    }

    /// Pops the first key of `channel`'s queue.
    pub fn pop(&mut self, channel: Channel) -> Option<K> {
        self.queues[channel.index() as usize].pop_front()
    }

    /// Returns `true` if `channel` has pending keys.
    #[must_use]
    pub fn has_pending(&self, channel: Channel) -> bool {
        !self.queue(channel).is_empty()
    }

    /// Returns `true` if no queue has pending keys.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queues.iter().all(DirtyQueue::is_empty)
    }

    /// The first channel in `order` that has pending keys.
    pub fn first_pending(&self, order: impl IntoIterator<Item = Channel>) -> Option<Channel> {
        order.into_iter().find(|c| self.has_pending(*c))
    }

    /// Sum of the queues' generations; changes whenever any queue changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.queues
            .iter()
            .fold(0_u64, |acc, q| acc.wrapping_add(q.generation()))
    }

    /// Empties every queue.
    pub fn clear_all(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}
