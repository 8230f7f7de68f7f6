// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channels: the stages a key can be queued for.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Identifies one invalidation channel, usually one pipeline stage.
///
/// A channel is a single `u8` index below 64. Host crates define their
/// channels as constants and decide what order they are drained in.
///
/// ```
/// use trellis_dirty::Channel;
///
/// const STYLE: Channel = Channel::new(0);
/// const MEASURE: Channel = Channel::new(1);
/// assert!(STYLE < MEASURE);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Creates a channel with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`, since [`ChannelSet`] is a 64-bit mask.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!(index < 64, "Channel index must be less than 64");
        Self(index)
    }

    /// Returns the index of this channel.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Converts this channel into a single-element [`ChannelSet`].
    #[must_use]
    pub const fn into_set(self) -> ChannelSet {
        ChannelSet(1_u64 << self.0)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Channel").field(&self.0).finish()
    }
}

/// A compact set of up to 64 channels.
///
/// Property metadata uses a `ChannelSet` to declare which stages a value
/// change invalidates; property writes report the set back to the caller.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ChannelSet(u64);

impl ChannelSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if no channel is in the set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `channel` is in the set.
    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        (self.0 & (1_u64 << channel.0)) != 0
    }

    /// Returns the set with `channel` added.
    #[must_use]
    pub const fn with(self, channel: Channel) -> Self {
        Self(self.0 | (1_u64 << channel.0))
    }

    /// Adds a channel.
    pub fn insert(&mut self, channel: Channel) {
        self.0 |= 1_u64 << channel.0;
    }

    /// Removes a channel.
    pub fn remove(&mut self, channel: Channel) {
        self.0 &= !(1_u64 << channel.0);
    }

    /// Number of channels in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates channels in ascending index order.
    #[must_use]
    pub const fn iter(self) -> ChannelSetIter {
        ChannelSetIter { bits: self.0 }
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for ChannelSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChannelSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Channel> for ChannelSet {
    fn from(channel: Channel) -> Self {
        channel.into_set()
    }
}

impl IntoIterator for ChannelSet {
    type Item = Channel;
    type IntoIter = ChannelSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the channels of a [`ChannelSet`], lowest index first.
#[derive(Clone, Debug)]
pub struct ChannelSetIter {
    bits: u64,
}

impl Iterator for ChannelSetIter {
    type Item = Channel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, reason = "trailing_zeros <= 63")]
        let index = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1;
        Some(Channel(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.bits.count_ones() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for ChannelSetIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const STYLE: Channel = Channel::new(0);
    const MEASURE: Channel = Channel::new(1);
    const POSITION: Channel = Channel::new(3);

    #[test]
    #[should_panic(expected = "Channel index must be less than 64")]
    fn channel_index_is_bounded() {
        let _ = Channel::new(64);
    }

    #[test]
    fn insert_remove_contains() {
        let mut set = ChannelSet::EMPTY;
        assert!(set.is_empty());
        set.insert(MEASURE);
        set.insert(MEASURE);
        assert_eq!(set.len(), 1);
        assert!(set.contains(MEASURE));
        assert!(!set.contains(STYLE));
        set.remove(MEASURE);
        assert!(set.is_empty());
    }

    #[test]
    fn iterates_in_stage_order() {
        let set = POSITION.into_set() | STYLE.into_set() | MEASURE.into_set();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, [STYLE, MEASURE, POSITION]);
        assert_eq!(set.iter().len(), 3);
    }

    #[test]
    fn with_is_const_friendly() {
        const BOTH: ChannelSet = ChannelSet::EMPTY.with(STYLE).with(POSITION);
        assert!(BOTH.contains(STYLE));
        assert!(BOTH.contains(POSITION));
        assert!(!BOTH.contains(MEASURE));
    }
}
