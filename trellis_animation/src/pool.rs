// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pooled storyboard clocks addressed by generational handles.

use alloc::vec::Vec;

use crate::clock::{ClockBinding, StoryboardClock};
use crate::storyboard::Storyboard;

/// Handle to a clock in a [`ClockPool`].
///
/// A slot index plus a generation. Each retrieve bumps the slot's
/// generation, so a handle kept after [`ClockPool::release`] never aliases
/// the clock that later reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClockId {
    index: u32,
    generation: u32,
}

impl ClockId {
    /// Slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct ClockSlot<K> {
    generation: u32,
    clock: Option<StoryboardClock<K>>,
    // Binding storage of the last released clock, kept for reuse.
    spare: Vec<ClockBinding<K>>,
}

/// An arena of storyboard clocks.
///
/// Clocks are checked out with [`retrieve`](Self::retrieve) and returned with
/// [`release`](Self::release). Returned slots keep their binding storage, so
/// a steady stream of short animations stops allocating once warm.
#[derive(Debug)]
pub struct ClockPool<K> {
    slots: Vec<ClockSlot<K>>,
    free: Vec<u32>,
    active: usize,
}

impl<K> Default for ClockPool<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: 0,
        }
    }
}

impl<K: Copy> ClockPool<K> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool with `capacity` idle slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self::default();
        pool.slots.reserve(capacity);
        for _ in 0..capacity {
            let index = pool.push_slot();
            pool.free.push(index);
        }
        pool
    }

    fn push_slot(&mut self) -> u32 {
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        assert!(index < u32::MAX, "Too many clock slots");
        self.slots.push(ClockSlot {
            generation: 0,
            clock: None,
            spare: Vec::new(),
        });
        index
    }

    /// Number of checked-out clocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active
    }

    /// Returns `true` if no clock is checked out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Number of slots, checked out or idle.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Checks out a stopped clock for `storyboard` on `root`.
    pub fn retrieve(&mut self, storyboard: &Storyboard, root: K) -> ClockId {
        // Reuse the most recently freed slot.
        let index = match self.free.pop() {
            Some(index) => index,
            None => self.push_slot(),
        };
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let bindings = core::mem::take(&mut slot.spare);
        slot.clock = Some(StoryboardClock::new(storyboard.clone(), root, bindings));
        self.active += 1;
        ClockId {
            index,
            generation: slot.generation,
        }
    }

    /// Returns a clock to the pool; `false` for a stale or unknown handle.
    pub fn release(&mut self, id: ClockId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation {
            return false;
        }
        let Some(clock) = slot.clock.take() else {
            return false;
        };
        slot.spare = clock.into_bindings();
        self.free.push(id.index);
        self.active -= 1;
        true
    }

    /// Returns `true` if `id` refers to a checked-out clock.
    #[must_use]
    pub fn contains(&self, id: ClockId) -> bool {
        self.get(id).is_some()
    }

    /// The clock for `id`.
    #[must_use]
    pub fn get(&self, id: ClockId) -> Option<&StoryboardClock<K>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.clock.as_ref()
    }

    /// The clock for `id`, mutably.
    pub fn get_mut(&mut self, id: ClockId) -> Option<&mut StoryboardClock<K>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.clock.as_mut()
    }

    /// Checked-out clocks in slot order.
    pub fn active(&self) -> impl Iterator<Item = (ClockId, &StoryboardClock<K>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let clock = slot.clock.as_ref()?;
            #[expect(clippy::cast_possible_truncation, reason = "slot count fits in u32")]
            let id = ClockId {
                index: i as u32,
                generation: slot.generation,
            };
            Some((id, clock))
        })
    }

    /// Writes the ids of checked-out clocks into `out`.
    pub fn active_ids(&self, out: &mut Vec<ClockId>) {
        out.clear();
        out.extend(self.active().map(|(id, _)| id));
    }
}
