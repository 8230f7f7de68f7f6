// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback state of one running storyboard.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use trellis_property::{ErasedValue, PropertyId};

use crate::storyboard::Storyboard;
use crate::track::AnimationTrack;

/// Playback state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockState {
    /// Not started, or stopped.
    #[default]
    Stopped,
    /// Advancing on every tick.
    Playing,
    /// Holding the current time.
    Paused,
    /// Ran to the end of a non-looping storyboard; values are held.
    Finished,
}

/// One property of one element driven by a clock.
#[derive(Clone)]
pub struct ClockBinding<K> {
    /// Animated element.
    pub element: K,
    /// Animated property.
    pub property: PropertyId,
    /// Values over time.
    pub track: Rc<dyn AnimationTrack>,
}

impl<K: fmt::Debug> fmt::Debug for ClockBinding<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockBinding")
            .field("element", &self.element)
            .field("property", &self.property)
            .field("track", &self.track.value_type_name())
            .finish()
    }
}

/// A storyboard bound to a root element and an elapsed-time cursor.
///
/// Clocks are handed out by [`ClockPool`](crate::ClockPool); the host binds
/// the resolved `(element, property, track)` triples and then drives the
/// clock with [`advance`](Self::advance).
#[derive(Debug)]
pub struct StoryboardClock<K> {
    storyboard: Storyboard,
    root: K,
    elapsed: f64,
    state: ClockState,
    bindings: Vec<ClockBinding<K>>,
}

impl<K: Copy> StoryboardClock<K> {
    pub(crate) fn new(storyboard: Storyboard, root: K, bindings: Vec<ClockBinding<K>>) -> Self {
        debug_assert!(bindings.is_empty(), "recycled bindings must be cleared");
        Self {
            storyboard,
            root,
            elapsed: 0.0,
            state: ClockState::Stopped,
            bindings,
        }
    }

    pub(crate) fn into_bindings(self) -> Vec<ClockBinding<K>> {
        let mut bindings = self.bindings;
        bindings.clear();
        bindings
    }

    /// The storyboard being played.
    #[must_use]
    pub fn storyboard(&self) -> &Storyboard {
        &self.storyboard
    }

    /// The element the storyboard was begun on.
    #[must_use]
    pub fn root(&self) -> K {
        self.root
    }

    /// Seconds since [`start`](Self::start), excluding paused time.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Elapsed time mapped onto the storyboard timeline.
    #[must_use]
    pub fn local_time(&self) -> f64 {
        self.storyboard.local_time(self.elapsed).0
    }

    /// Adds a driven property.
    pub fn bind(&mut self, element: K, property: PropertyId, track: Rc<dyn AnimationTrack>) {
        self.bindings.push(ClockBinding {
            element,
            property,
            track,
        });
    }

    /// Driven properties in binding order.
    #[must_use]
    pub fn bindings(&self) -> &[ClockBinding<K>] {
        &self.bindings
    }

    /// Drops the bindings for `element`; returns how many were removed.
    pub fn unbind_element(&mut self, element: K) -> usize
    where
        K: PartialEq,
    {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.element != element);
        before - self.bindings.len()
    }

    /// Rewinds and starts playing.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.state = ClockState::Playing;
    }

    /// Stops playback; the elapsed time is kept until the next start.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    /// Pauses a playing clock.
    pub fn pause(&mut self) {
        if self.state == ClockState::Playing {
            self.state = ClockState::Paused;
        }
    }

    /// Resumes a paused clock.
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Playing;
        }
    }

    /// Advances a playing clock by `dt` seconds.
    ///
    /// Returns `true` if time moved, meaning the bindings should be
    /// re-sampled.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.state != ClockState::Playing || dt.is_nan() || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        if self.storyboard.local_time(self.elapsed).1 {
            self.state = ClockState::Finished;
        }
        true
    }

    /// Samples every binding at the current local time.
    pub fn sample(&self, mut apply: impl FnMut(&ClockBinding<K>, ErasedValue)) {
        let time = self.local_time();
        for binding in &self.bindings {
            if let Some(value) = binding.track.sample_erased(time) {
                apply(binding, value);
            }
        }
    }
}
