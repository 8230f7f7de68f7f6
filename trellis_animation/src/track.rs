// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyframe tracks.
//!
//! A [`KeyframeTrack`] holds keyframes sorted by time. Sampling before the
//! first keyframe yields the first value and after the last keyframe the last
//! value (the track holds its end). Between two keyframes the value is
//! interpolated with the *later* keyframe's easing, so a keyframe's easing
//! describes how the value arrives at it.

use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use trellis_property::ErasedValue;

use crate::animatable::Animatable;
use crate::easing::Easing;

/// One keyframe.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Offset from the start of the storyboard, in seconds.
    pub time: f64,
    /// Value at `time`.
    pub value: T,
    /// Curve used on the segment ending at this keyframe.
    pub easing: Easing,
}

/// Keyframes for one property.
///
/// ```rust
/// use trellis_animation::{Easing, KeyframeTrack};
///
/// let fade = KeyframeTrack::new()
///     .key(0.0, 0.0_f32, Easing::Linear)
///     .key(0.5, 1.0, Easing::Linear);
/// assert_eq!(fade.sample(0.25), Some(0.5));
/// assert_eq!(fade.sample(9.0), Some(1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeTrack<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: Animatable> KeyframeTrack<T> {
    /// Creates an empty track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyframe, keeping the track sorted.
    ///
    /// A keyframe at the same time as an existing one is placed after it.
    #[must_use]
    pub fn key(mut self, time: f64, value: T, easing: Easing) -> Self {
        let at = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes.insert(at, Keyframe { time, value, easing });
        self
    }

    /// Keyframes in time order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// The value at `time`, or `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f64) -> Option<T> {
        let first = self.keyframes.first()?;
        if time <= first.time {
            return Some(first.value.clone());
        }
        let next = self.keyframes.partition_point(|k| k.time <= time);
        let Some(to) = self.keyframes.get(next) else {
            return self.keyframes.last().map(|k| k.value.clone());
        };
        let from = &self.keyframes[next - 1];
        let span = to.time - from.time;
        let t = if span > 0.0 {
            (time - from.time) / span
        } else {
            1.0
        };
        Some(from.value.interpolate(&to.value, to.easing.sample(t)))
    }
}

/// A track with its value type erased, as stored in a storyboard.
pub trait AnimationTrack: fmt::Debug {
    /// [`TypeId`] of the values the track produces.
    fn value_type(&self) -> TypeId;

    /// Type name of the values the track produces.
    fn value_type_name(&self) -> &'static str;

    /// Time of the last keyframe.
    fn duration(&self) -> f64;

    /// The boxed value at `time`.
    fn sample_erased(&self, time: f64) -> Option<ErasedValue>;
}

impl<T: Animatable> AnimationTrack for KeyframeTrack<T> {
    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn duration(&self) -> f64 {
        Self::duration(self)
    }

    fn sample_erased(&self, time: f64) -> Option<ErasedValue> {
        self.sample(time).map(ErasedValue::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_track_samples_nothing() {
        let t = KeyframeTrack::<f64>::new();
        assert_eq!(t.sample(0.0), None);
        assert_eq!(t.duration(), 0.0);
    }

    #[test]
    fn keys_sort_and_hold_ends() {
        let t = KeyframeTrack::new()
            .key(1.0, 10.0_f64, Easing::Linear)
            .key(0.0, 0.0, Easing::Linear)
            .key(2.0, 0.0, Easing::Step);
        assert_eq!(t.duration(), 2.0);
        assert_eq!(t.sample(-1.0), Some(0.0));
        assert_eq!(t.sample(0.5), Some(5.0));
        assert_eq!(t.sample(1.0), Some(10.0));
        // Step easing on the segment ending at 2.0 holds 10 until the end.
        assert_eq!(t.sample(1.9), Some(10.0));
        assert_eq!(t.sample(2.0), Some(0.0));
        assert_eq!(t.sample(5.0), Some(0.0));
    }

    #[test]
    fn coincident_keys_jump() {
        let t = KeyframeTrack::new()
            .key(0.0, 1_i32, Easing::Linear)
            .key(1.0, 2, Easing::Linear)
            .key(1.0, 5, Easing::Linear);
        assert_eq!(t.sample(1.0), Some(5));
    }

    #[test]
    fn erased_samples_carry_the_type() {
        let t = KeyframeTrack::new().key(0.0, 1.0_f32, Easing::Linear);
        let track: &dyn AnimationTrack = &t;
        assert_eq!(track.value_type(), TypeId::of::<f32>());
        let v = track.sample_erased(0.0).unwrap();
        assert_eq!(v.downcast_ref::<f32>(), Some(&1.0));
    }
}
