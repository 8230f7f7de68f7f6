// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Animation: storyboards and the clocks that play them.
//!
//! ## Overview
//!
//! - [`KeyframeTrack`] describes one value over time, with an [`Easing`] per
//!   segment. Any [`Animatable`] property value can be tracked.
//! - [`Storyboard`] groups tracks by property *name* under target
//!   [`Selector`](trellis_style::Selector)s. Names are resolved against an
//!   element's type chain when the storyboard is begun, so one storyboard can
//!   animate `Opacity` on any element type that has it.
//! - [`StoryboardClock`] plays a storyboard on one root element. It holds the
//!   resolved `(element, property, track)` bindings and an elapsed-time
//!   cursor; [`LoopBehavior`] maps elapsed time onto the timeline.
//! - [`ClockPool`] owns clocks and hands out generational [`ClockId`]s.
//!   Released clocks are reset and their storage reused.
//!
//! This crate only computes values. Writing them into the animated property
//! layer, and invalidating layout as a result, is the host's job.
//!
//! ```rust
//! use trellis_animation::{ClockPool, Easing, KeyframeTrack, Storyboard};
//! use trellis_property::PropertyId;
//!
//! let board = Storyboard::builder()
//!     .animate("Width", KeyframeTrack::new().key(0.0, 0.0_f64, Easing::Linear).key(1.0, 50.0, Easing::Linear))
//!     .build();
//!
//! let mut pool = ClockPool::<u32>::new();
//! let id = pool.retrieve(&board, 0);
//! let clock = pool.get_mut(id).unwrap();
//! let track = board.targets()[0].animations[0].track.clone();
//! clock.bind(0, PropertyId::new(3), track);
//! clock.start();
//! clock.advance(0.5);
//!
//! let mut width = None;
//! clock.sample(|_, v| width = v.downcast_ref::<f64>().copied());
//! assert_eq!(width, Some(25.0));
//! assert!(pool.release(id));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animatable;
mod clock;
mod easing;
mod pool;
mod storyboard;
mod track;

pub use animatable::Animatable;
pub use clock::{ClockBinding, ClockState, StoryboardClock};
pub use easing::Easing;
pub use pool::{ClockId, ClockPool};
pub use storyboard::{
    LoopBehavior, Storyboard, StoryboardBuilder, StoryboardId, StoryboardTarget, TargetAnimation,
};
pub use track::{AnimationTrack, Keyframe, KeyframeTrack};
