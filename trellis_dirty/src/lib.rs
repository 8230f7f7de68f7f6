// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Dirty: ordered, deduplicated invalidation queues.
//!
//! A retained UI recomputes cached state in stages (style, measure, arrange,
//! position). Each stage owns a queue of keys whose output may be stale. This
//! crate provides the queue primitives:
//!
//! - **Channels** ([`Channel`], [`ChannelSet`]): small indices identifying a
//!   stage, and bitmasks of them used to declare what a change affects.
//! - **Queues** ([`DirtyQueue`]): an insertion-ordered set with `O(1)`
//!   membership, push, pop and removal.
//! - **Queue banks** ([`DirtyQueues`]): one queue per channel, with helpers
//!   to find the earliest stage that still has work.
//! - **Scratch buffers** ([`TraversalScratch`]): reusable depth-first walk
//!   state for subtree invalidation.
//!
//! ## Draining to a fixed point
//!
//! ```rust
//! use trellis_dirty::{Channel, DirtyQueues};
//!
//! const STYLE: Channel = Channel::new(0);
//! const MEASURE: Channel = Channel::new(1);
//! const ORDER: [Channel; 2] = [STYLE, MEASURE];
//!
//! let mut queues = DirtyQueues::<u32>::new(2);
//! queues.push(1, STYLE);
//!
//! let mut log = Vec::new();
//! while let Some(stage) = queues.first_pending(ORDER) {
//!     while let Some(key) = queues.pop(stage) {
//!         log.push((stage.index(), key));
//!         // Styling a key makes it need measuring.
//!         if stage == STYLE {
//!             queues.push(key, MEASURE);
//!         }
//!     }
//! }
//! assert_eq!(log, [(0, 1), (1, 1)]);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod channel;
mod queue;
mod queues;
mod scratch;

pub use channel::{Channel, ChannelSet, ChannelSetIter};
pub use queue::DirtyQueue;
pub use queues::DirtyQueues;
pub use scratch::TraversalScratch;
