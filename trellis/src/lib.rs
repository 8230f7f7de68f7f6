// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis: a retained UI element tree with layered properties, a four stage
//! layout pipeline, routed input events and storyboards.
//!
//! ## Overview
//!
//! [`UiHost`] owns everything: the element arena, the property and event
//! registries, the dirty queues, the style provider and the clock pool.
//! Several hosts are fully independent.
//!
//! - Elements are created with a type ([`TypeTag`](trellis_property::TypeTag))
//!   and an [`ElementBehavior`] that supplies measure, arrange, position,
//!   clip, draw, hit testing and input hooks. [`Container`], [`Stack`] and
//!   [`Leaf`] cover the common cases.
//! - Property values live in layers (default, styled, local, animated).
//!   Changing an effective value invalidates the stages its registration
//!   names: measure changes also invalidate the parent's measure.
//! - [`UiHost::run_pending_layout`] drains the style, measure, arrange and
//!   position queues in that order until nothing is left.
//! - Input entry points ([`UiHost::pointer_moved`], [`UiHost::key`], ...)
//!   route [`BuiltinEvents`] through the tree, tunnelling and bubbling as
//!   registered, and track hover and focus.
//! - [`UiHost::begin_storyboard`] plays a
//!   [`Storyboard`](trellis_animation::Storyboard) on a subtree;
//!   [`UiHost::update`] advances every clock and lays out again.
//!
//! ```rust
//! use kurbo::Size;
//! use trellis::{Leaf, Stack, UiHost};
//!
//! let mut host = UiHost::new();
//! let props = *host.properties();
//! let root = host.create_element(props.stack_panel, Stack);
//! let label = host.create_element(props.ui_element, Leaf::new(Size::new(40.0, 12.0)));
//! host.set_root(root).unwrap();
//! host.add_child(root, label).unwrap();
//!
//! host.set_local(label, props.width, Some(60.0)).unwrap();
//! host.update(1.0 / 60.0).unwrap();
//! assert_eq!(host.layout(label).unwrap().desired_size, Size::new(60.0, 12.0));
//! assert!(host.is_idle());
//! ```
//!
//! Frame loop: feed input, call [`UiHost::update`], then [`UiHost::draw`]
//! into a [`RenderSink`].

mod animation;
mod behavior;
mod config;
mod element;
mod error;
mod host;
mod input;
mod invalidation;
mod pipeline;
mod properties;
mod render;
mod styling;

pub use trellis_animation;
pub use trellis_dirty;
pub use trellis_property;
pub use trellis_responder;
pub use trellis_style;

pub use behavior::{ArrangeOptions, Container, ElementBehavior, IntrinsicContent, Leaf, Stack};
pub use config::HostConfig;
pub use element::{ElementFlags, ElementId, LayoutCache};
pub use error::{LayoutError, LayoutErrors};
pub use host::UiHost;
pub use input::{
    BuiltinEvents, ButtonState, FocusChangedArgs, Key, KeyArgs, Modifiers, MouseButton,
    PointerArgs, PointerButtonArgs, TextInputArgs, WheelArgs,
};
pub use properties::{
    ARRANGE, Affects, BuiltinProperties, FOCUS, HOVER, HorizontalAlignment, MEASURE, Orientation,
    POSITION, STYLE, Stage, VerticalAlignment, Visibility,
};
pub use render::{RenderInfo, RenderSink};
