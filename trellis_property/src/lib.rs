// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Property: dependency properties with layered values.
//!
//! ## Core Concepts
//!
//! - **Types** ([`TypeHierarchy`], [`TypeTag`]): a single-inheritance table of
//!   element types. Properties are declared on a type and visible from every
//!   type deriving from it.
//! - **Registration** ([`PropertyRegistry`], [`PropertyMetadata`]): each
//!   property is registered once with a default value, the
//!   [`ChannelSet`](trellis_dirty::ChannelSet) it invalidates, and optional
//!   coerce and changed callbacks.
//! - **Storage** ([`PropertyStore`]): per-object slots with three layers.
//!   The effective value is `animated > local > styled > default`.
//!
//! Every write compares the new effective value with the old one using the
//! value type's `PartialEq`. Only real changes are reported (as a
//! [`PropertyChange`]) and only real changes run the changed callback, so
//! idempotent writes never cause invalidation.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_dirty::Channel;
//! use trellis_property::{PropertyMetadataBuilder, PropertyRegistry, PropertyStore};
//!
//! const MEASURE: Channel = Channel::new(1);
//!
//! let mut registry = PropertyRegistry::new();
//! let element = registry.register_type("UIElement", None);
//! let width = registry.register(
//!     element,
//!     "Width",
//!     PropertyMetadataBuilder::new(0.0_f64)
//!         .affects_channels(MEASURE.into_set())
//!         .coerce(|w, _| w.max(0.0))
//!         .build(),
//! );
//!
//! let mut store = PropertyStore::new();
//! let change = store.set_local(width, -5.0, &registry).unwrap();
//! // Coerced to 0.0, which is the default: nothing changed.
//! assert!(change.is_none());
//!
//! let change = store.set_local(width, 120.0, &registry).unwrap().unwrap();
//! assert!(change.channels.contains(MEASURE));
//! assert_eq!(*store.effective(width, &registry), 120.0);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod id;
mod metadata;
mod registry;
mod store;
mod types;
mod value;

pub use error::PropertyError;
pub use id::{Property, PropertyId};
pub use metadata::{
    CoerceValueCallback, PropertyChangedCallback, PropertyMetadata, PropertyMetadataBuilder,
};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::{CoerceCx, Layer, PropertyChange, PropertyStore};
pub use types::{TypeHierarchy, TypeTag};
pub use value::{ErasedValue, PropertyValue};
