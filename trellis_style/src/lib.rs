// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Style: selector-matched style rules.
//!
//! Styles feed the *styled* layer of a
//! [`PropertyStore`](trellis_property::PropertyStore). This crate only
//! decides which values apply to an element; writing them (and the
//! invalidation that follows) belongs to the layout host.
//!
//! - [`Selector`] matches one element by name, type, classes and
//!   pseudo-classes, described by a borrowed [`SelectorInputs`].
//! - [`Style`] is a shared, immutable bundle of property values.
//! - [`StyleSheet`] orders matching rules by [`Specificity`] and declaration
//!   order, and implements [`StyleProvider`], the trait the host consumes.
//!
//! ```rust
//! use trellis_property::{PropertyMetadata, PropertyRegistry};
//! use trellis_style::{Selector, SelectorInputs, StyleBuilder, StyleProvider, StyleSheetBuilder};
//!
//! let mut registry = PropertyRegistry::new();
//! let element = registry.register_type("UIElement", None);
//! let width = registry.register(element, "Width", PropertyMetadata::new(0.0_f64));
//!
//! let sheet = StyleSheetBuilder::new()
//!     .rule(Selector::of_type(element), StyleBuilder::new().set(width, 64.0).build())
//!     .build();
//!
//! let inputs = SelectorInputs::new(None, Some(element), &[], &[]);
//! let (mut scratch, mut values) = (Vec::new(), Vec::new());
//! sheet.resolve(&inputs, &mut scratch, &mut values);
//! assert_eq!(values.len(), 1);
//! assert_eq!(values[0].1.downcast_ref::<f64>(), Some(&64.0));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod selector;
mod style;
mod stylesheet;

pub use selector::{ClassId, IdSet, PseudoClassId, Selector, SelectorInputs, Specificity};
pub use style::{Style, StyleBuilder};
pub use stylesheet::{StyleProvider, StyleRule, StyleSheet, StyleSheetBuilder};
pub use trellis_property::TypeTag;
