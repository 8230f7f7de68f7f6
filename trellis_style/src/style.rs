// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared property setter bundles.

use alloc::rc::Rc;
use alloc::vec::Vec;

use trellis_property::{ErasedValue, Property, PropertyId, PropertyValue};

/// An immutable, cheaply cloned set of property values.
///
/// Entries are kept sorted by [`PropertyId`]. Many rules and elements can
/// share one `Style`; cloning only bumps a reference count.
///
/// ```rust
/// use trellis_property::{PropertyMetadata, PropertyRegistry};
/// use trellis_style::StyleBuilder;
///
/// let mut registry = PropertyRegistry::new();
/// let element = registry.register_type("UIElement", None);
/// let opacity = registry.register(element, "Opacity", PropertyMetadata::new(1.0_f32));
///
/// let faded = StyleBuilder::new().set(opacity, 0.5).build();
/// let shared = faded.clone();
/// assert_eq!(shared.get(opacity), Some(&0.5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Style {
    inner: Rc<StyleData>,
}

#[derive(Debug, Default)]
struct StyleData {
    entries: Vec<(PropertyId, ErasedValue)>,
}

impl Style {
    /// Returns `true` if the style sets nothing.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Number of setters.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.inner
            .entries
            .binary_search_by_key(&id, |(pid, _)| *pid)
            .ok()
            .map(|i| &self.inner.entries[i].1)
    }

    /// The value this style sets for `property`.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.find(property.id()).and_then(ErasedValue::downcast_ref)
    }

    /// The boxed value this style sets for `id`.
    #[must_use]
    pub fn get_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find(id)
    }

    /// Returns `true` if the style sets `id`.
    #[must_use]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.find(id).is_some()
    }

    /// Setters in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (PropertyId, &ErasedValue)> + '_ {
        self.inner.entries.iter().map(|(id, v)| (*id, v))
    }

    /// Ids this style sets, ascending.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.inner.entries.iter().map(|(id, _)| *id)
    }
}

/// Builder for [`Style`].
#[derive(Debug, Default)]
pub struct StyleBuilder {
    entries: Vec<(PropertyId, ErasedValue)>,
}

impl StyleBuilder {
    /// Starts an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a typed value, replacing an earlier one for the same property.
    #[must_use]
    pub fn set<T: PropertyValue>(self, property: Property<T>, value: T) -> Self {
        self.set_erased(property.id(), ErasedValue::new(value))
    }

    /// Sets a boxed value.
    ///
    /// The value's type is checked against the registry when the style is
    /// applied, not here.
    #[must_use]
    pub fn set_erased(mut self, id: PropertyId, value: ErasedValue) -> Self {
        match self.entries.binary_search_by_key(&id, |(pid, _)| *pid) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (id, value)),
        }
        self
    }

    /// Finishes the style.
    #[must_use]
    pub fn build(self) -> Style {
        Style {
            inner: Rc::new(StyleData {
                entries: self.entries,
            }),
        }
    }
}
