// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata: default value, invalidation channels and callbacks.

use alloc::boxed::Box;
use core::fmt;

use trellis_dirty::ChannelSet;

use crate::store::CoerceCx;
use crate::value::PropertyValue;

/// Invoked with `(old, new)` after a property's effective value changes.
pub type PropertyChangedCallback<T> = Box<dyn Fn(&T, &T) + Send + Sync>;

/// Rewrites a proposed value before it is stored.
///
/// The context gives read access to the other effective values of the same
/// object, so a coercion can depend on sibling properties.
pub type CoerceValueCallback<T> = Box<dyn Fn(T, &CoerceCx<'_>) -> T + Send + Sync>;

/// Static description of a property.
///
/// Built with [`PropertyMetadataBuilder`] and handed to
/// [`PropertyRegistry::register`](crate::PropertyRegistry::register).
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    affects_channels: ChannelSet,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Metadata with a default value and nothing else.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// The value seen when no layer is set.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Channels invalidated when the effective value changes.
    #[must_use]
    #[inline]
    pub fn affects_channels(&self) -> ChannelSet {
        self.affects_channels
    }

    /// Returns whether a changed callback is set.
    #[must_use]
    #[inline]
    pub fn has_changed_callback(&self) -> bool {
        self.changed_callback.is_some()
    }

    /// Runs the changed callback, if any.
    #[inline]
    pub fn on_changed(&self, old: &T, new: &T) {
        if let Some(callback) = &self.changed_callback {
            callback(old, new);
        }
    }

    /// Runs the coerce callback, if any.
    #[inline]
    pub fn coerce(&self, value: T, cx: &CoerceCx<'_>) -> T {
        match &self.coerce_callback {
            Some(callback) => callback(value, cx),
            None => value,
        }
    }
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("affects_channels", &self.affects_channels)
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// ```rust
/// use trellis_dirty::Channel;
/// use trellis_property::PropertyMetadataBuilder;
///
/// const MEASURE: Channel = Channel::new(1);
///
/// let opacity = PropertyMetadataBuilder::new(1.0_f32)
///     .affects_channels(MEASURE.into_set())
///     .coerce(|v, _| v.clamp(0.0, 1.0))
///     .build();
/// assert_eq!(opacity.default_value(), &1.0);
/// ```
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    default_value: T,
    affects_channels: ChannelSet,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("default_value", &self.default_value)
            .field("affects_channels", &self.affects_channels)
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Starts a builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            affects_channels: ChannelSet::EMPTY,
            changed_callback: None,
            coerce_callback: None,
        }
    }

    /// Sets the channels invalidated by a change.
    #[must_use]
    pub fn affects_channels(mut self, channels: ChannelSet) -> Self {
        self.affects_channels = channels;
        self
    }

    /// Sets the changed callback.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.changed_callback = Some(Box::new(callback));
        self
    }

    /// Sets the coerce callback.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T, &CoerceCx<'_>) -> T + Send + Sync + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Finishes the metadata.
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default_value: self.default_value,
            affects_channels: self.affects_channels,
            changed_callback: self.changed_callback,
            coerce_callback: self.coerce_callback,
        }
    }
}
