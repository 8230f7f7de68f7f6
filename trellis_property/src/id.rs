// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property handles.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Untyped handle to a registered property.
///
/// Indexes into a [`PropertyRegistry`](crate::PropertyRegistry). Handles are
/// only meaningful for the registry that produced them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Wraps a raw registry index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Raw registry index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed handle to a registered property whose values are `T`.
///
/// Returned by [`PropertyRegistry::register`](crate::PropertyRegistry::register).
/// The type parameter only exists at compile time; the handle is as small as
/// a [`PropertyId`].
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Reinterprets an untyped handle.
    ///
    /// Store operations check the registered value type, so a handle built
    /// with the wrong `T` yields [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch)
    /// rather than undefined behavior.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped handle.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

impl<T> From<Property<T>> for PropertyId {
    fn from(property: Property<T>) -> Self {
        property.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_is_compact() {
        assert_eq!(format!("{}", PropertyId::new(7)), "#7");
        assert_eq!(format!("{:?}", PropertyId::new(7)), "PropertyId(7)");
    }

    #[test]
    fn typed_handle_is_copy_and_converts() {
        let width: Property<f64> = Property::from_id(PropertyId::new(3));
        let copy = width;
        assert_eq!(copy, width);
        assert_eq!(PropertyId::from(width), PropertyId::new(3));
        assert!(format!("{width:?}").contains("f64"));
    }
}
