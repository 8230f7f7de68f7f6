// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased property values.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// Bound for anything stored in a property.
///
/// Equality is what makes idempotent writes free: a write whose coerced value
/// equals the current effective value is never reported as a change.
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> PropertyValue for T {}

/// A boxed property value of some [`PropertyValue`] type.
///
/// Style entries, animation samples and name-based writes travel as
/// `ErasedValue`s and are downcast by the property's registered type.
///
/// ```rust
/// use trellis_property::ErasedValue;
///
/// let a = ErasedValue::new(4_i32);
/// let b = ErasedValue::new(4_i32);
/// assert!(a.value_eq(&b));
/// assert!(!a.value_eq(&ErasedValue::new(4_i64)));
/// assert_eq!(a.into_inner::<i32>().ok(), Some(4));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ErasedValue {
    /// Boxes a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// [`TypeId`] of the boxed value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the boxed value, for diagnostics.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the boxed value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    /// Unboxes the value as a `T`, or gives it back unchanged.
    pub fn into_inner<T: 'static>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.inner.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type id checked above"),
        }
    }

    /// Compares two values; values of different types are never equal.
    #[must_use]
    pub fn value_eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_dyn(other.inner.as_any())
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
            type_name: self.type_name,
        }
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_dyn(f)
    }
}

trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|o| self == o)
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn downcast_checks_type() {
        let value = ErasedValue::new(2.5_f64);
        assert!(value.is::<f64>());
        assert_eq!(value.downcast_ref::<f64>(), Some(&2.5));
        assert_eq!(value.downcast_ref::<f32>(), None);
        assert_eq!(value.type_name(), "f64");
    }

    #[test]
    fn into_inner_returns_value_on_mismatch() {
        let value = ErasedValue::new(String::from("left"));
        let value = value.into_inner::<i32>().unwrap_err();
        assert_eq!(value.into_inner::<String>().unwrap(), "left");
    }

    #[test]
    fn equality_and_clone() {
        let a = ErasedValue::new(String::from("x"));
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, ErasedValue::new(String::from("y")));
    }

    #[test]
    fn debug_shows_inner_value() {
        assert_eq!(format!("{:?}", ErasedValue::new(12_u8)), "12");
    }
}
