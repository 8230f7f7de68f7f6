// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::id::PropertyId;

/// Errors from property store operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyError {
    /// The id does not belong to the registry in use.
    Unregistered(PropertyId),
    /// A value's type is not the property's registered type.
    TypeMismatch {
        /// The property written or read.
        property: PropertyId,
        /// Registered value type.
        expected: &'static str,
        /// Type that was supplied.
        found: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered(id) => write!(f, "property {id} is not registered"),
            Self::TypeMismatch {
                property,
                expected,
                found,
            } => write!(
                f,
                "property {property} holds `{expected}` values, got `{found}`"
            ),
        }
    }
}

impl core::error::Error for PropertyError {}
