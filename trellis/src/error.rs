// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the host and its layout pipeline.

use std::fmt;

use kurbo::Size;
use trellis_property::PropertyError;

use crate::element::ElementId;

/// A usage error. It aborts the operation that raised it, never the whole
/// pipeline pass.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// A measure override produced a non-finite size.
    NonFiniteDesiredSize {
        /// The element being measured.
        element: ElementId,
        /// What the override returned.
        size: Size,
    },
    /// No property with this name exists on the element's type chain.
    UnknownProperty {
        /// The element the name was resolved against.
        element: ElementId,
        /// The name that was looked up.
        name: Box<str>,
    },
    /// A property store operation failed for an element.
    Property {
        /// The element whose store was written.
        element: ElementId,
        /// The underlying error, which names the property.
        error: PropertyError,
    },
    /// The element already has a parent, or is the host root.
    AlreadyParented {
        /// The element that was being attached.
        element: ElementId,
    },
    /// Attaching `child` under `parent` would make an element its own ancestor.
    WouldCreateCycle {
        /// Intended parent.
        parent: ElementId,
        /// Intended child.
        child: ElementId,
    },
    /// The handle refers to a destroyed element.
    StaleElement(ElementId),
    /// The pipeline still had work after the configured number of passes.
    NotConverged {
        /// Passes that were run.
        passes: usize,
    },
}

impl LayoutError {
    /// The element the error is about, if any.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::NonFiniteDesiredSize { element, .. }
            | Self::UnknownProperty { element, .. }
            | Self::Property { element, .. }
            | Self::AlreadyParented { element } => Some(*element),
            Self::WouldCreateCycle { child, .. } => Some(*child),
            Self::StaleElement(element) => Some(*element),
            Self::NotConverged { .. } => None,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteDesiredSize { element, size } => write!(
                f,
                "measure of {element:?} must produce a finite desired size, got {}x{}",
                size.width, size.height
            ),
            Self::UnknownProperty { element, name } => {
                write!(f, "{element:?} has no property named `{name}`")
            }
            Self::Property { element, error } => write!(f, "{element:?}: {error}"),
            Self::AlreadyParented { element } => {
                write!(f, "{element:?} already has a parent")
            }
            Self::WouldCreateCycle { parent, child } => write!(
                f,
                "adding {child:?} under {parent:?} would create a cycle"
            ),
            Self::StaleElement(element) => write!(f, "{element:?} has been destroyed"),
            Self::NotConverged { passes } => {
                write!(f, "layout did not converge after {passes} passes")
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Property { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Diagnostics collected during one pipeline run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutErrors {
    errors: Vec<LayoutError>,
}

impl LayoutErrors {
    /// Returns `true` if nothing went wrong.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Diagnostics in the order they were raised.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutError> + '_ {
        self.errors.iter()
    }

    /// Returns `true` if any diagnostic names `element`.
    #[must_use]
    pub fn mentions(&self, element: ElementId) -> bool {
        self.errors.iter().any(|e| e.element() == Some(element))
    }

    /// Records `error` unless an identical diagnostic is already present.
    pub(crate) fn push(&mut self, error: LayoutError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub(crate) fn extend(&mut self, other: Self) {
        for error in other.errors {
            self.push(error);
        }
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<LayoutError> for LayoutErrors {
    fn from(error: LayoutError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for LayoutErrors {
    type Item = LayoutError;
    type IntoIter = std::vec::IntoIter<LayoutError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for LayoutErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("no layout errors"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for LayoutErrors {}
