// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element type hierarchy.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

/// Identifies a registered element type.
///
/// Tags are handed out by [`TypeHierarchy::register`] in registration order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(pub u32);

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.0).finish()
    }
}

#[derive(Debug)]
struct TypeEntry {
    name: &'static str,
    base: Option<TypeTag>,
}

/// Single-inheritance table of element types.
///
/// Property lookup by name and class event handlers both walk a type's
/// ancestor chain, most-derived first.
///
/// ```rust
/// use trellis_property::TypeHierarchy;
///
/// let mut types = TypeHierarchy::new();
/// let element = types.register("UIElement", None);
/// let button = types.register("Button", Some(element));
///
/// assert!(types.is_a(button, element));
/// assert!(!types.is_a(element, button));
/// assert_eq!(types.ancestors(button).collect::<Vec<_>>(), [button, element]);
/// ```
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    entries: Vec<TypeEntry>,
    by_name: HashMap<&'static str, TypeTag>,
}

impl TypeHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type deriving from `base`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered or `base` is not a known tag.
    pub fn register(&mut self, name: &'static str, base: Option<TypeTag>) -> TypeTag {
        assert!(
            !self.by_name.contains_key(name),
            "Type '{name}' is already registered"
        );
        if let Some(base) = base {
            assert!(
                (base.0 as usize) < self.entries.len(),
                "Base type {base:?} is not registered"
            );
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "type counts are far below u32::MAX"
        )]
        let tag = TypeTag(self.entries.len() as u32);
        self.entries.push(TypeEntry { name, base });
        self.by_name.insert(name, tag);
        tag
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a type up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<TypeTag> {
        self.by_name.get(name).copied()
    }

    /// Name of a registered type.
    #[must_use]
    pub fn name(&self, tag: TypeTag) -> Option<&'static str> {
        self.entries.get(tag.0 as usize).map(|e| e.name)
    }

    /// Direct base of a registered type.
    #[must_use]
    pub fn base(&self, tag: TypeTag) -> Option<TypeTag> {
        self.entries.get(tag.0 as usize).and_then(|e| e.base)
    }

    /// `tag` followed by each of its bases, most-derived first.
    pub fn ancestors(&self, tag: TypeTag) -> impl Iterator<Item = TypeTag> + '_ {
        let start = ((tag.0 as usize) < self.entries.len()).then_some(tag);
        core::iter::successors(start, |t| self.base(*t))
    }

    /// Returns `true` if `tag` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        self.ancestors(tag).any(|t| t == ancestor)
    }
}
