// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-element selectors.
//!
//! A selector is a predicate over a [`SelectorInputs`] snapshot of one
//! element: its name, type, classes and pseudo-classes. There are no
//! combinators; storyboard targets and stylesheet rules only ever ask "does
//! this element match".

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::iter::FromIterator;

use trellis_property::TypeTag;

/// Selector specificity: `(names, pseudos, classes, type)`.
///
/// Fields are ordered highest-weight first so the derived `Ord` is the
/// CSS-like lexicographic comparison.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

/// An application-defined class (`.primary`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// An application-defined or built-in pseudo-class (`:hover`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PseudoClassId(pub u32);

/// An owned, sorted, deduplicated set of ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdSet<T>(Box<[T]>);

impl<T> Default for IdSet<T> {
    fn default() -> Self {
        Self(Vec::new().into_boxed_slice())
    }
}

impl<T> IdSet<T>
where
    T: Copy + Ord,
{
    /// Builds a set, sorting and deduplicating.
    #[must_use]
    pub fn from_ids(iter: impl IntoIterator<Item = T>) -> Self {
        let mut ids: Vec<T> = iter.into_iter().collect();
        ids.sort();
        ids.dedup();
        Self(ids.into_boxed_slice())
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The ids, ascending.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, id: T) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns `true` if every id here is in the sorted slice `other`.
    #[must_use]
    pub fn is_subset_of_slice(&self, other: &[T]) -> bool {
        is_subset(self.as_slice(), other)
    }
}

impl<T> FromIterator<T> for IdSet<T>
where
    T: Copy + Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// Borrowed description of one element for matching.
///
/// `classes` and `pseudos` must be sorted and deduplicated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectorInputs<'a> {
    /// Element name, if any.
    pub name: Option<&'a str>,
    /// Element type.
    pub type_tag: Option<TypeTag>,
    /// Sorted, unique classes.
    pub classes: &'a [ClassId],
    /// Sorted, unique pseudo-classes.
    pub pseudos: &'a [PseudoClassId],
}

impl SelectorInputs<'static> {
    /// Inputs with nothing set.
    pub const EMPTY: Self = Self {
        name: None,
        type_tag: None,
        classes: &[],
        pseudos: &[],
    };
}

impl<'a> SelectorInputs<'a> {
    /// Builds inputs, checking sortedness in debug builds.
    #[must_use]
    pub fn new(
        name: Option<&'a str>,
        type_tag: Option<TypeTag>,
        classes: &'a [ClassId],
        pseudos: &'a [PseudoClassId],
    ) -> Self {
        debug_assert!(
            is_sorted_unique(classes),
            "`classes` must be sorted and unique"
        );
        debug_assert!(
            is_sorted_unique(pseudos),
            "`pseudos` must be sorted and unique"
        );
        Self {
            name,
            type_tag,
            classes,
            pseudos,
        }
    }
}

/// A conjunction of requirements on one element.
///
/// An empty selector matches everything.
///
/// ```rust
/// use trellis_property::TypeTag;
/// use trellis_style::{ClassId, PseudoClassId, Selector, SelectorInputs};
///
/// const BUTTON: TypeTag = TypeTag(3);
/// const HOVER: PseudoClassId = PseudoClassId(0);
///
/// let hot = Selector::of_type(BUTTON).pseudo(HOVER);
/// let pseudos = [HOVER];
/// assert!(hot.matches(&SelectorInputs::new(None, Some(BUTTON), &[], &pseudos)));
/// assert!(!hot.matches(&SelectorInputs::new(None, Some(BUTTON), &[], &[])));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    /// Required element name.
    pub name: Option<Box<str>>,
    /// Required element type.
    pub type_tag: Option<TypeTag>,
    /// Required classes.
    pub required_classes: IdSet<ClassId>,
    /// Required pseudo-classes.
    pub required_pseudos: IdSet<PseudoClassId>,
}

impl Selector {
    /// A selector matching every element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A selector requiring the given type.
    #[must_use]
    pub fn of_type(type_tag: TypeTag) -> Self {
        Self {
            type_tag: Some(type_tag),
            ..Self::default()
        }
    }

    /// A selector requiring the given element name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds a required class.
    #[must_use]
    pub fn class(mut self, class: ClassId) -> Self {
        self.required_classes = self
            .required_classes
            .as_slice()
            .iter()
            .copied()
            .chain([class])
            .collect();
        self
    }

    /// Adds a required pseudo-class.
    #[must_use]
    pub fn pseudo(mut self, pseudo: PseudoClassId) -> Self {
        self.required_pseudos = self
            .required_pseudos
            .as_slice()
            .iter()
            .copied()
            .chain([pseudo])
            .collect();
        self
    }

    /// Returns `true` if the element described by `inputs` matches.
    #[must_use]
    pub fn matches(&self, inputs: &SelectorInputs<'_>) -> bool {
        if let Some(required) = &self.name
            && inputs.name != Some(&**required)
        {
            return false;
        }
        if let Some(required) = self.type_tag
            && inputs.type_tag != Some(required)
        {
            return false;
        }
        self.required_classes.is_subset_of_slice(inputs.classes)
            && self.required_pseudos.is_subset_of_slice(inputs.pseudos)
    }

    /// Specificity used to order matching rules.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let names = u32::from(self.name.is_some());
        let pseudos = u32::try_from(self.required_pseudos.len()).unwrap_or(u32::MAX);
        let classes = u32::try_from(self.required_classes.len()).unwrap_or(u32::MAX);
        let types = u32::from(self.type_tag.is_some());
        Specificity(names, pseudos, classes, types)
    }
}

fn is_sorted_unique<T: Ord>(slice: &[T]) -> bool {
    slice.windows(2).all(|w| w[0].cmp(&w[1]) == Ordering::Less)
}

fn is_subset<T: Ord>(needles: &[T], haystack: &[T]) -> bool {
    let mut j = 0;
    for needle in needles {
        loop {
            let Some(candidate) = haystack.get(j) else {
                return false;
            };
            j += 1;
            match needle.cmp(candidate) {
                Ordering::Equal => break,
                Ordering::Less => return false,
                Ordering::Greater => {}
            }
        }
    }
    true
}
