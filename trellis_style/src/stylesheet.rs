// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule-based style selection.
//!
//! A [`StyleSheet`] is an ordered list of [`StyleRule`]s, each pairing a
//! [`Selector`] with a [`Style`]. For an element, every matching rule
//! contributes; when two rules set the same property, the one with the
//! higher `(specificity, declaration order)` wins.

use alloc::rc::Rc;
use alloc::vec::Vec;

use trellis_property::{ErasedValue, Property, PropertyId, PropertyValue};

use crate::selector::{Selector, SelectorInputs, Specificity};
use crate::style::Style;

/// Produces the styles that apply to an element.
///
/// This is the seam between the layout host and wherever style rules come
/// from (a parsed document, a theme, hand-built rules).
pub trait StyleProvider {
    /// Appends the styles matching `inputs` to `out`, lowest precedence first.
    fn matching_styles(&self, inputs: &SelectorInputs<'_>, out: &mut Vec<Style>);

    /// Flattens the matching styles into one value per property.
    ///
    /// `out` is cleared and refilled sorted by [`PropertyId`]; `scratch` is
    /// reusable working storage.
    fn resolve(
        &self,
        inputs: &SelectorInputs<'_>,
        scratch: &mut Vec<Style>,
        out: &mut Vec<(PropertyId, ErasedValue)>,
    ) {
        scratch.clear();
        out.clear();
        self.matching_styles(inputs, scratch);
        for style in scratch.iter() {
            for (id, value) in style.entries() {
                match out.binary_search_by_key(&id, |(pid, _)| *pid) {
                    Ok(i) => out[i].1 = value.clone(),
                    Err(i) => out.insert(i, (id, value.clone())),
                }
            }
        }
    }
}

/// One rule of a [`StyleSheet`].
#[derive(Clone, Debug)]
pub struct StyleRule {
    selector: Selector,
    style: Style,
    order: u32,
}

impl StyleRule {
    /// The rule's selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The rule's setters.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Declaration order within its sheet.
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    fn rank(&self) -> (Specificity, u32) {
        (self.selector.specificity(), self.order)
    }
}

#[derive(Debug, Default)]
struct StyleSheetData {
    rules: Vec<StyleRule>,
}

/// An immutable, shared collection of style rules.
///
/// ```rust
/// use trellis_property::{PropertyMetadata, PropertyRegistry};
/// use trellis_style::{ClassId, Selector, SelectorInputs, StyleBuilder, StyleSheetBuilder};
///
/// let mut registry = PropertyRegistry::new();
/// let element = registry.register_type("UIElement", None);
/// let opacity = registry.register(element, "Opacity", PropertyMetadata::new(1.0_f32));
///
/// const DIM: ClassId = ClassId(1);
/// let sheet = StyleSheetBuilder::new()
///     .rule(Selector::any().class(DIM), StyleBuilder::new().set(opacity, 0.5).build())
///     .rule(Selector::of_type(element), StyleBuilder::new().set(opacity, 0.9).build())
///     .build();
///
/// let classes = [DIM];
/// let inputs = SelectorInputs::new(None, Some(element), &classes, &[]);
/// // The class rule is more specific than the type rule.
/// assert_eq!(sheet.get_value_ref(&inputs, opacity), Some(&0.5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    inner: Rc<StyleSheetData>,
}

impl StyleSheet {
    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.rules.len()
    }

    /// Returns `true` if the sheet has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.rules.is_empty()
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &StyleRule> + '_ {
        self.inner.rules.iter()
    }

    /// Returns `true` if both handles share the same rules.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Rules matching `inputs`, lowest precedence first.
    #[must_use]
    pub fn matching_rules(&self, inputs: &SelectorInputs<'_>) -> Vec<&StyleRule> {
        let mut matched: Vec<&StyleRule> = self
            .inner
            .rules
            .iter()
            .filter(|r| r.selector.matches(inputs))
            .collect();
        matched.sort_by_key(|r| r.rank());
        matched
    }

    /// The winning value of one property for `inputs`.
    #[must_use]
    pub fn get_value_ref<T: PropertyValue>(
        &self,
        inputs: &SelectorInputs<'_>,
        property: Property<T>,
    ) -> Option<&T> {
        self.inner
            .rules
            .iter()
            .filter(|r| r.selector.matches(inputs))
            .filter_map(|r| r.style.get(property).map(|v| (r.rank(), v)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, v)| v)
    }
}

impl StyleProvider for StyleSheet {
    fn matching_styles(&self, inputs: &SelectorInputs<'_>, out: &mut Vec<Style>) {
        let mut ranked: Vec<(Specificity, u32, &Style)> = self
            .inner
            .rules
            .iter()
            .filter(|r| r.selector.matches(inputs))
            .map(|r| (r.selector.specificity(), r.order, &r.style))
            .collect();
        ranked.sort_by_key(|(spec, order, _)| (*spec, *order));
        out.reserve(ranked.len());
        out.extend(ranked.into_iter().map(|(_, _, style)| style.clone()));
    }
}

/// Builder for [`StyleSheet`].
#[derive(Debug, Default)]
pub struct StyleSheetBuilder {
    rules: Vec<StyleRule>,
    next_order: u32,
}

impl StyleSheetBuilder {
    /// Starts an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; later rules win ties in specificity.
    #[must_use]
    pub fn rule(mut self, selector: Selector, style: Style) -> Self {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        self.rules.push(StyleRule {
            selector,
            style,
            order,
        });
        self
    }

    /// Finishes the sheet.
    #[must_use]
    pub fn build(self) -> StyleSheet {
        StyleSheet {
            inner: Rc::new(StyleSheetData { rules: self.rules }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{ClassId, PseudoClassId};
    use crate::style::StyleBuilder;
    use trellis_property::{PropertyMetadata, PropertyRegistry, TypeTag};

    struct Fixture {
        element: TypeTag,
        width: Property<f64>,
        height: Property<f64>,
        sheet: StyleSheet,
    }

    const WIDE: ClassId = ClassId(1);
    const HOVER: PseudoClassId = PseudoClassId(0);

    fn fixture() -> (PropertyRegistry, Fixture) {
        let mut registry = PropertyRegistry::new();
        let element = registry.register_type("UIElement", None);
        let width = registry.register(element, "Width", PropertyMetadata::new(0.0_f64));
        let height = registry.register(element, "Height", PropertyMetadata::new(0.0_f64));
        let sheet = StyleSheetBuilder::new()
            .rule(
                Selector::any().pseudo(HOVER),
                StyleBuilder::new().set(width, 30.0).build(),
            )
            .rule(
                Selector::of_type(element),
                StyleBuilder::new().set(width, 10.0).set(height, 5.0).build(),
            )
            .rule(
                Selector::any().class(WIDE),
                StyleBuilder::new().set(width, 20.0).build(),
            )
            .build();
        (
            registry,
            Fixture {
                element,
                width,
                height,
                sheet,
            },
        )
    }

    #[test]
    fn winner_is_most_specific() {
        let (_registry, f) = fixture();
        let classes = [WIDE];
        let pseudos = [HOVER];
        let plain = SelectorInputs::new(None, Some(f.element), &[], &[]);
        let wide = SelectorInputs::new(None, Some(f.element), &classes, &[]);
        let hot = SelectorInputs::new(None, Some(f.element), &classes, &pseudos);
        assert_eq!(f.sheet.get_value_ref(&plain, f.width), Some(&10.0));
        assert_eq!(f.sheet.get_value_ref(&wide, f.width), Some(&20.0));
        assert_eq!(f.sheet.get_value_ref(&hot, f.width), Some(&30.0));
        assert_eq!(f.sheet.get_value_ref(&hot, f.height), Some(&5.0));
    }

    #[test]
    fn matching_rules_are_precedence_ordered() {
        let (_registry, f) = fixture();
        let classes = [WIDE];
        let pseudos = [HOVER];
        let hot = SelectorInputs::new(None, Some(f.element), &classes, &pseudos);
        let orders: Vec<u32> = f.sheet.matching_rules(&hot).iter().map(|r| r.order()).collect();
        assert_eq!(orders, [1, 2, 0]);
    }

    #[test]
    fn resolve_flattens_with_later_winning() {
        let (_registry, f) = fixture();
        let classes = [WIDE];
        let inputs = SelectorInputs::new(None, Some(f.element), &classes, &[]);
        let mut scratch = Vec::new();
        let mut out = Vec::new();
        f.sheet.resolve(&inputs, &mut scratch, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, f.width.id());
        assert_eq!(out[0].1.downcast_ref::<f64>(), Some(&20.0));
        assert_eq!(out[1].1.downcast_ref::<f64>(), Some(&5.0));
    }

    #[test]
    fn declaration_order_breaks_ties() {
        let mut registry = PropertyRegistry::new();
        let element = registry.register_type("UIElement", None);
        let width = registry.register(element, "Width", PropertyMetadata::new(0.0_f64));
        let sheet = StyleSheetBuilder::new()
            .rule(Selector::any(), StyleBuilder::new().set(width, 1.0).build())
            .rule(Selector::any(), StyleBuilder::new().set(width, 2.0).build())
            .build();
        assert_eq!(sheet.get_value_ref(&SelectorInputs::EMPTY, width), Some(&2.0));
        assert!(sheet.ptr_eq(&sheet.clone()));
        assert!(!sheet.ptr_eq(&StyleSheet::default()));
    }
}
