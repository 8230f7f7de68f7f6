// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style stage: resolving the style provider into styled values.

use std::rc::Rc;

use smallvec::SmallVec;
use trellis_property::{ErasedValue, Layer, PropertyChange, PropertyError, PropertyId};
use trellis_style::{SelectorInputs, StyleProvider};

use crate::element::ElementId;
use crate::error::LayoutError;
use crate::host::UiHost;
use crate::properties::{STYLE, Stage};

fn record(
    id: ElementId,
    result: Result<Option<PropertyChange>, PropertyError>,
    changes: &mut SmallVec<[PropertyChange; 8]>,
    first_error: &mut Option<LayoutError>,
) {
    match result {
        Ok(Some(change)) => changes.push(change),
        Ok(None) => {}
        Err(error) => {
            first_error.get_or_insert(LayoutError::Property { element: id, error });
        }
    }
}

impl UiHost {
    /// Replaces the style provider and restyles the whole tree.
    pub fn set_style_provider(&mut self, provider: Option<Rc<dyn StyleProvider>>) {
        tracing::debug!(installed = provider.is_some(), "style provider changed");
        self.style_provider = provider;
        if let Some(root) = self.root {
            self.invalidate_style_subtree(root);
        }
    }

    /// The current style provider.
    #[must_use]
    pub fn style_provider(&self) -> Option<&Rc<dyn StyleProvider>> {
        self.style_provider.as_ref()
    }

    /// Re-resolves the styled layer of `id`.
    ///
    /// Styled values the provider no longer supplies are cleared. Restyling
    /// always invalidates the element's measure.
    pub fn style(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let element = self.element_mut(id)?;
        if !element.is_attached() {
            element.set_valid(Stage::Style, true);
            return Ok(());
        }
        let result = self.compute_style(id);
        self.queues.remove(id, STYLE);
        let element = self.element_mut(id)?;
        match result {
            Ok(()) => {
                tracing::trace!(?id, "style");
                element.set_valid(Stage::Style, true);
                self.invalidate(id, Stage::Measure);
                Ok(())
            }
            Err(error) => {
                element.set_valid(Stage::Style, false);
                Err(error)
            }
        }
    }

    fn compute_style(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let mut scratch = core::mem::take(&mut self.style_scratch);
        let mut values = core::mem::take(&mut self.style_values);
        values.clear();
        if let Some(provider) = &self.style_provider {
            let element = self.element(id)?;
            let inputs = SelectorInputs::new(
                element.name.as_deref(),
                Some(element.type_tag),
                &element.classes,
                &element.pseudos,
            );
            provider.resolve(&inputs, &mut scratch, &mut values);
        }
        let result = self.apply_styled_values(id, &values);
        self.style_scratch = scratch;
        self.style_values = values;
        result
    }

    /// Makes the styled layer of `id` hold exactly `values` (sorted by id).
    fn apply_styled_values(
        &mut self,
        id: ElementId,
        values: &[(PropertyId, ErasedValue)],
    ) -> Result<(), LayoutError> {
        let element = self.arena.get_mut(id).ok_or(LayoutError::StaleElement(id))?;
        let stale: SmallVec<[PropertyId; 8]> = element
            .properties
            .ids_in_layer(Layer::Styled)
            .filter(|pid| values.binary_search_by_key(pid, |(p, _)| *p).is_err())
            .collect();

        let mut changes: SmallVec<[PropertyChange; 8]> = SmallVec::new();
        let mut first_error = None;
        for pid in &stale {
            let result = element
                .properties
                .clear_erased(*pid, Layer::Styled, &self.registry);
            record(id, result, &mut changes, &mut first_error);
        }
        for (pid, value) in values {
            let result = element.properties.set_erased(
                *pid,
                Layer::Styled,
                value.clone(),
                &self.registry,
            );
            record(id, result, &mut changes, &mut first_error);
        }
        for change in changes {
            self.notify(id, Some(change));
        }
        first_error.map_or(Ok(()), Err)
    }
}
