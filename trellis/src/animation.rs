// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storyboards on elements: starting, stopping and ticking pooled clocks.

use trellis_animation::{ClockId, ClockState, Storyboard, StoryboardId};
use trellis_property::Layer;
use trellis_style::SelectorInputs;

use crate::element::{ElementId, LayoutCache};
use crate::error::{LayoutError, LayoutErrors};
use crate::host::UiHost;
use crate::properties::Stage;

impl UiHost {
    /// Starts `storyboard` on `root`'s subtree and returns the clock driving it.
    ///
    /// Targets without a selector animate `root`; the others animate every
    /// element of the subtree their selector matches. Property names are
    /// resolved on each element's type chain; names that do not resolve, or
    /// resolve to a property of another value type, are skipped. The first
    /// sample is applied immediately.
    ///
    /// Beginning a storyboard that already runs on `root` replaces its clock,
    /// which goes back to the pool.
    pub fn begin_storyboard(
        &mut self,
        root: ElementId,
        storyboard: &Storyboard,
    ) -> Result<ClockId, LayoutError> {
        let previous = self.element(root)?.clock_for(storyboard.id());
        let clock_id = self.clocks.retrieve(storyboard, root);
        self.element_mut(root)?
            .storyboards
            .retain(|(id, _)| *id != storyboard.id());
        self.element_mut(root)?
            .storyboards
            .push((storyboard.id(), clock_id));

        let mut subtree = Vec::new();
        self.collect_subtree(root, &mut subtree);
        for target in storyboard.targets() {
            for &element in &subtree {
                let matches = match &target.selector {
                    None => element == root,
                    Some(selector) => {
                        let Some(e) = self.arena.get(element) else {
                            continue;
                        };
                        selector.matches(&SelectorInputs::new(
                            e.name.as_deref(),
                            Some(e.type_tag),
                            &e.classes,
                            &e.pseudos,
                        ))
                    }
                };
                if !matches {
                    continue;
                }
                for animation in &target.animations {
                    let Ok(property) = self.resolve_name(element, &animation.property) else {
                        tracing::debug!(
                            ?element,
                            property = &*animation.property,
                            "storyboard property not found, skipping"
                        );
                        continue;
                    };
                    if self
                        .registry
                        .get(property)
                        .is_none_or(|r| r.type_id() != animation.track.value_type())
                    {
                        tracing::debug!(
                            ?element,
                            property = &*animation.property,
                            track = animation.track.value_type_name(),
                            "storyboard track type does not match property, skipping"
                        );
                        continue;
                    }
                    if let Some(clock) = self.clocks.get_mut(clock_id) {
                        clock.bind(element, property, animation.track.clone());
                    }
                }
            }
        }

        if let Some(clock) = self.clocks.get_mut(clock_id) {
            clock.start();
        }
        tracing::debug!(?root, storyboard = ?storyboard.id(), ?clock_id, "storyboard begun");
        let mut result = self.apply_clock(clock_id);

        if let Some(previous) = previous {
            // Only clear what the new clock does not drive.
            let keep: Vec<_> = self
                .clocks
                .get(clock_id)
                .map(|c| c.bindings().iter().map(|b| (b.element, b.property)).collect())
                .unwrap_or_default();
            if let Some(old) = self.clocks.get(previous) {
                let stale: Vec<_> = old
                    .bindings()
                    .iter()
                    .map(|b| (b.element, b.property))
                    .filter(|pair| !keep.contains(pair))
                    .collect();
                for (element, property) in stale {
                    if self.contains(element)
                        && let Err(error) = self.clear_erased(element, property, Layer::Animated)
                    {
                        result = result.and(Err(error));
                    }
                }
            }
            self.clocks.release(previous);
        }
        result.map(|()| clock_id)
    }

    /// Stops `storyboard` on `root`: clears every value its clock drives and
    /// returns the clock to the pool. Returns `false` if it was not running.
    pub fn stop_storyboard(
        &mut self,
        root: ElementId,
        storyboard: StoryboardId,
    ) -> Result<bool, LayoutError> {
        let Some(element) = self.arena.get_mut(root) else {
            return Ok(false);
        };
        let Some(index) = element.storyboards.iter().position(|(id, _)| *id == storyboard) else {
            return Ok(false);
        };
        let (_, clock_id) = element.storyboards.remove(index);
        let bindings: Vec<_> = self
            .clocks
            .get(clock_id)
            .map(|c| c.bindings().iter().map(|b| (b.element, b.property)).collect())
            .unwrap_or_default();
        self.clocks.release(clock_id);
        tracing::debug!(?root, ?storyboard, "storyboard stopped");
        for (element, property) in bindings {
            if self.contains(element) {
                self.clear_erased(element, property, Layer::Animated)?;
            }
        }
        Ok(true)
    }

    /// The clock running `storyboard` on `root`.
    #[must_use]
    pub fn storyboard_clock(&self, root: ElementId, storyboard: StoryboardId) -> Option<ClockId> {
        self.arena.get(root)?.clock_for(storyboard)
    }

    /// State of a clock, `None` once it went back to the pool.
    #[must_use]
    pub fn clock_state(&self, clock: ClockId) -> Option<ClockState> {
        self.clocks.get(clock).map(|c| c.state())
    }

    /// Pauses a playing clock.
    pub fn pause_clock(&mut self, clock: ClockId) {
        if let Some(c) = self.clocks.get_mut(clock) {
            c.pause();
        }
    }

    /// Resumes a paused clock.
    pub fn resume_clock(&mut self, clock: ClockId) {
        if let Some(c) = self.clocks.get_mut(clock) {
            c.resume();
        }
    }

    /// Number of checked-out clocks.
    #[must_use]
    pub fn active_clocks(&self) -> usize {
        self.clocks.len()
    }

    /// Clock slots ever allocated, checked out or not.
    #[must_use]
    pub fn clock_capacity(&self) -> usize {
        self.clocks.capacity()
    }

    /// Writes the current sample of every binding into the animated layer.
    fn apply_clock(&mut self, clock_id: ClockId) -> Result<(), LayoutError> {
        let mut samples = Vec::new();
        if let Some(clock) = self.clocks.get(clock_id) {
            clock.sample(|binding, value| samples.push((binding.element, binding.property, value)));
        }
        let mut result = Ok(());
        for (element, property, value) in samples {
            if !self.contains(element) {
                continue;
            }
            if let Err(error) = self.write_erased(element, property, Layer::Animated, value) {
                result = result.and(Err(error));
            }
        }
        result
    }

    /// Advances every playing clock by `dt` seconds, applies the new samples
    /// and runs pending layout.
    pub fn update(&mut self, dt: f64) -> Result<(), LayoutErrors> {
        let mut errors = LayoutErrors::default();
        let mut ids = core::mem::take(&mut self.clock_scratch);
        self.clocks.active_ids(&mut ids);
        for &id in &ids {
            let advanced = self.clocks.get_mut(id).is_some_and(|c| c.advance(dt));
            if advanced && let Err(error) = self.apply_clock(id) {
                errors.push(error);
            }
        }
        self.clock_scratch = ids;
        if let Err(layout) = self.run_pending_layout() {
            errors.extend(layout);
        }
        errors.into_result()
    }

    /// Clears the animated values of `id` (and its descendants if
    /// `recursive`) and stops clocks from writing them again.
    pub fn clear_animations(&mut self, id: ElementId, recursive: bool) -> Result<(), LayoutError> {
        let mut targets = Vec::new();
        if recursive {
            self.collect_subtree(id, &mut targets);
        } else {
            self.element(id)?;
            targets.push(id);
        }
        for &target in &targets {
            self.unbind_from_clocks(target);
        }
        self.clear_layer(id, Layer::Animated, recursive)
    }

    /// Stops the storyboards begun on `id`, clears its animated values and
    /// resets its cached layout. The element stays alive.
    pub fn cleanup(&mut self, id: ElementId) -> Result<(), LayoutError> {
        self.stop_element_storyboards(id);
        self.clear_animations(id, false)?;
        self.element_mut(id)?.layout = LayoutCache::default();
        for stage in Stage::ALL {
            self.invalidate(id, stage);
        }
        Ok(())
    }

    pub(crate) fn stop_element_storyboards(&mut self, id: ElementId) {
        let Some(element) = self.arena.get(id) else {
            return;
        };
        let boards: Vec<StoryboardId> = element.storyboards.iter().map(|(sb, _)| *sb).collect();
        for board in boards {
            // Values of destroyed elements are skipped, so this cannot fail on them.
            if let Err(error) = self.stop_storyboard(id, board) {
                tracing::warn!(?id, %error, "failed to clear animated value");
            }
        }
    }

    pub(crate) fn unbind_from_clocks(&mut self, element: ElementId) {
        let mut ids = core::mem::take(&mut self.clock_scratch);
        self.clocks.active_ids(&mut ids);
        for &clock in &ids {
            if let Some(c) = self.clocks.get_mut(clock) {
                c.unbind_element(element);
            }
        }
        self.clock_scratch = ids;
    }
}
