// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The measure, arrange and position stages and the fixed-point driver.
//!
//! Each stage caches its inputs and outputs on the element and short-circuits
//! when called again with the same inputs on a valid element. A stage always
//! makes sure the stage before it is current first, so arrange never sees a
//! stale desired size and position never sees a stale layout rect.

use kurbo::{Insets, Point, Rect, Size};

use crate::behavior::ArrangeOptions;
use crate::element::ElementId;
use crate::error::{LayoutError, LayoutErrors};
use crate::host::UiHost;
use crate::properties::{
    ARRANGE, HorizontalAlignment, MEASURE, POSITION, Stage, VerticalAlignment, Visibility,
};

/// Effective size limits: explicit size folded into min/max.
#[derive(Copy, Clone, Debug)]
struct SizeBounds {
    min: Size,
    max: Size,
}

impl SizeBounds {
    fn axis(explicit: Option<f64>, min: f64, max: f64) -> (f64, f64) {
        let upper = explicit.unwrap_or(f64::INFINITY).min(max).max(min);
        let lower = max.min(explicit.unwrap_or(0.0)).max(min);
        (lower, upper)
    }

    fn clamp(self, size: Size) -> Size {
        Size::new(
            size.width.min(self.max.width).max(self.min.width),
            size.height.min(self.max.height).max(self.min.height),
        )
    }
}

fn deflate(size: Size, margin: Insets) -> Size {
    Size::new(
        (size.width - margin.x_value()).max(0.0),
        (size.height - margin.y_value()).max(0.0),
    )
}

fn align(slot: f64, size: f64, start: bool, center: bool, end: bool) -> f64 {
    if start {
        0.0
    } else if end {
        slot - size
    } else if center || size <= slot {
        (slot - size) / 2.0
    } else {
        // Stretched content wider than its slot is pinned to the start.
        0.0
    }
}

impl UiHost {
    /// Drains the stage queues until none has work left.
    ///
    /// One pass drains style, then measure, then arrange, then position,
    /// including work enqueued while draining. If a later stage queued work
    /// for an earlier one the pass repeats, up to
    /// [`HostConfig::max_layout_passes`](crate::HostConfig::max_layout_passes).
    ///
    /// A failing element is dropped from its queue and the pass goes on with
    /// the others; every failure is reported once the queues settle.
    pub fn run_pending_layout(&mut self) -> Result<(), LayoutErrors> {
        let mut errors = LayoutErrors::default();
        let mut passes = 0;
        while !self.queues.is_idle() {
            if passes == self.config.max_layout_passes {
                let error = LayoutError::NotConverged { passes };
                tracing::warn!(%error, "giving up on layout for this frame");
                errors.push(error);
                break;
            }
            passes += 1;
            for stage in Stage::ALL {
                while let Some(id) = self.queues.pop(stage.channel()) {
                    if let Err(error) = self.run_queued(id, stage) {
                        tracing::warn!(?id, ?stage, %error, "layout stage failed");
                        errors.push(error);
                    }
                }
            }
        }
        errors.into_result()
    }

    /// Runs one queued stage with the element's most recent inputs.
    fn run_queued(&mut self, id: ElementId, stage: Stage) -> Result<(), LayoutError> {
        let Some(element) = self.arena.get(id) else {
            return Ok(());
        };
        let is_root = self.root == Some(id);
        let parent = element.parent;
        let layout = element.layout.clone();
        match stage {
            Stage::Style => self.style(id),
            Stage::Measure => {
                let available = if is_root {
                    self.config.viewport
                } else {
                    layout.most_recent_available
                };
                let desired = self.measure(id, available)?;
                if desired != layout.desired_size
                    && let Some(parent) = parent
                {
                    self.invalidate(parent, Stage::Measure);
                }
                Ok(())
            }
            Stage::Arrange => {
                let (rect, options) = if is_root {
                    (self.config.viewport.to_rect(), ArrangeOptions::FILL)
                } else {
                    (layout.most_recent_final_rect, layout.most_recent_options)
                };
                self.arrange(id, rect, options).map(drop)
            }
            Stage::Position => {
                let origin = parent
                    .and_then(|p| self.layout(p))
                    .map_or(Point::ZERO, |l| l.absolute_bounds.origin());
                self.position(id, origin)
            }
        }
    }

    fn size_bounds(&self, id: ElementId) -> Result<SizeBounds, LayoutError> {
        let p = self.props;
        let (min_w, max_w) = SizeBounds::axis(
            *self.try_get(id, p.width)?,
            *self.try_get(id, p.min_width)?,
            *self.try_get(id, p.max_width)?,
        );
        let (min_h, max_h) = SizeBounds::axis(
            *self.try_get(id, p.height)?,
            *self.try_get(id, p.min_height)?,
            *self.try_get(id, p.max_height)?,
        );
        Ok(SizeBounds {
            min: Size::new(min_w, min_h),
            max: Size::new(max_w, max_h),
        })
    }

    /// Measures `id` against `available` and returns its desired size,
    /// margin included.
    ///
    /// Skipped when the element is valid and `available` matches the last
    /// call. Fails if the behavior reports a non-finite size; the element's
    /// measure then stays invalid.
    pub fn measure(&mut self, id: ElementId, available: Size) -> Result<Size, LayoutError> {
        let element = self.element_mut(id)?;
        if !element.is_attached() {
            element.set_valid(Stage::Measure, true);
            return Ok(element.layout.desired_size);
        }
        if element.is_valid(Stage::Measure) && element.layout.most_recent_available == available {
            let desired = element.layout.desired_size;
            self.queues.remove(id, MEASURE);
            return Ok(desired);
        }
        element.layout.most_recent_available = available;

        let result = self.compute_measure(id, available);
        self.queues.remove(id, MEASURE);
        let element = self.element_mut(id)?;
        match result {
            Ok(desired) => {
                tracing::trace!(?id, ?available, ?desired, "measure");
                element.layout.desired_size = desired;
                element.set_valid(Stage::Measure, true);
                self.invalidate(id, Stage::Arrange);
                Ok(desired)
            }
            Err(error) => {
                element.set_valid(Stage::Measure, false);
                Err(error)
            }
        }
    }

    fn compute_measure(&mut self, id: ElementId, available: Size) -> Result<Size, LayoutError> {
        if !self.is_valid(id, Stage::Style) {
            self.style(id)?;
        }
        if *self.try_get(id, self.props.visibility)? != Visibility::Visible {
            return Ok(Size::ZERO);
        }
        let margin = *self.try_get(id, self.props.margin)?;
        let bounds = self.size_bounds(id)?;
        let constrained = bounds.clamp(deflate(available, margin));
        let raw = self
            .with_behavior(id, |behavior, host| behavior.measure(host, id, constrained))
            .unwrap_or(Ok(Size::ZERO))?;
        if !raw.is_finite() {
            return Err(LayoutError::NonFiniteDesiredSize {
                element: id,
                size: raw,
            });
        }
        let size = bounds.clamp(raw);
        let outer = Size::new(size.width + margin.x_value(), size.height + margin.y_value());
        // Limits and margin can push a finite content size out of range too.
        if !outer.is_finite() {
            return Err(LayoutError::NonFiniteDesiredSize {
                element: id,
                size: outer,
            });
        }
        Ok(Size::new(outer.width.max(0.0), outer.height.max(0.0)))
    }

    /// Arranges `id` in `final_rect` (parent coordinates) and returns the
    /// size it settled on.
    ///
    /// Skipped when the element is valid and both inputs match the last call.
    /// Re-measures first if the measure is stale.
    pub fn arrange(
        &mut self,
        id: ElementId,
        final_rect: Rect,
        options: ArrangeOptions,
    ) -> Result<Size, LayoutError> {
        let element = self.element_mut(id)?;
        if !element.is_attached() {
            element.set_valid(Stage::Arrange, true);
            return Ok(element.layout.render_size);
        }
        if element.is_valid(Stage::Arrange)
            && element.layout.most_recent_final_rect == final_rect
            && element.layout.most_recent_options == options
        {
            let size = element.layout.render_size;
            self.queues.remove(id, ARRANGE);
            return Ok(size);
        }
        element.layout.most_recent_final_rect = final_rect;
        element.layout.most_recent_options = options;

        let result = self.compute_arrange(id, final_rect, options);
        self.queues.remove(id, ARRANGE);
        let element = self.element_mut(id)?;
        match result {
            Ok(layout_rect) => {
                tracing::trace!(?id, ?final_rect, ?layout_rect, "arrange");
                element.layout.layout_rect = layout_rect;
                element.layout.render_size = layout_rect.size();
                element.set_valid(Stage::Arrange, true);
                self.invalidate(id, Stage::Position);
                Ok(layout_rect.size())
            }
            Err(error) => {
                element.set_valid(Stage::Arrange, false);
                Err(error)
            }
        }
    }

    fn compute_arrange(
        &mut self,
        id: ElementId,
        final_rect: Rect,
        options: ArrangeOptions,
    ) -> Result<Rect, LayoutError> {
        if !self.is_valid(id, Stage::Measure) {
            let available = self.element(id)?.layout.most_recent_available;
            self.measure(id, available)?;
        }
        if *self.try_get(id, self.props.visibility)? != Visibility::Visible {
            return Ok(Rect::from_origin_size(final_rect.origin(), Size::ZERO));
        }
        let margin = *self.try_get(id, self.props.margin)?;
        let horizontal = *self.try_get(id, self.props.horizontal_alignment)?;
        let vertical = *self.try_get(id, self.props.vertical_alignment)?;
        let bounds = self.size_bounds(id)?;
        let fill = options.contains(ArrangeOptions::FILL);

        let slot = deflate(final_rect.size(), margin);
        let desired = deflate(self.element(id)?.layout.desired_size, margin);
        let wanted = Size::new(
            if fill || horizontal == HorizontalAlignment::Stretch {
                slot.width
            } else {
                desired.width
            },
            if fill || vertical == VerticalAlignment::Stretch {
                slot.height
            } else {
                desired.height
            },
        );
        let arrange_size = bounds.clamp(wanted);
        let render = self
            .with_behavior(id, |behavior, host| behavior.arrange(host, id, arrange_size))
            .unwrap_or(Ok(arrange_size))?;

        let dx = if fill {
            0.0
        } else {
            align(
                slot.width,
                render.width,
                horizontal == HorizontalAlignment::Start,
                horizontal == HorizontalAlignment::Center,
                horizontal == HorizontalAlignment::End,
            )
        };
        let dy = if fill {
            0.0
        } else {
            align(
                slot.height,
                render.height,
                vertical == VerticalAlignment::Start,
                vertical == VerticalAlignment::Center,
                vertical == VerticalAlignment::End,
            )
        };
        let origin = Point::new(
            final_rect.x0 + margin.x0 + dx,
            final_rect.y0 + margin.y0 + dy,
        );
        Ok(Rect::from_origin_size(origin, render))
    }

    /// Computes the bounds and clip of `id` given its parent's absolute
    /// origin, then positions its children.
    ///
    /// Always recomputes. Re-arranges first if the arrange is stale.
    pub fn position(&mut self, id: ElementId, parent_origin: Point) -> Result<(), LayoutError> {
        let element = self.element_mut(id)?;
        if !element.is_attached() {
            element.set_valid(Stage::Position, true);
            return Ok(());
        }
        let result = self.compute_position(id, parent_origin);
        self.queues.remove(id, POSITION);
        if result.is_err() {
            self.element_mut(id)?.set_valid(Stage::Position, false);
        }
        result
    }

    fn compute_position(&mut self, id: ElementId, parent_origin: Point) -> Result<(), LayoutError> {
        if !self.is_valid(id, Stage::Arrange) {
            let layout = &self.element(id)?.layout;
            let (rect, options) = (layout.most_recent_final_rect, layout.most_recent_options);
            self.arrange(id, rect, options)?;
        }
        let offset = *self.try_get(id, self.props.render_offset)?;
        let element = self.element_mut(id)?;
        let layout = &mut element.layout;
        layout.most_recent_position = parent_origin;
        layout.relative_bounds = layout.layout_rect + offset;
        layout.absolute_bounds = layout.relative_bounds + parent_origin.to_vec2();
        let absolute = layout.absolute_bounds;
        element.set_valid(Stage::Position, true);
        tracing::trace!(?id, ?absolute, "position");

        let clip = match self.arena.get(id).and_then(|e| e.behavior.as_deref()) {
            Some(behavior) => behavior.clip(self, id),
            None => self.default_clip(id),
        };
        self.element_mut(id)?.layout.clip = clip;

        self.with_behavior(id, |behavior, host| {
            behavior.position(host, id, absolute.origin())
        })
        .unwrap_or(Ok(()))
    }

    /// The slot `id` was arranged in, in host coordinates, or `None` when
    /// the element fits inside it.
    #[must_use]
    pub fn default_clip(&self, id: ElementId) -> Option<Rect> {
        let layout = &self.arena.get(id)?.layout;
        let slot = layout.most_recent_final_rect + layout.most_recent_position.to_vec2();
        let bounds = layout.absolute_bounds;
        let inside = slot.x0 <= bounds.x0
            && slot.y0 <= bounds.y0
            && slot.x1 >= bounds.x1
            && slot.y1 >= bounds.y1;
        (!inside).then_some(slot)
    }

    /// Re-runs measure and arrange of `id` with its most recent inputs.
    pub fn update_layout(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let (available, rect, options) = if self.root == Some(id) {
            (
                self.config.viewport,
                self.config.viewport.to_rect(),
                ArrangeOptions::FILL,
            )
        } else {
            let layout = &self.element(id)?.layout;
            (
                layout.most_recent_available,
                layout.most_recent_final_rect,
                layout.most_recent_options,
            )
        };
        self.measure(id, available)?;
        self.arrange(id, rect, options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_size_wins_over_content_within_limits() {
        assert_eq!(SizeBounds::axis(Some(100.0), 0.0, f64::INFINITY), (100.0, 100.0));
        assert_eq!(SizeBounds::axis(Some(100.0), 0.0, 50.0), (50.0, 50.0));
        assert_eq!(SizeBounds::axis(None, 10.0, 50.0), (10.0, 50.0));
        assert_eq!(SizeBounds::axis(Some(5.0), 10.0, 50.0), (10.0, 10.0));
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(align(100.0, 40.0, true, false, false), 0.0);
        assert_eq!(align(100.0, 40.0, false, true, false), 30.0);
        assert_eq!(align(100.0, 40.0, false, false, true), 60.0);
        // Stretch
        assert_eq!(align(100.0, 40.0, false, false, false), 30.0);
        assert_eq!(align(100.0, 140.0, false, false, false), 0.0);
    }
}
