// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handing arranged elements to a renderer.

use kurbo::{Rect, Size};

use crate::element::ElementId;
use crate::host::UiHost;
use crate::properties::Visibility;

/// What a renderer needs to draw one element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderInfo {
    /// The element being drawn.
    pub element: ElementId,
    /// Bounds in host coordinates.
    pub absolute_bounds: Rect,
    /// Size the element was arranged at.
    pub render_size: Size,
    /// Clip in host coordinates, already intersected with every ancestor's.
    pub clip: Option<Rect>,
    /// Opacity multiplied down from the root.
    pub opacity: f32,
}

/// Receives elements in paint order.
pub trait RenderSink {
    /// Draws one element.
    fn render(&mut self, info: &RenderInfo);
}

impl RenderSink for Vec<RenderInfo> {
    fn render(&mut self, info: &RenderInfo) {
        self.push(*info);
    }
}

impl UiHost {
    /// Walks the attached tree in paint order (parents before children) and
    /// lets each visible element draw into `sink`.
    ///
    /// Hidden and collapsed elements are skipped together with their
    /// subtrees, as are elements whose opacity reaches zero.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        if let Some(root) = self.root {
            self.draw_element(root, None, 1.0, sink);
        }
    }

    fn draw_element(
        &self,
        id: ElementId,
        parent_clip: Option<Rect>,
        parent_opacity: f32,
        sink: &mut dyn RenderSink,
    ) {
        let Some(element) = self.arena.get(id) else {
            return;
        };
        if self.try_get(id, self.props.visibility).ok() != Some(&Visibility::Visible) {
            return;
        }
        let opacity = parent_opacity * self.try_get(id, self.props.opacity).map_or(1.0, |o| *o);
        if opacity <= 0.0 {
            return;
        }
        let clip = match (parent_clip, element.layout.clip) {
            (Some(a), Some(b)) => Some(a.intersect(b)),
            (a, b) => a.or(b),
        };
        let info = RenderInfo {
            element: id,
            absolute_bounds: element.layout.absolute_bounds,
            render_size: element.layout.render_size,
            clip,
            opacity,
        };
        if let Some(behavior) = element.behavior.as_deref() {
            behavior.draw(self, id, &info, sink);
        }
        for &child in &element.children {
            self.draw_element(child, clip, opacity, sink);
        }
    }
}
