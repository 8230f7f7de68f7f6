// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element behaviors: the per-element-kind overrides of layout, drawing,
//! hit testing and input.
//!
//! Every hook has a default, so a behavior only implements what it
//! customizes. While a hook runs the behavior is taken out of its element,
//! which lets the hook borrow the host mutably and recurse into children
//! through the host's stage operations.

use core::any::Any;

use kurbo::{Point, Rect, Size};

use crate::element::ElementId;
use crate::error::LayoutError;
use crate::host::UiHost;
use crate::input::{
    FocusChangedArgs, KeyArgs, PointerArgs, PointerButtonArgs, TextInputArgs, WheelArgs,
};
use crate::properties::Orientation;
use crate::render::{RenderInfo, RenderSink};

bitflags::bitflags! {
    /// Modifiers for [`UiHost::arrange`](crate::UiHost::arrange).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArrangeOptions: u8 {
        /// Fill the slot on both axes, ignoring alignment.
        const FILL = 0b0000_0001;
    }
}

/// Overridable per-element logic.
#[expect(unused_variables, reason = "default hooks ignore their arguments")]
pub trait ElementBehavior: Any {
    /// Returns the content size wanted within `available` (margin excluded).
    ///
    /// The default overlays the children and asks for the largest of them.
    fn measure(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        available: Size,
    ) -> Result<Size, LayoutError> {
        host.with_children(id, |host, children| {
            let mut size = Size::ZERO;
            for &child in children {
                let desired = host.measure(child, available)?;
                size.width = size.width.max(desired.width);
                size.height = size.height.max(desired.height);
            }
            Ok(size)
        })
    }

    /// Lays the children out within `final_size` and returns the size used.
    ///
    /// The default gives every child the whole area.
    fn arrange(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        final_size: Size,
    ) -> Result<Size, LayoutError> {
        host.with_children(id, |host, children| {
            let slot = final_size.to_rect();
            for &child in children {
                host.arrange(child, slot, ArrangeOptions::empty())?;
            }
            Ok(final_size)
        })
    }

    /// Positions the children given this element's absolute origin.
    fn position(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        origin: Point,
    ) -> Result<(), LayoutError> {
        host.with_children(id, |host, children| {
            for &child in children {
                host.position(child, origin)?;
            }
            Ok(())
        })
    }

    /// Clip rectangle in host coordinates.
    fn clip(&self, host: &UiHost, id: ElementId) -> Option<Rect> {
        host.default_clip(id)
    }

    /// Emits drawing for the element.
    fn draw(&self, host: &UiHost, id: ElementId, info: &RenderInfo, sink: &mut dyn RenderSink) {
        sink.render(info);
    }

    /// Returns `true` if `point` (host coordinates) hits the element itself.
    fn hit_test(&self, host: &UiHost, id: ElementId, point: Point) -> bool {
        host.layout(id)
            .is_some_and(|layout| layout.absolute_bounds.contains(point))
    }

    /// The element received keyboard focus. Return `true` to mark the event handled.
    fn on_got_focus(&mut self, host: &mut UiHost, id: ElementId, args: &mut FocusChangedArgs) -> bool {
        false
    }

    /// The element lost keyboard focus.
    fn on_lost_focus(&mut self, host: &mut UiHost, id: ElementId, args: &mut FocusChangedArgs) -> bool {
        false
    }

    /// A key was pressed while the element or a descendant had focus.
    fn on_key_down(&mut self, host: &mut UiHost, id: ElementId, args: &mut KeyArgs) -> bool {
        false
    }

    /// A key was released.
    fn on_key_up(&mut self, host: &mut UiHost, id: ElementId, args: &mut KeyArgs) -> bool {
        false
    }

    /// Text was entered.
    fn on_text_input(&mut self, host: &mut UiHost, id: ElementId, args: &mut TextInputArgs) -> bool {
        false
    }

    /// The pointer entered the element.
    fn on_mouse_enter(&mut self, host: &mut UiHost, id: ElementId, args: &mut PointerArgs) -> bool {
        false
    }

    /// The pointer left the element.
    fn on_mouse_leave(&mut self, host: &mut UiHost, id: ElementId, args: &mut PointerArgs) -> bool {
        false
    }

    /// The pointer moved over the element.
    fn on_mouse_move(&mut self, host: &mut UiHost, id: ElementId, args: &mut PointerArgs) -> bool {
        false
    }

    /// A pointer button was pressed over the element.
    fn on_mouse_down(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        args: &mut PointerButtonArgs,
    ) -> bool {
        false
    }

    /// A pointer button was released over the element.
    fn on_mouse_up(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        args: &mut PointerButtonArgs,
    ) -> bool {
        false
    }

    /// The wheel turned over the element.
    fn on_mouse_wheel(&mut self, host: &mut UiHost, id: ElementId, args: &mut WheelArgs) -> bool {
        false
    }
}

/// Overlays its children; the base behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Container;

impl ElementBehavior for Container {}

/// Stacks its children along the element's `Orientation` property.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack;

impl ElementBehavior for Stack {
    fn measure(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        available: Size,
    ) -> Result<Size, LayoutError> {
        let orientation = *host.get(id, host.properties().orientation);
        let child_available = match orientation {
            Orientation::Vertical => Size::new(available.width, f64::INFINITY),
            Orientation::Horizontal => Size::new(f64::INFINITY, available.height),
        };
        host.with_children(id, |host, children| {
            let mut size = Size::ZERO;
            for &child in children {
                let desired = host.measure(child, child_available)?;
                match orientation {
                    Orientation::Vertical => {
                        size.width = size.width.max(desired.width);
                        size.height += desired.height;
                    }
                    Orientation::Horizontal => {
                        size.width += desired.width;
                        size.height = size.height.max(desired.height);
                    }
                }
            }
            Ok(size)
        })
    }

    fn arrange(
        &mut self,
        host: &mut UiHost,
        id: ElementId,
        final_size: Size,
    ) -> Result<Size, LayoutError> {
        let orientation = *host.get(id, host.properties().orientation);
        host.with_children(id, |host, children| {
            let mut offset = 0.0;
            for &child in children {
                let desired = host.layout(child).map_or(Size::ZERO, |l| l.desired_size);
                let slot = match orientation {
                    Orientation::Vertical => {
                        Rect::new(0.0, offset, final_size.width, offset + desired.height)
                    }
                    Orientation::Horizontal => {
                        Rect::new(offset, 0.0, offset + desired.width, final_size.height)
                    }
                };
                host.arrange(child, slot, ArrangeOptions::empty())?;
                offset = match orientation {
                    Orientation::Vertical => slot.y1,
                    Orientation::Horizontal => slot.x1,
                };
            }
            Ok(final_size)
        })
    }
}

/// Supplies the intrinsic size of a content-bearing leaf (text, image, ...).
pub trait IntrinsicContent {
    /// Content size within `available`.
    fn measure_content(&self, available: Size) -> Size;
}

impl IntrinsicContent for Size {
    fn measure_content(&self, _available: Size) -> Size {
        *self
    }
}

/// A childless element sized by an [`IntrinsicContent`].
pub struct Leaf {
    content: Box<dyn IntrinsicContent>,
}

impl Leaf {
    /// Wraps `content`.
    pub fn new(content: impl IntrinsicContent + 'static) -> Self {
        Self {
            content: Box::new(content),
        }
    }
}

impl core::fmt::Debug for Leaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Leaf").finish_non_exhaustive()
    }
}

impl ElementBehavior for Leaf {
    fn measure(
        &mut self,
        _host: &mut UiHost,
        _id: ElementId,
        available: Size,
    ) -> Result<Size, LayoutError> {
        Ok(self.content.measure_content(available))
    }

    fn arrange(
        &mut self,
        _host: &mut UiHost,
        _id: ElementId,
        final_size: Size,
    ) -> Result<Size, LayoutError> {
        Ok(final_size)
    }

    fn position(
        &mut self,
        _host: &mut UiHost,
        _id: ElementId,
        _origin: Point,
    ) -> Result<(), LayoutError> {
        Ok(())
    }
}
