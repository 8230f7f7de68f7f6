// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in input events, hit testing, hover and keyboard focus.
//!
//! The host registers one routed event per input notification, with a class
//! handler on `UIElement` that forwards to the matching
//! [`ElementBehavior`] hook. Instance handlers added with
//! [`UiHost::add_handler`] run after it.

use kurbo::{Point, Vec2};
use trellis_property::TypeTag;
use trellis_responder::dispatcher::route_path;
use trellis_responder::handlers::EventRegistry;
use trellis_responder::path::Transition;
use trellis_responder::types::{Phase, RouteState, RoutedEvent, RoutingStrategy};

use crate::behavior::ElementBehavior;
use crate::element::ElementId;
use crate::error::LayoutError;
use crate::host::UiHost;
use crate::properties::{FOCUS, HOVER, Visibility};

/// Arguments of `GotFocus` and `LostFocus`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusChangedArgs {
    /// Element that had focus.
    pub old: Option<ElementId>,
    /// Element that has focus now.
    pub new: Option<ElementId>,
}

/// Platform key code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

bitflags::bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 0b0000_0001;
        /// Control.
        const CONTROL = 0b0000_0010;
        /// Alt / Option.
        const ALT     = 0b0000_0100;
        /// Super / Command.
        const META    = 0b0000_1000;
    }
}

/// Arguments of `KeyDown` and `KeyUp`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyArgs {
    /// The key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Auto-repeat of a held key.
    pub repeat: bool,
}

/// Arguments of `TextInput`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextInputArgs {
    /// The committed text.
    pub text: String,
}

/// Arguments of pointer movement events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerArgs {
    /// Pointer position in host coordinates.
    pub position: Point,
}

/// A pointer button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// The wheel button.
    Middle,
    /// Any other button.
    Other(u16),
}

/// Whether a button or key went down or up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Pressed.
    Pressed,
    /// Released.
    Released,
}

/// Arguments of `MouseDown` and `MouseUp`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerButtonArgs {
    /// Pointer position in host coordinates.
    pub position: Point,
    /// The button.
    pub button: MouseButton,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

/// Arguments of `MouseWheel`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelArgs {
    /// Pointer position in host coordinates.
    pub position: Point,
    /// Scroll amount.
    pub delta: Vec2,
}

/// Handles to the events every host registers.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinEvents {
    /// Focus arrived (bubble).
    pub got_focus: RoutedEvent<FocusChangedArgs>,
    /// Focus left (bubble).
    pub lost_focus: RoutedEvent<FocusChangedArgs>,
    /// Key pressed (tunnel, then bubble).
    pub key_down: RoutedEvent<KeyArgs>,
    /// Key released (tunnel, then bubble).
    pub key_up: RoutedEvent<KeyArgs>,
    /// Text committed (bubble).
    pub text_input: RoutedEvent<TextInputArgs>,
    /// Pointer entered (direct).
    pub mouse_enter: RoutedEvent<PointerArgs>,
    /// Pointer left (direct).
    pub mouse_leave: RoutedEvent<PointerArgs>,
    /// Pointer moved (bubble).
    pub mouse_move: RoutedEvent<PointerArgs>,
    /// Button pressed (bubble).
    pub mouse_down: RoutedEvent<PointerButtonArgs>,
    /// Button released (bubble).
    pub mouse_up: RoutedEvent<PointerButtonArgs>,
    /// Wheel turned (bubble).
    pub mouse_wheel: RoutedEvent<WheelArgs>,
}

type Hook<A> = fn(&mut dyn ElementBehavior, &mut UiHost, ElementId, &mut A) -> bool;

/// A class handler calling `hook` on the behavior of the current element.
///
/// Hooks only see the bubble (or direct) pass; the tunnel pass of
/// tunnel-bubble events is left to instance handlers.
fn forward<A: 'static>(hook: Hook<A>) -> impl Fn(&mut UiHost, &mut RouteState<ElementId>, &mut A) {
    move |host, state, args| {
        if state.phase == Phase::Tunnel {
            return;
        }
        let id = state.current;
        if host
            .with_behavior(id, |behavior, host| hook(behavior, host, id, args))
            .unwrap_or(false)
        {
            state.handled = true;
        }
    }
}

fn class<A: 'static>(
    registry: &mut EventRegistry<TypeTag>,
    ui_element: TypeTag,
    event: RoutedEvent<A>,
    hook: Hook<A>,
) {
    registry.add_class_handler(ui_element, event, false, forward(hook));
}

impl BuiltinEvents {
    pub(crate) fn register(registry: &mut EventRegistry<TypeTag>, ui_element: TypeTag) -> Self {
        use RoutingStrategy::{Bubble, Direct, TunnelBubble};
        let events = Self {
            got_focus: registry.register("GotFocus", Bubble),
            lost_focus: registry.register("LostFocus", Bubble),
            key_down: registry.register("KeyDown", TunnelBubble),
            key_up: registry.register("KeyUp", TunnelBubble),
            text_input: registry.register("TextInput", Bubble),
            mouse_enter: registry.register("MouseEnter", Direct),
            mouse_leave: registry.register("MouseLeave", Direct),
            mouse_move: registry.register("MouseMove", Bubble),
            mouse_down: registry.register("MouseDown", Bubble),
            mouse_up: registry.register("MouseUp", Bubble),
            mouse_wheel: registry.register("MouseWheel", Bubble),
        };
        class(registry, ui_element, events.got_focus, |b, h, id, a| b.on_got_focus(h, id, a));
        class(registry, ui_element, events.lost_focus, |b, h, id, a| b.on_lost_focus(h, id, a));
        class(registry, ui_element, events.key_down, |b, h, id, a| b.on_key_down(h, id, a));
        class(registry, ui_element, events.key_up, |b, h, id, a| b.on_key_up(h, id, a));
        class(registry, ui_element, events.text_input, |b, h, id, a| b.on_text_input(h, id, a));
        class(registry, ui_element, events.mouse_enter, |b, h, id, a| b.on_mouse_enter(h, id, a));
        class(registry, ui_element, events.mouse_leave, |b, h, id, a| b.on_mouse_leave(h, id, a));
        class(registry, ui_element, events.mouse_move, |b, h, id, a| b.on_mouse_move(h, id, a));
        class(registry, ui_element, events.mouse_down, |b, h, id, a| b.on_mouse_down(h, id, a));
        class(registry, ui_element, events.mouse_up, |b, h, id, a| b.on_mouse_up(h, id, a));
        class(registry, ui_element, events.mouse_wheel, |b, h, id, a| b.on_mouse_wheel(h, id, a));
        events
    }
}

impl UiHost {
    /// The element with keyboard focus.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.focus.target()
    }

    /// Moves keyboard focus to `id`.
    ///
    /// Returns `false` without raising anything if `id` is detached,
    /// disabled, not `Focusable`, or already focused.
    pub fn set_focus(&mut self, id: ElementId) -> Result<bool, LayoutError> {
        let element = self.element(id)?;
        if !element.is_attached()
            || !*self.try_get(id, self.props.focusable)?
            || !self.is_enabled(id)
            || self.focused() == Some(id)
        {
            return Ok(false);
        }
        self.move_focus(Some(id))?;
        Ok(true)
    }

    /// Drops keyboard focus. Returns `false` if nothing was focused.
    pub fn clear_focus(&mut self) -> Result<bool, LayoutError> {
        if self.focused().is_none() {
            return Ok(false);
        }
        self.move_focus(None)?;
        Ok(true)
    }

    /// Returns `true` if `id` and all of its ancestors have `IsEnabled` set.
    #[must_use]
    pub fn is_enabled(&self, id: ElementId) -> bool {
        let mut cur = Some(id);
        while let Some(e) = cur {
            if !self.try_get(e, self.props.is_enabled).is_ok_and(|on| *on) {
                return false;
            }
            cur = self.parent(e);
        }
        true
    }

    /// Focuses the tab stop after the focused element, wrapping around.
    ///
    /// Returns `false` if no element qualifies or focus did not move.
    pub fn focus_next_tab_stop(&mut self) -> Result<bool, LayoutError> {
        match self.next_tab_stop(self.focused()) {
            Some(id) => self.set_focus(id),
            None => Ok(false),
        }
    }

    /// Focuses the tab stop before the focused element, wrapping around.
    pub fn focus_previous_tab_stop(&mut self) -> Result<bool, LayoutError> {
        match self.previous_tab_stop(self.focused()) {
            Some(id) => self.set_focus(id),
            None => Ok(false),
        }
    }

    /// The tab stop after `from` in tab order.
    ///
    /// Tab order sorts the tab stops of the attached tree by `TabIndex`,
    /// keeping tree order among equal indices. A tab stop is `Focusable`,
    /// `IsTabStop`, enabled and visible along with all of its ancestors.
    /// Without a `from` that is itself a tab stop this is the first one.
    #[must_use]
    pub fn next_tab_stop(&self, from: Option<ElementId>) -> Option<ElementId> {
        let stops = self.tab_order();
        let at = from.and_then(|f| stops.iter().position(|s| *s == f));
        match at {
            Some(i) => stops.get((i + 1) % stops.len()).copied(),
            None => stops.first().copied(),
        }
    }

    /// The tab stop before `from` in tab order; the last one without a
    /// `from` that is a tab stop.
    #[must_use]
    pub fn previous_tab_stop(&self, from: Option<ElementId>) -> Option<ElementId> {
        let stops = self.tab_order();
        let at = from.and_then(|f| stops.iter().position(|s| *s == f));
        match at {
            Some(i) => stops.get((i + stops.len() - 1) % stops.len()).copied(),
            None => stops.last().copied(),
        }
    }

    /// The first focusable element below `id` in tree order, else `id`
    /// itself if it is focusable. With `tab_stop` the element must also be
    /// a tab stop.
    #[must_use]
    pub fn first_focusable_descendant(&self, id: ElementId, tab_stop: bool) -> Option<ElementId> {
        if !self.contains(id) || !self.is_enabled(id) {
            return None;
        }
        let mut found = Vec::new();
        for &child in self.children(id) {
            self.collect_focusable(child, tab_stop, &mut found);
            if let Some(&(_, first)) = found.first() {
                return Some(first);
            }
        }
        self.can_take_focus(id, tab_stop).then_some(id)
    }

    fn tab_order(&self) -> Vec<ElementId> {
        let mut found = Vec::new();
        if let Some(root) = self.root {
            self.collect_focusable(root, true, &mut found);
        }
        // Stable, so tree order breaks ties.
        found.sort_by_key(|(index, _)| *index);
        found.into_iter().map(|(_, id)| id).collect()
    }

    fn can_take_focus(&self, id: ElementId, tab_stop: bool) -> bool {
        let p = &self.props;
        self.try_get(id, p.focusable).is_ok_and(|on| *on)
            && (!tab_stop || self.try_get(id, p.is_tab_stop).is_ok_and(|on| *on))
    }

    /// Appends focusable elements of the enabled, visible part of the
    /// subtree at `id` in tree order, with their `TabIndex`.
    fn collect_focusable(&self, id: ElementId, tab_stop: bool, out: &mut Vec<(i32, ElementId)>) {
        let p = &self.props;
        let usable = self.try_get(id, p.is_enabled).is_ok_and(|on| *on)
            && self
                .try_get(id, p.visibility)
                .is_ok_and(|v| *v == Visibility::Visible);
        if !usable {
            return;
        }
        if self.can_take_focus(id, tab_stop) {
            let index = self.try_get(id, p.tab_index).map_or(0, |i| *i);
            out.push((index, id));
        }
        for &child in self.children(id) {
            self.collect_focusable(child, tab_stop, out);
        }
    }

    /// Drops focus if `id` was disabled while it or a descendant had it.
    pub(crate) fn enabled_changed(&mut self, id: ElementId) {
        if !self.focus.contains(id) || self.is_enabled(id) {
            return;
        }
        if let Err(error) = self.clear_focus() {
            tracing::warn!(?id, %error, "dropping focus from a disabled element failed");
        }
    }

    fn move_focus(&mut self, new: Option<ElementId>) -> Result<(), LayoutError> {
        let old = self.focused();
        tracing::debug!(?old, ?new, "focus moved");
        let mut path = core::mem::take(&mut self.path_scratch);
        match new {
            Some(id) => route_path(self, id, &mut path),
            None => path.clear(),
        }
        self.focus.update_path(&path);
        self.path_scratch = path;

        let mut lost = FocusChangedArgs { old, new };
        let mut got = lost;
        if let Some(old) = old
            && self.contains(old)
        {
            self.set_local(old, self.props.is_focused, false)?;
            self.set_pseudo_class(old, FOCUS, false);
            self.raise(old, self.events.lost_focus, &mut lost);
        }
        if let Some(new) = new {
            self.set_local(new, self.props.is_focused, true)?;
            self.set_pseudo_class(new, FOCUS, true);
            self.raise(new, self.events.got_focus, &mut got);
        }
        Ok(())
    }

    /// The topmost element under `point`.
    ///
    /// Children are tested last to first, before their parent. Hidden and
    /// disabled elements, elements with `IsHitTestVisible` off, and
    /// everything outside an element's clip are skipped along with their
    /// descendants.
    #[must_use]
    pub fn element_at_point(&self, point: Point) -> Option<ElementId> {
        self.hit(self.root?, point)
    }

    fn hit(&self, id: ElementId, point: Point) -> Option<ElementId> {
        let element = self.arena.get(id)?;
        if !element.is_attached()
            || self.try_get(id, self.props.visibility).ok()? != &Visibility::Visible
            || !*self.try_get(id, self.props.is_hit_test_visible).ok()?
            || !*self.try_get(id, self.props.is_enabled).ok()?
        {
            return None;
        }
        if let Some(clip) = element.layout.clip
            && !clip.contains(point)
        {
            return None;
        }
        if let Some(hit) = element
            .children
            .iter()
            .rev()
            .find_map(|child| self.hit(*child, point))
        {
            return Some(hit);
        }
        let hit = match element.behavior.as_deref() {
            Some(behavior) => behavior.hit_test(self, id, point),
            None => element.layout.absolute_bounds.contains(point),
        };
        hit.then_some(id)
    }

    fn set_hovering(&mut self, id: ElementId, on: bool) -> Result<(), LayoutError> {
        self.set_local(id, self.props.is_hovering, on)?;
        self.set_pseudo_class(id, HOVER, on);
        Ok(())
    }

    /// The pointer moved to `position`.
    ///
    /// Updates the hover path (leaves innermost first, then enters outermost
    /// first), then raises `MouseMove` on the element under the pointer.
    /// Returns whether `MouseMove` was handled.
    pub fn pointer_moved(&mut self, position: Point) -> Result<bool, LayoutError> {
        let target = self.element_at_point(position);
        let mut path = core::mem::take(&mut self.path_scratch);
        match target {
            Some(id) => route_path(self, id, &mut path),
            None => path.clear(),
        }
        let transitions = self.hover.update_path(&path);
        self.path_scratch = path;

        let mut args = PointerArgs { position };
        for transition in transitions {
            match transition {
                Transition::Leave(id) if self.contains(id) => {
                    self.set_hovering(id, false)?;
                    self.raise(id, self.events.mouse_leave, &mut args);
                }
                Transition::Enter(id) if self.contains(id) => {
                    self.set_hovering(id, true)?;
                    self.raise(id, self.events.mouse_enter, &mut args);
                }
                _ => {}
            }
        }
        Ok(target.is_some_and(|id| self.raise(id, self.events.mouse_move, &mut args)))
    }

    /// The pointer left the host.
    pub fn pointer_left(&mut self) -> Result<(), LayoutError> {
        let mut args = PointerArgs {
            position: Point::new(f64::NAN, f64::NAN),
        };
        for transition in self.hover.clear() {
            if let Transition::Leave(id) = transition
                && self.contains(id)
            {
                self.set_hovering(id, false)?;
                self.raise(id, self.events.mouse_leave, &mut args);
            }
        }
        Ok(())
    }

    /// A pointer button changed state at `position`.
    ///
    /// An unhandled press focuses the nearest focusable element at or above
    /// the hit element; a press on empty space clears focus.
    pub fn pointer_button(
        &mut self,
        position: Point,
        button: MouseButton,
        state: ButtonState,
        modifiers: Modifiers,
    ) -> Result<bool, LayoutError> {
        let Some(target) = self.element_at_point(position) else {
            if state == ButtonState::Pressed {
                self.clear_focus()?;
            }
            return Ok(false);
        };
        let mut args = PointerButtonArgs {
            position,
            button,
            modifiers,
        };
        let handled = match state {
            ButtonState::Pressed => self.raise(target, self.events.mouse_down, &mut args),
            ButtonState::Released => self.raise(target, self.events.mouse_up, &mut args),
        };
        if state == ButtonState::Pressed && !handled {
            let mut candidate = Some(target);
            while let Some(id) = candidate {
                if *self.try_get(id, self.props.focusable)? {
                    self.set_focus(id)?;
                    break;
                }
                candidate = self.parent(id);
            }
        }
        Ok(handled)
    }

    /// A key changed state. Routed from the focused element, or the root
    /// when nothing has focus.
    pub fn key(
        &mut self,
        key: Key,
        state: ButtonState,
        modifiers: Modifiers,
        repeat: bool,
    ) -> bool {
        let Some(target) = self.focused().or(self.root) else {
            return false;
        };
        let mut args = KeyArgs {
            key,
            modifiers,
            repeat,
        };
        let event = match state {
            ButtonState::Pressed => self.events.key_down,
            ButtonState::Released => self.events.key_up,
        };
        self.raise(target, event, &mut args)
    }

    /// Text was committed. Routed like [`key`](Self::key).
    pub fn text_input(&mut self, text: &str) -> bool {
        let Some(target) = self.focused().or(self.root) else {
            return false;
        };
        let mut args = TextInputArgs { text: text.into() };
        self.raise(target, self.events.text_input, &mut args)
    }

    /// The wheel turned with the pointer at `position`.
    pub fn wheel(&mut self, position: Point, delta: Vec2) -> bool {
        let Some(target) = self.element_at_point(position) else {
            return false;
        };
        let mut args = WheelArgs { position, delta };
        self.raise(target, self.events.mouse_wheel, &mut args)
    }
}
