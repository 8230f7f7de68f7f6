// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for routed events, hover and focus on a `trellis` host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use trellis::trellis_responder::types::{Phase, RouteState, RoutingStrategy};
use trellis::trellis_style::{Selector, StyleBuilder, StyleSheetBuilder};
use trellis::{
    ButtonState, Container, ElementBehavior, ElementId, FocusChangedArgs, HOVER,
    HorizontalAlignment, Key, KeyArgs, Modifiers, MouseButton, PointerArgs,
    PointerButtonArgs, UiHost, VerticalAlignment,
};

type Log = Rc<RefCell<Vec<String>>>;

/// Leaf that can swallow presses and counts key hooks.
struct Button {
    swallow_press: bool,
    key_hooks: Rc<Cell<u32>>,
}

impl ElementBehavior for Button {
    fn measure(
        &mut self,
        _: &mut UiHost,
        _: ElementId,
        _: Size,
    ) -> Result<Size, trellis::LayoutError> {
        Ok(Size::new(100.0, 50.0))
    }

    fn on_mouse_down(
        &mut self,
        _: &mut UiHost,
        _: ElementId,
        _: &mut PointerButtonArgs,
    ) -> bool {
        self.swallow_press
    }

    fn on_key_down(&mut self, _: &mut UiHost, _: ElementId, _: &mut KeyArgs) -> bool {
        self.key_hooks.set(self.key_hooks.get() + 1);
        false
    }
}

struct Scene {
    host: UiHost,
    root: ElementId,
    panel: ElementId,
    button: ElementId,
    key_hooks: Rc<Cell<u32>>,
}

/// root (800x600) > panel (fills root) > button (100x50 at the origin)
fn scene(swallow_press: bool) -> Scene {
    let mut host = UiHost::new();
    let props = *host.properties();
    let button_type = host.register_type("Button", None);
    let key_hooks = Rc::new(Cell::new(0));
    let root = host.create_element(props.ui_element, Container);
    let panel = host.create_element(props.ui_element, Container);
    let button = host.create_element(
        button_type,
        Button {
            swallow_press,
            key_hooks: key_hooks.clone(),
        },
    );
    host.set_root(root).unwrap();
    host.add_child(root, panel).unwrap();
    host.add_child(panel, button).unwrap();
    host.set_local(button, props.horizontal_alignment, HorizontalAlignment::Start)
        .unwrap();
    host.set_local(button, props.vertical_alignment, VerticalAlignment::Start)
        .unwrap();
    host.run_pending_layout().unwrap();
    Scene {
        host,
        root,
        panel,
        button,
        key_hooks,
    }
}

fn names(s: &Scene, id: ElementId) -> &'static str {
    if id == s.root {
        "root"
    } else if id == s.panel {
        "panel"
    } else {
        "button"
    }
}

#[test]
fn hit_testing_prefers_children() {
    let s = scene(false);
    assert_eq!(s.host.element_at_point(Point::new(10.0, 10.0)), Some(s.button));
    assert_eq!(s.host.element_at_point(Point::new(500.0, 500.0)), Some(s.panel));
    assert_eq!(s.host.element_at_point(Point::new(-1.0, 0.0)), None);
}

#[test]
fn class_handlers_run_before_instance_handlers() {
    let mut s = scene(false);
    let log: Log = Rc::default();
    let ui = s.host.properties().ui_element;
    let button_type = s.host.type_of(s.button).unwrap();
    let poke = s
        .host
        .event_registry_mut()
        .register::<()>("Poke", RoutingStrategy::Direct);

    let l = log.clone();
    s.host.add_handler(s.button, poke, false, move |_: &mut UiHost, _: &mut RouteState<ElementId>, _: &mut ()| {
        l.borrow_mut().push("instance".into());
    })
    .unwrap();
    for (class, name) in [(ui, "UIElement"), (button_type, "Button")] {
        let l = log.clone();
        s.host.event_registry_mut().add_class_handler(
            class,
            poke,
            false,
            move |_: &mut UiHost, _: &mut RouteState<ElementId>, _: &mut ()| {
                l.borrow_mut().push(name.into());
            },
        );
    }

    assert!(!s.host.raise(s.button, poke, &mut ()));
    assert_eq!(*log.borrow(), ["Button", "UIElement", "instance"]);
}

#[test]
fn handled_bubble_skips_all_but_handled_too() {
    let mut s = scene(false);
    let log: Log = Rc::default();
    let nudge = s
        .host
        .event_registry_mut()
        .register::<u32>("Nudge", RoutingStrategy::Bubble);

    s.host.add_handler(s.button, nudge, false, |_: &mut UiHost, state: &mut RouteState<ElementId>, count: &mut u32| {
        *count += 1;
        state.handled = true;
    })
    .unwrap();
    for (id, handled_too) in [(s.panel, false), (s.root, true)] {
        let l = log.clone();
        let name = names(&s, id);
        s.host.add_handler(id, nudge, handled_too, move |_: &mut UiHost, state: &mut RouteState<ElementId>, count: &mut u32| {
            *count += 1;
            assert!(state.handled, "handled_too handlers see the flag");
            l.borrow_mut().push(name.into());
        })
        .unwrap();
    }

    let mut count = 0;
    assert!(s.host.raise(s.button, nudge, &mut count));
    assert_eq!(count, 2);
    assert_eq!(*log.borrow(), ["root"]);
}

#[test]
fn keys_tunnel_then_bubble_from_the_focused_element() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_local(s.button, props.focusable, true).unwrap();
    assert!(s.host.set_focus(s.button).unwrap());

    let log: Log = Rc::default();
    let key_down = s.host.events().key_down;
    for id in [s.root, s.button] {
        let l = log.clone();
        let name = names(&s, id);
        s.host.add_handler(id, key_down, false, move |_: &mut UiHost, state: &mut RouteState<ElementId>, args: &mut KeyArgs| {
            let phase = if state.phase == Phase::Tunnel { "tunnel" } else { "bubble" };
            l.borrow_mut().push(format!("{name} {phase} {}", args.key.0));
        })
        .unwrap();
    }

    assert!(!s.host.key(Key(13), ButtonState::Pressed, Modifiers::empty(), false));
    assert_eq!(
        *log.borrow(),
        ["root tunnel 13", "button tunnel 13", "button bubble 13", "root bubble 13"]
    );
    assert_eq!(s.key_hooks.get(), 1, "behavior hooks only see the bubble pass");
}

#[test]
fn hover_tracks_the_path_and_drives_styles() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_style_provider(Some(Rc::new(
        StyleSheetBuilder::new()
            .rule(
                Selector::any().pseudo(HOVER),
                StyleBuilder::new().set(props.opacity, 0.5_f32).build(),
            )
            .build(),
    )));
    let log: Log = Rc::default();
    for id in [s.root, s.panel, s.button] {
        let name = names(&s, id);
        for (event, verb) in [
            (s.host.events().mouse_enter, "enter"),
            (s.host.events().mouse_leave, "leave"),
        ] {
            let l = log.clone();
            s.host.add_handler(id, event, false, move |_: &mut UiHost, _: &mut RouteState<ElementId>, _: &mut PointerArgs| {
                l.borrow_mut().push(format!("{verb} {name}"));
            })
            .unwrap();
        }
    }

    s.host.pointer_moved(Point::new(10.0, 10.0)).unwrap();
    assert_eq!(*log.borrow(), ["enter root", "enter panel", "enter button"]);
    assert!(*s.host.get(s.button, props.is_hovering));
    assert!(s.host.has_pseudo_class(s.panel, HOVER));
    s.host.run_pending_layout().unwrap();
    assert_eq!(*s.host.get(s.button, props.opacity), 0.5);

    log.borrow_mut().clear();
    s.host.pointer_moved(Point::new(500.0, 500.0)).unwrap();
    assert_eq!(*log.borrow(), ["leave button"]);
    assert!(!*s.host.get(s.button, props.is_hovering));
    s.host.run_pending_layout().unwrap();
    assert_eq!(*s.host.get(s.button, props.opacity), 1.0);
    assert_eq!(*s.host.get(s.panel, props.opacity), 0.5);

    log.borrow_mut().clear();
    s.host.pointer_left().unwrap();
    assert_eq!(*log.borrow(), ["leave panel", "leave root"]);
}

#[test]
fn press_focuses_nearest_focusable_ancestor() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_local(s.panel, props.focusable, true).unwrap();
    let log: Log = Rc::default();
    for (event, verb) in [
        (s.host.events().got_focus, "got"),
        (s.host.events().lost_focus, "lost"),
    ] {
        let l = log.clone();
        s.host.add_handler(s.root, event, false, move |_: &mut UiHost, _: &mut RouteState<ElementId>, _: &mut FocusChangedArgs| {
            l.borrow_mut().push(verb.into());
        })
        .unwrap();
    }

    let press = |host: &mut UiHost, at: Point| {
        host.pointer_button(at, MouseButton::Primary, ButtonState::Pressed, Modifiers::empty())
            .unwrap()
    };
    assert!(!press(&mut s.host, Point::new(10.0, 10.0)));
    assert_eq!(s.host.focused(), Some(s.panel));
    assert!(*s.host.get(s.panel, props.is_focused));
    assert!(!*s.host.get(s.root, props.is_focused));

    press(&mut s.host, Point::new(-10.0, -10.0));
    assert_eq!(s.host.focused(), None);
    assert!(!*s.host.get(s.panel, props.is_focused));
    assert_eq!(*log.borrow(), ["got", "lost"]);
}

#[test]
fn handled_press_keeps_focus() {
    let mut s = scene(true);
    let props = *s.host.properties();
    s.host.set_local(s.button, props.focusable, true).unwrap();
    let handled = s
        .host
        .pointer_button(
            Point::new(10.0, 10.0),
            MouseButton::Primary,
            ButtonState::Pressed,
            Modifiers::empty(),
        )
        .unwrap();
    assert!(handled);
    assert_eq!(s.host.focused(), None);
    assert!(!s.host.wheel(Point::new(10.0, 10.0), Vec2::new(0.0, -1.0)));
}

#[test]
fn removing_hovered_and_focused_elements_forgets_them() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_local(s.button, props.focusable, true).unwrap();
    s.host.set_focus(s.button).unwrap();
    s.host.pointer_moved(Point::new(10.0, 10.0)).unwrap();

    assert!(s.host.remove_child(s.panel, s.button).unwrap());
    assert_eq!(s.host.focused(), None);
    assert!(!*s.host.get(s.button, props.is_hovering));
    assert!(!*s.host.get(s.button, props.is_focused));
    assert!(!s.host.has_pseudo_class(s.button, HOVER));
    assert!(!s.host.set_focus(s.button).unwrap(), "detached elements cannot take focus");

    s.host.set_local(s.panel, props.focusable, true).unwrap();
    assert!(s.host.set_focus(s.panel).unwrap());
    assert_eq!(s.host.focused(), Some(s.panel));
    assert!(*s.host.get(s.panel, props.is_focused));
}

#[test]
fn disabled_branches_are_not_hit_and_cannot_take_focus() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_local(s.button, props.focusable, true).unwrap();
    s.host.set_local(s.panel, props.is_enabled, false).unwrap();

    assert!(!s.host.is_enabled(s.button), "inherited from the panel");
    assert_eq!(s.host.element_at_point(Point::new(10.0, 10.0)), Some(s.root));
    assert!(!s.host.set_focus(s.button).unwrap());
    assert_eq!(s.host.next_tab_stop(None), None);

    s.host.clear_local(s.panel, props.is_enabled).unwrap();
    assert_eq!(s.host.element_at_point(Point::new(10.0, 10.0)), Some(s.button));
    assert!(s.host.set_focus(s.button).unwrap());
}

#[test]
fn disabling_the_focused_branch_drops_focus() {
    let mut s = scene(false);
    let props = *s.host.properties();
    s.host.set_local(s.button, props.focusable, true).unwrap();
    s.host.set_focus(s.button).unwrap();

    s.host.set_local(s.panel, props.is_enabled, false).unwrap();
    assert_eq!(s.host.focused(), None);
    assert!(!*s.host.get(s.button, props.is_focused));
}

#[test]
fn tab_navigation_follows_tab_index_then_tree_order() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let ui = props.ui_element;
    let root = host.create_element(ui, Container);
    let [a, a1, b, c, d] = [(); 5].map(|()| host.create_element(ui, Container));
    host.set_root(root).unwrap();
    for child in [a, b, c, d] {
        host.add_child(root, child).unwrap();
    }
    host.add_child(a, a1).unwrap();
    for id in [a1, b, c, d] {
        host.set_local(id, props.focusable, true).unwrap();
    }
    host.set_local(a1, props.is_tab_stop, false).unwrap();
    host.set_local(b, props.is_enabled, false).unwrap();
    host.set_local(c, props.tab_index, 1).unwrap();

    assert_eq!(host.next_tab_stop(None), Some(d));
    assert_eq!(host.previous_tab_stop(None), Some(c));
    assert!(host.focus_next_tab_stop().unwrap());
    assert_eq!(host.focused(), Some(d));
    assert!(host.focus_next_tab_stop().unwrap());
    assert_eq!(host.focused(), Some(c));
    assert!(host.focus_next_tab_stop().unwrap());
    assert_eq!(host.focused(), Some(d), "wraps around");
    assert!(host.focus_previous_tab_stop().unwrap());
    assert_eq!(host.focused(), Some(c));
    // Not a tab stop, so navigation restarts from the first one.
    assert_eq!(host.next_tab_stop(Some(a1)), Some(d));

    assert_eq!(host.first_focusable_descendant(root, false), Some(a1));
    assert_eq!(host.first_focusable_descendant(root, true), Some(c));
    assert_eq!(host.first_focusable_descendant(b, false), None);
    assert_eq!(host.first_focusable_descendant(d, true), Some(d));
}
