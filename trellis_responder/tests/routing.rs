// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing tests for `trellis_responder`.
//!
//! A small tree with a class hierarchy `Panel : Element` and keyboard-style
//! tunnel/bubble events.

use trellis_responder::dispatcher::{RouteHost, raise};
use trellis_responder::handlers::{EventRegistry, HandlerList};
use trellis_responder::path::{PathState, Transition};
use trellis_responder::types::{Phase, RouteState, RoutingStrategy};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Class {
    Element,
    Panel,
}

struct Node {
    parent: Option<usize>,
    class: Class,
    handlers: HandlerList,
}

struct Ui {
    nodes: Vec<Node>,
    events: EventRegistry<Class>,
    trace: Vec<String>,
}

impl RouteHost<usize, Class> for Ui {
    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }

    fn class_of(&self, node: usize) -> Option<Class> {
        Some(self.nodes[node].class)
    }

    fn class_chain(&self, class: Class, out: &mut Vec<Class>) {
        out.push(class);
        if class == Class::Panel {
            out.push(Class::Element);
        }
    }

    fn instance_handlers(&self, node: usize) -> Option<&HandlerList> {
        Some(&self.nodes[node].handlers)
    }

    fn event_registry(&self) -> &EventRegistry<Class> {
        &self.events
    }
}

fn tracer(tag: &'static str) -> impl Fn(&mut Ui, &mut RouteState<usize>, &mut char) + 'static {
    move |ui, state, key| {
        let phase = match state.phase {
            Phase::Tunnel => "t",
            Phase::Bubble => "b",
            Phase::Direct => "d",
        };
        ui.trace.push(format!("{tag}{}{phase}{key}", state.current));
    }
}

/// root(Panel) -> panel(Panel) -> leaf(Element)
fn ui() -> Ui {
    let node = |parent, class| Node {
        parent,
        class,
        handlers: HandlerList::new(),
    };
    Ui {
        nodes: vec![
            node(None, Class::Panel),
            node(Some(0), Class::Panel),
            node(Some(1), Class::Element),
        ],
        events: EventRegistry::new(),
        trace: Vec::new(),
    }
}

#[test]
fn key_down_tunnels_then_bubbles_with_class_handlers() {
    let mut ui = ui();
    let key_down = ui.events.register::<char>("KeyDown", RoutingStrategy::TunnelBubble);
    ui.events.add_class_handler(Class::Panel, key_down, false, tracer("P"));
    ui.events.add_class_handler(Class::Element, key_down, false, tracer("E"));
    ui.nodes[2].handlers.add(key_down, false, tracer("i"));

    let handled = raise(&mut ui, 2, key_down, &mut 'a');
    assert!(!handled);
    assert_eq!(
        ui.trace,
        [
            "P0ta", "E0ta", "P1ta", "E1ta", "E2ta", "i2ta", // tunnel
            "E2ba", "i2ba", "P1ba", "E1ba", "P0ba", "E0ba", // bubble
        ]
    );
}

#[test]
fn preview_handler_stops_bubble_pass() {
    let mut ui = ui();
    let key_down = ui.events.register::<char>("KeyDown", RoutingStrategy::TunnelBubble);
    ui.nodes[1].handlers.add(key_down, false, |ui: &mut Ui, s: &mut RouteState<usize>, _: &mut char| {
        if s.phase == Phase::Tunnel {
            ui.trace.push("stop".into());
            s.handled = true;
        }
    });
    ui.nodes[2].handlers.add(key_down, false, tracer("i"));
    ui.nodes[0].handlers.add(key_down, true, tracer("log"));

    assert!(raise(&mut ui, 2, key_down, &mut 'x'));
    assert_eq!(ui.trace, ["log0tx", "stop", "log0bx"]);
}

#[test]
fn removed_handler_no_longer_runs() {
    let mut ui = ui();
    let text = ui.events.register::<char>("TextInput", RoutingStrategy::Bubble);
    let id = ui.nodes[2].handlers.add(text, false, tracer("i"));
    raise(&mut ui, 2, text, &mut 'q');
    assert!(ui.nodes[2].handlers.remove(id));
    raise(&mut ui, 2, text, &mut 'q');
    assert_eq!(ui.trace, ["i2bq"]);
}

#[test]
fn direct_event_only_reaches_origin() {
    let mut ui = ui();
    let enter = ui.events.register::<char>("MouseEnter", RoutingStrategy::Direct);
    for n in 0..3 {
        ui.nodes[n].handlers.add(enter, false, tracer("i"));
    }
    raise(&mut ui, 1, enter, &mut '.');
    assert_eq!(ui.trace, ["i1d."]);
}

#[test]
fn hover_path_drives_direct_enter_and_leave() {
    let mut ui = ui();
    let enter = ui.events.register::<char>("MouseEnter", RoutingStrategy::Direct);
    let leave = ui.events.register::<char>("MouseLeave", RoutingStrategy::Direct);
    for n in 0..3 {
        ui.nodes[n].handlers.add(enter, false, tracer("+"));
        ui.nodes[n].handlers.add(leave, false, tracer("-"));
    }
    let mut hover = PathState::new();
    for path in [&[0, 1, 2][..], &[0]] {
        for t in hover.update_path(path) {
            match t {
                Transition::Enter(n) => raise(&mut ui, n, enter, &mut ' '),
                Transition::Leave(n) => raise(&mut ui, n, leave, &mut ' '),
            };
        }
    }
    assert_eq!(ui.trace, ["+0d ", "+1d ", "+2d ", "-2d ", "-1d "]);
}
