// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher: route an event through a tree and run its handlers.
//!
//! The route is fixed before the first handler runs:
//!
//! - The root→origin path is built from [`RouteHost::parent`].
//! - Each phase of the event's [`RoutingStrategy`](crate::types::RoutingStrategy)
//!   walks that path (root first for tunnel, origin first for bubble, origin
//!   only for direct).
//! - At each node, class handlers run first, most-derived class first, then
//!   the node's instance handlers in registration order.
//! - Once a handler sets [`RouteState::handled`], only handlers registered
//!   with `handled_too` still run. The flag is shared across phases, so a
//!   tunnel handler that marks the event handled also silences the bubble pass.
//!
//! ## Minimal example
//!
//! ```
//! use trellis_responder::dispatcher::{raise, RouteHost};
//! use trellis_responder::handlers::{EventRegistry, HandlerList};
//! use trellis_responder::types::{RouteState, RoutingStrategy};
//!
//! struct Tree {
//!     parents: Vec<Option<usize>>,
//!     handlers: Vec<HandlerList>,
//!     events: EventRegistry<u8>,
//!     log: Vec<usize>,
//! }
//!
//! impl RouteHost<usize, u8> for Tree {
//!     fn parent(&self, node: usize) -> Option<usize> { self.parents[node] }
//!     fn class_of(&self, _: usize) -> Option<u8> { None }
//!     fn class_chain(&self, _: u8, _: &mut Vec<u8>) {}
//!     fn instance_handlers(&self, node: usize) -> Option<&HandlerList> { self.handlers.get(node) }
//!     fn event_registry(&self) -> &EventRegistry<u8> { &self.events }
//! }
//!
//! let mut events = EventRegistry::new();
//! let click = events.register::<()>("Click", RoutingStrategy::Bubble);
//! let mut tree = Tree {
//!     parents: vec![None, Some(0)],
//!     handlers: vec![HandlerList::new(), HandlerList::new()],
//!     events,
//!     log: Vec::new(),
//! };
//! for node in 0..2 {
//!     tree.handlers[node].add(click, false, move |t: &mut Tree, _: &mut RouteState<usize>, _: &mut ()| {
//!         t.log.push(node);
//!     });
//! }
//!
//! let handled = raise(&mut tree, 1, click, &mut ());
//! assert!(!handled);
//! assert_eq!(tree.log, [1, 0]);
//! ```

use alloc::vec::Vec;
use core::hash::Hash;

use crate::handlers::{EventRegistry, HandlerEntry, HandlerList, TypedHandler};
use crate::types::{EventId, Phase, RouteState, RoutedEvent};

/// The tree and handler storage an event is routed through.
///
/// `K` is the node key and `T` the class key.
pub trait RouteHost<K, T> {
    /// Parent of `node`, or `None` at a root.
    fn parent(&self, node: K) -> Option<K>;

    /// Class of `node`, if it has one.
    fn class_of(&self, node: K) -> Option<T>;

    /// Appends `class` and its ancestors to `out`, most-derived first.
    fn class_chain(&self, class: T, out: &mut Vec<T>);

    /// Instance handlers attached to `node`.
    fn instance_handlers(&self, node: K) -> Option<&HandlerList>;

    /// Registered events and class handlers.
    fn event_registry(&self) -> &EventRegistry<T>;
}

/// Writes the root→`origin` path into `out`.
pub fn route_path<K: Copy, T>(host: &impl RouteHost<K, T>, origin: K, out: &mut Vec<K>) {
    out.clear();
    let mut cur = Some(origin);
    while let Some(k) = cur {
        out.push(k);
        cur = host.parent(k);
    }
    out.reverse();
}

struct Step<K> {
    node: K,
    phase: Phase,
    entry: HandlerEntry,
}

fn collect_steps<C, K, T>(cx: &C, origin: K, event: EventId) -> Vec<Step<K>>
where
    C: RouteHost<K, T>,
    K: Copy,
    T: Copy + Eq + Hash,
{
    let registry = cx.event_registry();
    let Some(info) = registry.info(event) else {
        return Vec::new();
    };
    let mut path = Vec::new();
    route_path(cx, origin, &mut path);
    let mut classes = Vec::new();
    let mut steps = Vec::new();

    let mut visit = |node: K, phase: Phase, steps: &mut Vec<Step<K>>| {
        classes.clear();
        if let Some(class) = cx.class_of(node) {
            cx.class_chain(class, &mut classes);
        }
        for class in &classes {
            for entry in registry.class_handlers(*class, event) {
                steps.push(Step {
                    node,
                    phase,
                    entry: entry.clone(),
                });
            }
        }
        if let Some(list) = cx.instance_handlers(node) {
            for entry in list.for_event(event) {
                steps.push(Step {
                    node,
                    phase,
                    entry: entry.clone(),
                });
            }
        }
    };

    for &phase in info.strategy.phases() {
        match phase {
            Phase::Tunnel => {
                for &node in &path {
                    visit(node, phase, &mut steps);
                }
            }
            Phase::Bubble => {
                for &node in path.iter().rev() {
                    visit(node, phase, &mut steps);
                }
            }
            Phase::Direct => visit(origin, phase, &mut steps),
        }
    }
    steps
}

/// Raises `event` at `origin` and returns whether it ended up handled.
///
/// Handlers receive `cx` mutably, so they may change the tree or register
/// handlers; those changes apply to the next dispatch, not this one.
/// Handlers whose context or key type differs from `C`/`K` are skipped.
/// Raising an event that `cx`'s registry does not know is a no-op.
pub fn raise<C, K, T, A>(cx: &mut C, origin: K, event: RoutedEvent<A>, args: &mut A) -> bool
where
    C: RouteHost<K, T> + 'static,
    K: Copy + 'static,
    T: Copy + Eq + Hash,
    A: 'static,
{
    let steps = collect_steps(cx, origin, event.id());
    let mut state = RouteState::new(origin);
    for step in steps {
        if state.handled && !step.entry.handled_too {
            continue;
        }
        let Some(handler) = step.entry.handler.downcast_ref::<TypedHandler<C, K, A>>() else {
            continue;
        };
        state.current = step.node;
        state.phase = step.phase;
        (handler.0)(cx, &mut state, args);
    }
    state.handled
}
