// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event registration and handler storage.
//!
//! Handlers for every event live side by side, so they are stored type-erased
//! and recovered by the event's argument type when the event is raised.
//! Handlers are reference counted: a dispatch snapshots its route before
//! running anything, and handlers added or removed during that dispatch only
//! affect later ones.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::types::{EventId, HandlerId, RouteState, RoutedEvent, RoutingStrategy};

/// Signature of a routed-event handler.
///
/// `C` is the dispatch context (usually the UI host), `K` the node key and
/// `A` the event arguments.
pub type HandlerFn<C, K, A> = dyn Fn(&mut C, &mut RouteState<K>, &mut A);

pub(crate) struct TypedHandler<C, K, A>(pub(crate) Box<HandlerFn<C, K, A>>);

/// One registered handler.
#[derive(Clone)]
pub struct HandlerEntry {
    pub(crate) id: HandlerId,
    pub(crate) handler: Rc<dyn Any>,
    pub(crate) handled_too: bool,
}

impl HandlerEntry {
    fn new<C: 'static, K: 'static, A: 'static>(
        id: HandlerId,
        handled_too: bool,
        f: impl Fn(&mut C, &mut RouteState<K>, &mut A) + 'static,
    ) -> Self {
        Self {
            id,
            handler: Rc::new(TypedHandler::<C, K, A>(Box::new(f))),
            handled_too,
        }
    }

    /// The handler's id.
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Whether the handler runs after the event is marked handled.
    #[must_use]
    pub fn handles_handled(&self) -> bool {
        self.handled_too
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("id", &self.id)
            .field("handled_too", &self.handled_too)
            .finish_non_exhaustive()
    }
}

/// Per-node instance handlers, kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct HandlerList {
    entries: SmallVec<[(EventId, HandlerEntry); 2]>,
    next_id: u32,
}

impl HandlerList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of handlers across all events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Adds a handler for `event`.
    ///
    /// With `handled_too` the handler still runs after an earlier handler
    /// marked the event handled.
    pub fn add<C: 'static, K: 'static, A: 'static>(
        &mut self,
        event: RoutedEvent<A>,
        handled_too: bool,
        f: impl Fn(&mut C, &mut RouteState<K>, &mut A) + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries
            .push((event.id(), HandlerEntry::new(id, handled_too, f)));
        id
    }

    /// Removes a handler; returns `true` if it was present.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, e)| e.id != id);
        self.entries.len() != before
    }

    /// Removes every handler.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Handlers for `event` in registration order.
    pub fn for_event(&self, event: EventId) -> impl Iterator<Item = &HandlerEntry> + '_ {
        self.entries
            .iter()
            .filter(move |(e, _)| *e == event)
            .map(|(_, h)| h)
    }
}

/// Static description of a registered event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventInfo {
    /// Event name, unique within its registry.
    pub name: &'static str,
    /// How the event is routed.
    pub strategy: RoutingStrategy,
    /// Rust type name of the argument type.
    pub args_type: &'static str,
}

/// Registered events and their class handlers.
///
/// `T` is the class (element type) key. Class handlers run for every node
/// whose class is `T` or derives from it, before that node's instance
/// handlers.
pub struct EventRegistry<T> {
    events: Vec<EventInfo>,
    class_handlers: HashMap<(T, EventId), SmallVec<[HandlerEntry; 2]>>,
    next_id: u32,
}

impl<T> Default for EventRegistry<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            class_handlers: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EventRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.events)
            .field("class_handlers", &self.class_handlers.len())
            .finish_non_exhaustive()
    }
}

impl<T: Copy + Eq + Hash> EventRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn register<A: 'static>(
        &mut self,
        name: &'static str,
        strategy: RoutingStrategy,
    ) -> RoutedEvent<A> {
        assert!(
            self.by_name(name).is_none(),
            "Event '{name}' is already registered"
        );
        assert!(
            self.events.len() < u16::MAX as usize,
            "Too many events registered"
        );
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = EventId(self.events.len() as u16);
        self.events.push(EventInfo {
            name,
            strategy,
            args_type: core::any::type_name::<A>(),
        });
        RoutedEvent::from_id(id)
    }

    /// Looks an event up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<EventId> {
        self.events.iter().position(|e| e.name == name).map(|i| {
            #[expect(clippy::cast_possible_truncation, reason = "len < u16::MAX")]
            EventId(i as u16)
        })
    }

    /// Registration info for an event.
    #[must_use]
    pub fn info(&self, event: EventId) -> Option<&EventInfo> {
        self.events.get(event.0 as usize)
    }

    /// Adds a handler that runs for every node of `class` (or a derived class).
    pub fn add_class_handler<C: 'static, K: 'static, A: 'static>(
        &mut self,
        class: T,
        event: RoutedEvent<A>,
        handled_too: bool,
        f: impl Fn(&mut C, &mut RouteState<K>, &mut A) + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.class_handlers
            .entry((class, event.id()))
            .or_default()
            .push(HandlerEntry::new(id, handled_too, f));
        id
    }

    /// Removes a class handler; returns `true` if it was present.
    pub fn remove_class_handler(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for list in self.class_handlers.values_mut() {
            let before = list.len();
            list.retain(|e| e.id != id);
            removed |= list.len() != before;
        }
        removed
    }

    /// Class handlers registered directly on `class` for `event`.
    #[must_use]
    pub fn class_handlers(&self, class: T, event: EventId) -> &[HandlerEntry] {
        self.class_handlers
            .get(&(class, event))
            .map_or(&[], |l| l.as_slice())
    }
}
