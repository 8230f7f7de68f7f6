// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core routed-event types.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// How an event travels through the tree, fixed at registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoutingStrategy {
    /// Origin first, then each ancestor up to the root.
    Bubble,
    /// Root first, then each descendant down to the origin.
    Tunnel,
    /// A full tunnel pass followed by a full bubble pass.
    TunnelBubble,
    /// Only the origin.
    Direct,
}

impl RoutingStrategy {
    /// Phases this strategy runs, in order.
    #[must_use]
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Self::Bubble => &[Phase::Bubble],
            Self::Tunnel => &[Phase::Tunnel],
            Self::TunnelBubble => &[Phase::Tunnel, Phase::Bubble],
            Self::Direct => &[Phase::Direct],
        }
    }
}

/// The pass a handler is being invoked in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Root → origin.
    Tunnel,
    /// Origin → root.
    Bubble,
    /// Origin only.
    Direct,
}

/// Untyped event identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub(crate) u16);

impl EventId {
    /// Raw index within its [`EventRegistry`](crate::handlers::EventRegistry).
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// Typed handle to a registered event carrying arguments of type `A`.
pub struct RoutedEvent<A> {
    id: EventId,
    _marker: PhantomData<fn(A)>,
}

impl<A> RoutedEvent<A> {
    pub(crate) const fn from_id(id: EventId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped id.
    #[must_use]
    pub const fn id(self) -> EventId {
        self.id
    }
}

impl<A> Copy for RoutedEvent<A> {}

impl<A> Clone for RoutedEvent<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> PartialEq for RoutedEvent<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for RoutedEvent<A> {}

impl<A> Hash for RoutedEvent<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A> fmt::Debug for RoutedEvent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedEvent")
            .field("id", &self.id)
            .field("args", &core::any::type_name::<A>())
            .finish()
    }
}

/// Identifies one registered handler so it can be removed later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u32);

/// Routing state shared by every handler of one dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RouteState<K> {
    /// Where the event was raised.
    pub source: K,
    /// The node whose handlers are running.
    pub current: K,
    /// Pass in progress.
    pub phase: Phase,
    /// Once set, only handlers registered for handled events still run.
    pub handled: bool,
}

impl<K: Copy> RouteState<K> {
    pub(crate) fn new(source: K) -> Self {
        Self {
            source,
            current: source,
            phase: Phase::Direct,
            handled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_phases() {
        assert_eq!(RoutingStrategy::Bubble.phases(), &[Phase::Bubble]);
        assert_eq!(
            RoutingStrategy::TunnelBubble.phases(),
            &[Phase::Tunnel, Phase::Bubble]
        );
        assert_eq!(RoutingStrategy::Direct.phases(), &[Phase::Direct]);
    }

    #[test]
    fn route_state_starts_unhandled_at_source() {
        let state = RouteState::new(7_u32);
        assert_eq!(state.current, 7);
        assert!(!state.handled);
    }
}
