// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Responder: routed events for retained UI trees.
//!
//! ## Overview
//!
//! An event is registered once with an [`EventRegistry`](handlers::EventRegistry),
//! which fixes its name, its argument type and its
//! [`RoutingStrategy`](types::RoutingStrategy):
//!
//! - `Bubble`: origin first, then each ancestor up to the root.
//! - `Tunnel`: root first, down to the origin.
//! - `TunnelBubble`: a full tunnel pass, then a full bubble pass.
//! - `Direct`: the origin only.
//!
//! Handlers come in two kinds. Class handlers are registered per element
//! class and run for every node of that class or a class derived from it.
//! Instance handlers live in a node's [`HandlerList`](handlers::HandlerList).
//! At each node on the route, class handlers run before instance handlers.
//!
//! ## Handled
//!
//! Handlers share a [`RouteState`](types::RouteState) for the whole dispatch.
//! Setting `handled` skips every later handler that was not registered with
//! `handled_too`. [`dispatcher::raise`] returns the final flag.
//!
//! ## Hover and focus
//!
//! [`PathState`](path::PathState) tracks a root→target path (the hovered or
//! focused chain) and reports which nodes were entered and left when it moves.
//!
//! This crate does not know about geometry or the element tree; the host
//! supplies both through [`RouteHost`](dispatcher::RouteHost).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod handlers;
pub mod path;
pub mod types;
