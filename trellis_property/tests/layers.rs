// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `trellis_property` crate.
//!
//! These exercise value resolution across the styled, local and animated
//! layers through both the typed and the name-based (erased) entry points.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trellis_dirty::Channel;
use trellis_property::{
    ErasedValue, Layer, PropertyMetadataBuilder, PropertyRegistry, PropertyStore,
};

const MEASURE: Channel = Channel::new(1);
const ARRANGE: Channel = Channel::new(2);

#[test]
fn precedence_walks_down_one_layer_at_a_time() {
    let mut registry = PropertyRegistry::new();
    let element = registry.register_type("UIElement", None);
    let width = registry.register(
        element,
        "Width",
        PropertyMetadataBuilder::new(0.0_f64)
            .affects_channels(MEASURE.into_set())
            .build(),
    );

    let mut store = PropertyStore::new();
    store.set_styled(width, 10.0, &registry).unwrap();
    store.set_local(width, 20.0, &registry).unwrap();
    store.set_animated(width, 30.0, &registry).unwrap();

    let mut seen = vec![*store.effective(width, &registry)];
    for layer in [Layer::Animated, Layer::Local, Layer::Styled] {
        let change = store.clear(width, layer, &registry).unwrap();
        assert!(change.is_some(), "clearing {layer:?} changes the value");
        seen.push(*store.effective(width, &registry));
    }
    assert_eq!(seen, [30.0, 20.0, 10.0, 0.0]);
}

#[test]
fn name_lookup_walks_the_type_chain() {
    let mut registry = PropertyRegistry::new();
    let element = registry.register_type("UIElement", None);
    let control = registry.register_type("Control", Some(element));
    let button = registry.register_type("Button", Some(control));
    let padding = registry.register(
        control,
        "Padding",
        PropertyMetadataBuilder::new(0_i32)
            .affects_channels(ARRANGE.into_set())
            .build(),
    );

    let id = registry.find(button, "Padding").expect("declared on a base type");
    assert_eq!(id, padding.id());
    assert_eq!(registry.find(element, "Padding"), None);

    let mut store = PropertyStore::new();
    let change = store
        .set_erased(id, Layer::Animated, ErasedValue::new(4_i32), &registry)
        .unwrap()
        .unwrap();
    assert!(change.channels.contains(ARRANGE));
    assert_eq!(store.get_layer(padding, Layer::Animated), Some(&4));
    assert!(store.clear_erased(id, Layer::Animated, &registry).unwrap().is_some());
    assert!(store.is_empty());
}

#[test]
fn changed_callback_runs_once_per_real_change() {
    let mut registry = PropertyRegistry::new();
    let element = registry.register_type("UIElement", None);
    let counter = Arc::new(AtomicUsize::new(0));
    let hook = counter.clone();
    let visible = registry.register(
        element,
        "IsVisible",
        PropertyMetadataBuilder::new(true)
            .on_changed(move |_, _| {
                hook.fetch_add(1, Ordering::Relaxed);
            })
            .build(),
    );

    let mut store = PropertyStore::new();
    let mut reported = 0;
    for value in [true, false, false, true, true] {
        if store.set_local(visible, value, &registry).unwrap().is_some() {
            reported += 1;
        }
    }
    assert_eq!(reported, 2);
    assert_eq!(counter.load(Ordering::Relaxed), 2);
}
