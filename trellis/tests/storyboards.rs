// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for storyboards played on a `trellis` host.

use kurbo::Size;
use trellis::trellis_animation::{ClockState, Easing, KeyframeTrack, LoopBehavior, Storyboard};
use trellis::trellis_style::{ClassId, Selector};
use trellis::{Container, Leaf, Stack, Stage, UiHost};

fn fade() -> Storyboard {
    Storyboard::builder()
        .animate(
            "Opacity",
            KeyframeTrack::new()
                .key(0.0, 0.0_f32, Easing::Linear)
                .key(1.0, 1.0, Easing::Linear),
        )
        .build()
}

#[test]
fn begin_applies_first_sample_and_update_advances() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.ui_element, Container);
    host.set_root(root).unwrap();
    host.set_local(root, props.opacity, 0.8).unwrap();

    let board = fade();
    let clock = host.begin_storyboard(root, &board).unwrap();
    assert_eq!(*host.get(root, props.opacity), 0.0);
    assert_eq!(host.clock_state(clock), Some(ClockState::Playing));

    host.update(0.5).unwrap();
    assert_eq!(*host.get(root, props.opacity), 0.5);
    host.update(1.0).unwrap();
    assert_eq!(*host.get(root, props.opacity), 1.0);
    assert_eq!(host.clock_state(clock), Some(ClockState::Finished));

    assert!(host.stop_storyboard(root, board.id()).unwrap());
    assert_eq!(*host.get(root, props.opacity), 0.8, "local value shows again");
    assert!(!host.stop_storyboard(root, board.id()).unwrap());
    assert_eq!(host.clock_state(clock), None);
}

#[test]
fn animated_layout_property_relayouts_on_update() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.stack_panel, Stack);
    let leaf = host.create_element(props.ui_element, Leaf::new(Size::new(10.0, 10.0)));
    host.set_root(root).unwrap();
    host.add_child(root, leaf).unwrap();
    host.run_pending_layout().unwrap();

    let board = Storyboard::builder()
        .target(Some(Selector::of_type(props.ui_element)))
        .animate(
            "MinWidth",
            KeyframeTrack::new()
                .key(0.0, 0.0_f64, Easing::Linear)
                .key(2.0, 100.0, Easing::Linear),
        )
        .build();
    host.begin_storyboard(root, &board).unwrap();

    host.update(1.0).unwrap();
    assert!(host.is_idle());
    assert_eq!(host.layout(leaf).unwrap().desired_size, Size::new(50.0, 10.0));
    assert_eq!(host.layout(root).unwrap().desired_size, Size::new(50.0, 10.0));
}

#[test]
fn restarting_keeps_one_clock_and_reuses_slots() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.ui_element, Container);
    host.set_root(root).unwrap();

    let board = fade();
    let first = host.begin_storyboard(root, &board).unwrap();
    host.update(0.5).unwrap();
    let second = host.begin_storyboard(root, &board).unwrap();
    assert_ne!(first, second);
    assert_eq!(host.active_clocks(), 1);
    assert_eq!(host.storyboard_clock(root, board.id()), Some(second));
    assert_eq!(host.clock_state(first), None);
    assert_eq!(*host.get(root, props.opacity), 0.0, "restarted from the beginning");

    let capacity = host.clock_capacity();
    host.begin_storyboard(root, &board).unwrap();
    assert_eq!(host.active_clocks(), 1);
    assert_eq!(host.clock_capacity(), capacity);
}

#[test]
fn selectors_pick_targets_and_mismatches_are_skipped() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.ui_element, Container);
    let marked = host.create_element(props.ui_element, Container);
    let plain = host.create_element(props.ui_element, Container);
    host.set_root(root).unwrap();
    host.add_child(root, marked).unwrap();
    host.add_child(root, plain).unwrap();
    host.add_class(marked, ClassId(7)).unwrap();

    let board = Storyboard::builder()
        .target(Some(Selector::any().class(ClassId(7))))
        .animate(
            "Opacity",
            KeyframeTrack::new().key(0.0, 0.25_f32, Easing::Linear),
        )
        // Width holds an `Option<f64>`, so an `f64` track does not fit.
        .animate("Width", KeyframeTrack::new().key(0.0, 5.0_f64, Easing::Linear))
        .animate("NoSuchProperty", KeyframeTrack::new().key(0.0, 1.0_f64, Easing::Linear))
        .build();
    host.begin_storyboard(root, &board).unwrap();

    assert_eq!(*host.get(marked, props.opacity), 0.25);
    assert_eq!(*host.get(plain, props.opacity), 1.0);
    assert_eq!(*host.get(root, props.opacity), 1.0);
    assert_eq!(*host.get(marked, props.width), None);
}

#[test]
fn looping_pause_and_resume() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.ui_element, Container);
    host.set_root(root).unwrap();

    let board = Storyboard::builder()
        .loop_behavior(LoopBehavior::Loop)
        .animate(
            "Opacity",
            KeyframeTrack::new()
                .key(0.0, 0.0_f32, Easing::Linear)
                .key(1.0, 1.0, Easing::Linear),
        )
        .build();
    let clock = host.begin_storyboard(root, &board).unwrap();
    host.update(1.25).unwrap();
    assert_eq!(*host.get(root, props.opacity), 0.25);

    host.pause_clock(clock);
    host.update(0.5).unwrap();
    assert_eq!(*host.get(root, props.opacity), 0.25);
    assert_eq!(host.clock_state(clock), Some(ClockState::Paused));

    host.resume_clock(clock);
    host.update(0.5).unwrap();
    assert_eq!(*host.get(root, props.opacity), 0.75);
}

#[test]
fn clearing_and_destroying_release_animation_state() {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.ui_element, Container);
    let child = host.create_element(props.ui_element, Container);
    host.set_root(root).unwrap();
    host.add_child(root, child).unwrap();

    let board = Storyboard::builder()
        .target(Some(Selector::any()))
        .animate(
            "Opacity",
            KeyframeTrack::new()
                .key(0.0, 0.0_f32, Easing::Linear)
                .key(1.0, 1.0, Easing::Linear),
        )
        .build();
    host.begin_storyboard(root, &board).unwrap();
    assert_eq!(*host.get(child, props.opacity), 0.0);

    host.clear_animations(child, false).unwrap();
    assert_eq!(*host.get(child, props.opacity), 1.0);
    host.update(0.5).unwrap();
    assert_eq!(*host.get(child, props.opacity), 1.0, "unbound from the clock");
    assert_eq!(*host.get(root, props.opacity), 0.5);

    host.cleanup(root).unwrap();
    assert_eq!(host.active_clocks(), 0);
    assert_eq!(*host.get(root, props.opacity), 1.0);
    assert!(!host.is_valid(root, Stage::Measure));
    host.run_pending_layout().unwrap();

    host.begin_storyboard(root, &board).unwrap();
    assert_eq!(host.active_clocks(), 1);
    assert!(host.destroy(root));
    assert_eq!(host.active_clocks(), 0);
    assert!(host.update(0.1).is_ok());
}
