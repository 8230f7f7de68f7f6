// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification: turning property changes into queued stage work.

use trellis_dirty::ChannelSet;
use trellis_property::PropertyChange;

use crate::element::ElementId;
use crate::host::UiHost;
use crate::properties::{ARRANGE, MEASURE, POSITION, Stage};

impl UiHost {
    /// Marks `stage` of `id` stale and queues it.
    ///
    /// A no-op for detached and stale elements.
    pub fn invalidate(&mut self, id: ElementId, stage: Stage) {
        let Some(element) = self.arena.get_mut(id) else {
            return;
        };
        if !element.is_attached() {
            return;
        }
        element.set_valid(stage, false);
        self.queues.push(id, stage.channel());
    }

    /// Invalidates the style of `id` and every descendant.
    pub fn invalidate_style_subtree(&mut self, id: ElementId) {
        let mut subtree = core::mem::take(&mut self.path_scratch);
        self.collect_subtree(id, &mut subtree);
        for &element in &subtree {
            self.invalidate(element, Stage::Style);
        }
        self.path_scratch = subtree;
    }

    /// Applies the channels a property change declares.
    ///
    /// A measure change queues the element first and then its parent, so the
    /// measure queue drains leaf to root.
    pub(crate) fn invalidate_channels(&mut self, id: ElementId, channels: ChannelSet) {
        if channels.contains(MEASURE) {
            self.invalidate(id, Stage::Measure);
            if let Some(parent) = self.parent(id) {
                self.invalidate(parent, Stage::Measure);
            }
        }
        if channels.contains(ARRANGE) {
            self.invalidate(id, Stage::Arrange);
        }
        if channels.contains(POSITION) {
            self.invalidate(id, Stage::Position);
        }
    }

    /// Forwards a store write's result; returns `true` if it was a change.
    pub(crate) fn notify(&mut self, id: ElementId, change: Option<PropertyChange>) -> bool {
        let Some(change) = change else {
            return false;
        };
        self.invalidate_channels(id, change.channels);
        if change.property == self.props.is_enabled.id() {
            self.enabled_changed(id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::behavior::Container;
    use crate::host::UiHost;
    use crate::properties::Stage;

    #[test]
    fn detached_elements_are_never_queued() {
        let mut host = UiHost::new();
        let props = *host.properties();
        let e = host.create_element(props.ui_element, Container);
        assert!(host.set_local(e, props.width, Some(20.0)).unwrap());
        for stage in Stage::ALL {
            assert!(host.is_valid(e, stage));
            assert!(!host.is_queued(e, stage));
        }
    }

    #[test]
    fn measure_change_queues_self_then_parent() {
        let mut host = UiHost::new();
        let props = *host.properties();
        let parent = host.create_element(props.ui_element, Container);
        let child = host.create_element(props.ui_element, Container);
        host.set_root(parent).unwrap();
        host.add_child(parent, child).unwrap();
        host.run_pending_layout().unwrap();

        host.set_local(child, props.margin, kurbo::Insets::uniform(2.0))
            .unwrap();
        assert_eq!(host.queued(Stage::Measure).collect::<Vec<_>>(), [child, parent]);
        assert!(!host.is_valid(parent, Stage::Measure));
    }

    #[test]
    fn arrange_and_position_changes_stay_local() {
        let mut host = UiHost::new();
        let props = *host.properties();
        let parent = host.create_element(props.ui_element, Container);
        let child = host.create_element(props.ui_element, Container);
        host.set_root(parent).unwrap();
        host.add_child(parent, child).unwrap();
        host.run_pending_layout().unwrap();

        host.set_local(child, props.render_offset, kurbo::Vec2::new(1.0, 0.0))
            .unwrap();
        assert!(host.is_queued(child, Stage::Position));
        assert!(!host.is_queued(parent, Stage::Position));
        assert!(host.is_valid(child, Stage::Arrange));
    }
}
