// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline stages, their dirty channels and the built-in element properties.

use kurbo::{Insets, Vec2};
use trellis_dirty::{Channel, ChannelSet};
use trellis_property::{
    Property, PropertyMetadata, PropertyMetadataBuilder, PropertyRegistry, PropertyValue, TypeTag,
};
use trellis_style::PseudoClassId;

/// Dirty channel of the style stage.
pub const STYLE: Channel = Channel::new(0);
/// Dirty channel of the measure stage.
pub const MEASURE: Channel = Channel::new(1);
/// Dirty channel of the arrange stage.
pub const ARRANGE: Channel = Channel::new(2);
/// Dirty channel of the position stage.
pub const POSITION: Channel = Channel::new(3);

/// Pseudo-class set while the pointer is over an element or its descendants.
pub const HOVER: PseudoClassId = PseudoClassId(0);
/// Pseudo-class set while an element has keyboard focus.
pub const FOCUS: PseudoClassId = PseudoClassId(1);

/// One pipeline stage. Stages always run in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Resolve styled property values.
    Style,
    /// Compute the desired size.
    Measure,
    /// Fit into the slot given by the parent.
    Arrange,
    /// Compute bounds and clip in host coordinates.
    Position,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Self; 4] = [Self::Style, Self::Measure, Self::Arrange, Self::Position];

    /// The dirty channel backing this stage's queue.
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::Style => STYLE,
            Self::Measure => MEASURE,
            Self::Arrange => ARRANGE,
            Self::Position => POSITION,
        }
    }
}

/// Which stage a property change invalidates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Affects {
    /// Rendering only.
    #[default]
    Nothing,
    /// The element's measure and its parent's measure.
    Measure,
    /// The element's arrange.
    Arrange,
    /// The element's position.
    Position,
}

impl From<Affects> for ChannelSet {
    fn from(affects: Affects) -> Self {
        match affects {
            Affects::Nothing => Self::EMPTY,
            Affects::Measure => MEASURE.into_set(),
            Affects::Arrange => ARRANGE.into_set(),
            Affects::Position => POSITION.into_set(),
        }
    }
}

/// Whether an element takes part in layout and drawing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Drawn and hit-testable.
    #[default]
    Visible,
    /// Not drawn; laid out at zero size.
    Hidden,
    /// Not drawn; laid out at zero size.
    Collapsed,
}

/// Horizontal placement inside the arrange slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    /// Fill the slot.
    #[default]
    Stretch,
    /// Left edge.
    Start,
    /// Centered.
    Center,
    /// Right edge.
    End,
}

/// Vertical placement inside the arrange slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// Fill the slot.
    #[default]
    Stretch,
    /// Top edge.
    Start,
    /// Centered.
    Center,
    /// Bottom edge.
    End,
}

/// Stacking direction of a [`Stack`](crate::Stack).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children top to bottom.
    #[default]
    Vertical,
    /// Children left to right.
    Horizontal,
}

/// Handles to the properties every host registers.
///
/// Read them through [`UiHost::properties`](crate::UiHost::properties).
#[derive(Copy, Clone, Debug)]
pub struct BuiltinProperties {
    /// Root element type; every element type derives from it.
    pub ui_element: TypeTag,
    /// Element type of [`Stack`](crate::Stack) panels.
    pub stack_panel: TypeTag,

    /// Explicit width; `None` sizes to content.
    pub width: Property<Option<f64>>,
    /// Explicit height; `None` sizes to content.
    pub height: Property<Option<f64>>,
    /// Lower bound on the width.
    pub min_width: Property<f64>,
    /// Lower bound on the height.
    pub min_height: Property<f64>,
    /// Upper bound on the width.
    pub max_width: Property<f64>,
    /// Upper bound on the height.
    pub max_height: Property<f64>,
    /// Space kept clear around the element.
    pub margin: Property<Insets>,
    /// Horizontal placement in the slot.
    pub horizontal_alignment: Property<HorizontalAlignment>,
    /// Vertical placement in the slot.
    pub vertical_alignment: Property<VerticalAlignment>,
    /// Layout participation.
    pub visibility: Property<Visibility>,
    /// Drawing opacity, clamped to `0..=1`.
    pub opacity: Property<f32>,
    /// Offset applied after layout, without affecting siblings.
    pub render_offset: Property<Vec2>,
    /// Whether hit testing may return the element.
    pub is_hit_test_visible: Property<bool>,
    /// Whether the element can take keyboard focus.
    pub focusable: Property<bool>,
    /// Whether the element takes input. Disabling an element disables its
    /// descendants too.
    pub is_enabled: Property<bool>,
    /// Whether focus navigation stops at the element.
    pub is_tab_stop: Property<bool>,
    /// Position in the tab order; lower comes first, ties keep tree order.
    pub tab_index: Property<i32>,
    /// Set by the host while the pointer is over the element.
    pub is_hovering: Property<bool>,
    /// Set by the host while the element has focus.
    pub is_focused: Property<bool>,
    /// Stacking direction of a stack panel.
    pub orientation: Property<Orientation>,
}

fn length(default: f64, affects: Affects) -> PropertyMetadata<f64> {
    PropertyMetadataBuilder::new(default)
        .affects_channels(affects.into())
        .coerce(|v: f64, _| if v.is_nan() { 0.0 } else { v.max(0.0) })
        .build()
}

fn plain<T: PropertyValue>(default: T, affects: Affects) -> PropertyMetadata<T> {
    PropertyMetadataBuilder::new(default)
        .affects_channels(affects.into())
        .build()
}

impl BuiltinProperties {
    pub(crate) fn register(registry: &mut PropertyRegistry) -> Self {
        let ui_element = registry.register_type("UIElement", None);
        let stack_panel = registry.register_type("StackPanel", Some(ui_element));
        let explicit = || {
            PropertyMetadataBuilder::new(None)
                .affects_channels(Affects::Measure.into())
                .coerce(|v: Option<f64>, _| v.filter(|w| w.is_finite()).map(|w| w.max(0.0)))
                .build()
        };
        Self {
            ui_element,
            stack_panel,
            width: registry.register(ui_element, "Width", explicit()),
            height: registry.register(ui_element, "Height", explicit()),
            min_width: registry.register(ui_element, "MinWidth", length(0.0, Affects::Measure)),
            min_height: registry.register(ui_element, "MinHeight", length(0.0, Affects::Measure)),
            max_width: registry.register(
                ui_element,
                "MaxWidth",
                length(f64::INFINITY, Affects::Measure),
            ),
            max_height: registry.register(
                ui_element,
                "MaxHeight",
                length(f64::INFINITY, Affects::Measure),
            ),
            margin: registry.register(ui_element, "Margin", plain(Insets::ZERO, Affects::Measure)),
            horizontal_alignment: registry.register(
                ui_element,
                "HorizontalAlignment",
                plain(HorizontalAlignment::Stretch, Affects::Arrange),
            ),
            vertical_alignment: registry.register(
                ui_element,
                "VerticalAlignment",
                plain(VerticalAlignment::Stretch, Affects::Arrange),
            ),
            visibility: registry.register(
                ui_element,
                "Visibility",
                plain(Visibility::Visible, Affects::Measure),
            ),
            opacity: registry.register(
                ui_element,
                "Opacity",
                PropertyMetadataBuilder::new(1.0_f32)
                    .coerce(|v: f32, _| if v.is_nan() { 1.0 } else { v.clamp(0.0, 1.0) })
                    .build(),
            ),
            render_offset: registry.register(
                ui_element,
                "RenderOffset",
                plain(Vec2::ZERO, Affects::Position),
            ),
            is_hit_test_visible: registry.register(
                ui_element,
                "IsHitTestVisible",
                plain(true, Affects::Nothing),
            ),
            focusable: registry.register(ui_element, "Focusable", plain(false, Affects::Nothing)),
            is_enabled: registry.register(ui_element, "IsEnabled", plain(true, Affects::Nothing)),
            is_tab_stop: registry.register(ui_element, "IsTabStop", plain(true, Affects::Nothing)),
            tab_index: registry.register(ui_element, "TabIndex", plain(0_i32, Affects::Nothing)),
            is_hovering: registry.register(ui_element, "IsHovering", plain(false, Affects::Nothing)),
            is_focused: registry.register(ui_element, "IsFocused", plain(false, Affects::Nothing)),
            orientation: registry.register(
                stack_panel,
                "Orientation",
                plain(Orientation::Vertical, Affects::Measure),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_property::PropertyStore;

    #[test]
    fn affects_maps_to_one_channel() {
        assert!(ChannelSet::from(Affects::Nothing).is_empty());
        assert!(ChannelSet::from(Affects::Measure).contains(MEASURE));
        assert!(!ChannelSet::from(Affects::Measure).contains(ARRANGE));
        assert_eq!(Stage::Position.channel(), POSITION);
    }

    #[test]
    fn builtins_coerce_and_inherit() {
        let mut registry = PropertyRegistry::new();
        let props = BuiltinProperties::register(&mut registry);
        assert_eq!(
            registry.find(props.stack_panel, "Width"),
            Some(props.width.id())
        );
        assert_eq!(registry.find(props.ui_element, "Orientation"), None);

        let mut store = PropertyStore::new();
        store.set_local(props.opacity, 3.0, &registry).unwrap();
        assert_eq!(*store.effective(props.opacity, &registry), 1.0);
        store.set_local(props.width, Some(-4.0), &registry).unwrap();
        assert_eq!(*store.effective(props.width, &registry), Some(0.0));
        assert_eq!(registry.affects_channels(props.margin.id()), MEASURE.into_set());
    }
}
