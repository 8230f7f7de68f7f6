// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element storage: generational handles, per-element state and the arena.

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use trellis_animation::{ClockId, StoryboardId};
use trellis_property::{PropertyStore, TypeTag};
use trellis_responder::handlers::HandlerList;
use trellis_style::{ClassId, PseudoClassId};

use crate::behavior::{ArrangeOptions, ElementBehavior};
use crate::properties::Stage;

/// Handle to an element in a [`UiHost`](crate::UiHost).
///
/// A slot index plus a generation. Slots are reused after
/// [`UiHost::destroy`](crate::UiHost::destroy); the generation is bumped on
/// reuse, so a handle to a destroyed element never aliases a new one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32, u32);

impl ElementId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self(index, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot generation.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Per-element validity and attachment bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Styled values reflect the current style source.
        const STYLE_VALID    = 0b0000_0001;
        /// Desired size reflects current inputs.
        const MEASURE_VALID  = 0b0000_0010;
        /// Render size reflects current inputs.
        const ARRANGE_VALID  = 0b0000_0100;
        /// Bounds and clip reflect current inputs.
        const POSITION_VALID = 0b0000_1000;
        /// The element is the host root or a descendant of it.
        const ATTACHED       = 0b0001_0000;
    }
}

impl ElementFlags {
    /// All four validity bits.
    pub const ALL_VALID: Self = Self::STYLE_VALID
        .union(Self::MEASURE_VALID)
        .union(Self::ARRANGE_VALID)
        .union(Self::POSITION_VALID);

    /// The validity bit for `stage`.
    #[must_use]
    pub const fn valid_bit(stage: Stage) -> Self {
        match stage {
            Stage::Style => Self::STYLE_VALID,
            Stage::Measure => Self::MEASURE_VALID,
            Stage::Arrange => Self::ARRANGE_VALID,
            Stage::Position => Self::POSITION_VALID,
        }
    }
}

/// Cached pipeline inputs and outputs of one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutCache {
    /// Available size passed to the most recent measure.
    pub most_recent_available: Size,
    /// Outer size the element asked for, margin included.
    pub desired_size: Size,
    /// Slot passed to the most recent arrange, relative to the parent.
    pub most_recent_final_rect: Rect,
    /// Options passed to the most recent arrange.
    pub most_recent_options: ArrangeOptions,
    /// Where the element was placed inside its slot, relative to the parent.
    pub layout_rect: Rect,
    /// Size the arrange override settled on.
    pub render_size: Size,
    /// Parent position passed to the most recent position pass.
    pub most_recent_position: Point,
    /// Bounds relative to the parent, render offset applied.
    pub relative_bounds: Rect,
    /// Bounds in host coordinates.
    pub absolute_bounds: Rect,
    /// Clip in host coordinates; `None` when nothing is cut off.
    pub clip: Option<Rect>,
}

pub(crate) struct Element {
    pub(crate) type_tag: TypeTag,
    pub(crate) name: Option<Box<str>>,
    pub(crate) classes: SmallVec<[ClassId; 2]>,
    pub(crate) pseudos: SmallVec<[PseudoClassId; 2]>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) flags: ElementFlags,
    pub(crate) depth: u32,
    pub(crate) properties: PropertyStore,
    pub(crate) layout: LayoutCache,
    // Taken out while one of its hooks runs.
    pub(crate) behavior: Option<Box<dyn ElementBehavior>>,
    pub(crate) handlers: HandlerList,
    pub(crate) storyboards: SmallVec<[(StoryboardId, ClockId); 1]>,
}

impl Element {
    pub(crate) fn new(type_tag: TypeTag, behavior: Box<dyn ElementBehavior>) -> Self {
        Self {
            type_tag,
            name: None,
            classes: SmallVec::new(),
            pseudos: SmallVec::new(),
            parent: None,
            children: Vec::new(),
            // Detached elements count as valid; attaching invalidates them.
            flags: ElementFlags::ALL_VALID,
            depth: 0,
            properties: PropertyStore::new(),
            layout: LayoutCache::default(),
            behavior: Some(behavior),
            handlers: HandlerList::new(),
            storyboards: SmallVec::new(),
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.flags.contains(ElementFlags::ATTACHED)
    }

    pub(crate) fn is_valid(&self, stage: Stage) -> bool {
        self.flags.contains(ElementFlags::valid_bit(stage))
    }

    pub(crate) fn set_valid(&mut self, stage: Stage, valid: bool) {
        self.flags.set(ElementFlags::valid_bit(stage), valid);
    }

    pub(crate) fn clock_for(&self, storyboard: StoryboardId) -> Option<ClockId> {
        self.storyboards
            .iter()
            .find(|(sb, _)| *sb == storyboard)
            .map(|(_, clock)| *clock)
    }
}

impl core::fmt::Debug for Element {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Element")
            .field("type_tag", &self.type_tag)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("depth", &self.depth)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Slot storage for elements.
#[derive(Default)]
pub(crate) struct ElementArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl core::fmt::Debug for ElementArena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementArena")
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .field("live", &self.live)
            .finish()
    }
}

impl ElementArena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn insert(&mut self, element: Element) -> ElementId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.element = Some(element);
            return ElementId::new(index, slot.generation);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        assert!(index < u32::MAX, "Too many elements");
        self.slots.push(Slot {
            generation: 1,
            element: Some(element),
        });
        ElementId::new(index, 1)
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Option<Element> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        let element = slot.element.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(element)
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<&Element> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.element.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.element.as_mut()
    }

    pub(crate) fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }
}
