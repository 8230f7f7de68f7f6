// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The UI host: element tree, property access and event routing glue.

use std::rc::Rc;

use kurbo::Size;
use smallvec::SmallVec;
use trellis_animation::{ClockId, ClockPool};
use trellis_dirty::{DirtyQueues, TraversalScratch};
use trellis_property::{
    ErasedValue, Layer, Property, PropertyId, PropertyMetadata, PropertyRegistry, PropertyValue,
    TypeTag,
};
use trellis_responder::dispatcher::{self, RouteHost};
use trellis_responder::handlers::{EventRegistry, HandlerList};
use trellis_responder::path::PathState;
use trellis_responder::types::{HandlerId, RouteState, RoutedEvent};
use trellis_style::{ClassId, PseudoClassId, Style, StyleProvider};

use crate::behavior::ElementBehavior;
use crate::config::HostConfig;
use crate::element::{Element, ElementArena, ElementFlags, ElementId, LayoutCache};
use crate::error::LayoutError;
use crate::input::BuiltinEvents;
use crate::properties::{BuiltinProperties, FOCUS, HOVER, Stage};

const STAGE_COUNT: usize = Stage::ALL.len();

/// Owns an element tree and everything needed to keep its layout current.
///
/// All state that would otherwise be global lives here: the property
/// registry, the four stage queues, the clock pool and the event registry.
/// Hosts are independent of each other.
///
/// A frame is [`update`](Self::update) (or
/// [`run_pending_layout`](Self::run_pending_layout)) followed by
/// [`draw`](Self::draw).
///
/// ```rust
/// use kurbo::Size;
/// use trellis::{Leaf, Stack, UiHost};
///
/// let mut host = UiHost::new();
/// let props = *host.properties();
/// let panel = host.create_element(props.stack_panel, Stack);
/// let a = host.create_element(props.ui_element, Leaf::new(Size::new(40.0, 10.0)));
/// let b = host.create_element(props.ui_element, Leaf::new(Size::new(60.0, 20.0)));
/// host.set_root(panel).unwrap();
/// host.add_child(panel, a).unwrap();
/// host.add_child(panel, b).unwrap();
/// host.run_pending_layout().unwrap();
///
/// assert_eq!(host.layout(b).unwrap().absolute_bounds.y0, 10.0);
/// ```
pub struct UiHost {
    pub(crate) config: HostConfig,
    pub(crate) registry: PropertyRegistry,
    pub(crate) props: BuiltinProperties,
    pub(crate) events: BuiltinEvents,
    pub(crate) event_registry: EventRegistry<TypeTag>,
    pub(crate) arena: ElementArena,
    pub(crate) root: Option<ElementId>,
    pub(crate) queues: DirtyQueues<ElementId>,
    pub(crate) style_provider: Option<Rc<dyn StyleProvider>>,
    pub(crate) clocks: ClockPool<ElementId>,
    pub(crate) hover: PathState<ElementId>,
    pub(crate) focus: PathState<ElementId>,
    // Reused buffers. Child lists nest with layout recursion, so there is
    // one per depth currently in use.
    child_buffers: Vec<Vec<ElementId>>,
    pub(crate) traversal: TraversalScratch<ElementId>,
    pub(crate) style_scratch: Vec<Style>,
    pub(crate) style_values: Vec<(PropertyId, ErasedValue)>,
    pub(crate) path_scratch: Vec<ElementId>,
    pub(crate) clock_scratch: Vec<ClockId>,
}

impl core::fmt::Debug for UiHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiHost")
            .field("config", &self.config)
            .field("arena", &self.arena)
            .field("root", &self.root)
            .field("queues", &self.queues)
            .field("clocks", &self.clocks.len())
            .field("hover", &self.hover.target())
            .field("focus", &self.focus.target())
            .finish_non_exhaustive()
    }
}

impl Default for UiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl UiHost {
    /// Creates a host with [`HostConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// Creates a host; registers the built-in types, properties and events.
    #[must_use]
    pub fn with_config(config: HostConfig) -> Self {
        let mut registry = PropertyRegistry::new();
        let props = BuiltinProperties::register(&mut registry);
        let mut event_registry = EventRegistry::new();
        let events = BuiltinEvents::register(&mut event_registry, props.ui_element);
        let capacity = config.scratch_capacity;
        Self {
            registry,
            props,
            events,
            event_registry,
            arena: ElementArena::with_capacity(capacity),
            root: None,
            queues: DirtyQueues::with_capacity(STAGE_COUNT, capacity),
            style_provider: None,
            clocks: ClockPool::with_capacity(config.clock_pool_capacity),
            hover: PathState::new(),
            focus: PathState::new(),
            child_buffers: Vec::new(),
            traversal: TraversalScratch::with_capacity(capacity),
            style_scratch: Vec::new(),
            style_values: Vec::new(),
            path_scratch: Vec::with_capacity(capacity),
            clock_scratch: Vec::new(),
            config,
        }
    }

    /// The configuration the host was created with.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Resizes the viewport and re-lays out the root.
    pub fn set_viewport(&mut self, viewport: Size) {
        if self.config.viewport == viewport {
            return;
        }
        self.config.viewport = viewport;
        if let Some(root) = self.root {
            self.invalidate(root, Stage::Measure);
            self.invalidate(root, Stage::Arrange);
        }
    }

    /// Handles to the built-in types and properties.
    #[must_use]
    pub fn properties(&self) -> &BuiltinProperties {
        &self.props
    }

    /// Handles to the built-in events.
    #[must_use]
    pub fn events(&self) -> &BuiltinEvents {
        &self.events
    }

    /// The property registry.
    #[must_use]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// Registers an element type; `None` derives it from `UIElement`.
    pub fn register_type(&mut self, name: &'static str, base: Option<TypeTag>) -> TypeTag {
        let base = base.unwrap_or(self.props.ui_element);
        self.registry.register_type(name, Some(base))
    }

    /// Registers a property on `owner`.
    ///
    /// # Panics
    ///
    /// Panics if `owner` already declares a property called `name`.
    pub fn register_property<T: PropertyValue>(
        &mut self,
        owner: TypeTag,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Property<T> {
        self.registry.register(owner, name, metadata)
    }

    /// Registered events and their class handlers.
    #[must_use]
    pub fn event_registry(&self) -> &EventRegistry<TypeTag> {
        &self.event_registry
    }

    /// Registered events and their class handlers, for registering more.
    pub fn event_registry_mut(&mut self) -> &mut EventRegistry<TypeTag> {
        &mut self.event_registry
    }

    // --- tree ---

    /// Creates a detached element of `type_tag`.
    pub fn create_element(
        &mut self,
        type_tag: TypeTag,
        behavior: impl ElementBehavior,
    ) -> ElementId {
        self.arena
            .insert(Element::new(type_tag, Box::new(behavior)))
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the host has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns `true` if `id` refers to a live element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.arena.contains(id)
    }

    pub(crate) fn element(&self, id: ElementId) -> Result<&Element, LayoutError> {
        self.arena.get(id).ok_or(LayoutError::StaleElement(id))
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, LayoutError> {
        self.arena.get_mut(id).ok_or(LayoutError::StaleElement(id))
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Makes `id` the root, detaching the previous root's tree.
    pub fn set_root(&mut self, id: ElementId) -> Result<(), LayoutError> {
        if self.element(id)?.parent.is_some() {
            return Err(LayoutError::AlreadyParented { element: id });
        }
        if self.root == Some(id) {
            return Ok(());
        }
        if let Some(old) = self.root.take() {
            self.detach_subtree(old);
        }
        tracing::debug!(?id, "root changed");
        self.root = Some(id);
        self.attach_subtree(id, 0);
        Ok(())
    }

    /// Appends `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), LayoutError> {
        let index = self.element(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` (clamped) among `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> Result<(), LayoutError> {
        self.element(parent)?;
        if self.element(child)?.parent.is_some() || self.root == Some(child) {
            return Err(LayoutError::AlreadyParented { element: child });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::WouldCreateCycle { parent, child });
        }
        let parent_element = self.element_mut(parent)?;
        let index = index.min(parent_element.children.len());
        parent_element.children.insert(index, child);
        let (attached, depth) = (parent_element.is_attached(), parent_element.depth + 1);
        self.element_mut(child)?.parent = Some(parent);
        if attached {
            self.attach_subtree(child, depth);
            self.invalidate(parent, Stage::Measure);
        }
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<bool, LayoutError> {
        let parent_element = self.element_mut(parent)?;
        let Some(index) = parent_element.children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        parent_element.children.remove(index);
        if let Some(element) = self.arena.get_mut(child) {
            element.parent = None;
        }
        self.detach_subtree(child);
        self.invalidate(parent, Stage::Measure);
        Ok(true)
    }

    /// Destroys `id` and its descendants, freeing their slots.
    ///
    /// Storyboards begun on them are stopped. Returns `false` for a stale id.
    pub fn destroy(&mut self, id: ElementId) -> bool {
        let Some(element) = self.arena.get(id) else {
            return false;
        };
        if let Some(parent) = element.parent {
            // Only fails if `id` is not a child, which the parent link rules out.
            let _ = self.remove_child(parent, id);
        } else if self.root == Some(id) {
            self.root = None;
            self.detach_subtree(id);
        }
        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);
        for &element in &doomed {
            self.stop_element_storyboards(element);
            self.unbind_from_clocks(element);
        }
        tracing::debug!(?id, count = doomed.len(), "destroying subtree");
        for element in doomed {
            self.arena.remove(element);
        }
        true
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.arena.get(id)?.parent
    }

    /// Children of `id` in order; empty for a stale id.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.arena.get(id).map_or(&[], |e| &e.children)
    }

    /// Returns `true` if `id` is the root or a descendant of it.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.arena.get(id).is_some_and(Element::is_attached)
    }

    /// Distance from the root, cached on attach.
    #[must_use]
    pub fn depth(&self, id: ElementId) -> Option<u32> {
        self.arena.get(id).map(|e| e.depth)
    }

    /// Element type of `id`.
    #[must_use]
    pub fn type_of(&self, id: ElementId) -> Option<TypeTag> {
        self.arena.get(id).map(|e| e.type_tag)
    }

    /// Element name of `id`.
    #[must_use]
    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.arena.get(id)?.name.as_deref()
    }

    /// Names `id`; names are matched by selectors.
    pub fn set_name(&mut self, id: ElementId, name: Option<&str>) -> Result<(), LayoutError> {
        let element = self.element_mut(id)?;
        if element.name.as_deref() == name {
            return Ok(());
        }
        element.name = name.map(Into::into);
        self.invalidate(id, Stage::Style);
        Ok(())
    }

    /// Adds a style class. Returns `false` if it was already present.
    pub fn add_class(&mut self, id: ElementId, class: ClassId) -> Result<bool, LayoutError> {
        let classes = &mut self.element_mut(id)?.classes;
        let Err(index) = classes.binary_search(&class) else {
            return Ok(false);
        };
        classes.insert(index, class);
        self.invalidate(id, Stage::Style);
        Ok(true)
    }

    /// Removes a style class. Returns `false` if it was not present.
    pub fn remove_class(&mut self, id: ElementId, class: ClassId) -> Result<bool, LayoutError> {
        let classes = &mut self.element_mut(id)?.classes;
        let Ok(index) = classes.binary_search(&class) else {
            return Ok(false);
        };
        classes.remove(index);
        self.invalidate(id, Stage::Style);
        Ok(true)
    }

    /// Returns `true` if `id` has `class`.
    #[must_use]
    pub fn has_class(&self, id: ElementId, class: ClassId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|e| e.classes.binary_search(&class).is_ok())
    }

    /// Returns `true` if `id` currently has `pseudo` (hover, focus).
    #[must_use]
    pub fn has_pseudo_class(&self, id: ElementId, pseudo: PseudoClassId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|e| e.pseudos.binary_search(&pseudo).is_ok())
    }

    pub(crate) fn set_pseudo_class(&mut self, id: ElementId, pseudo: PseudoClassId, on: bool) {
        let Some(element) = self.arena.get_mut(id) else {
            return;
        };
        let pseudos = &mut element.pseudos;
        match (pseudos.binary_search(&pseudo), on) {
            (Err(index), true) => pseudos.insert(index, pseudo),
            (Ok(index), false) => {
                pseudos.remove(index);
            }
            _ => return,
        }
        self.invalidate(id, Stage::Style);
    }

    /// Cached layout of `id`.
    #[must_use]
    pub fn layout(&self, id: ElementId) -> Option<&LayoutCache> {
        self.arena.get(id).map(|e| &e.layout)
    }

    /// Validity and attachment bits of `id`.
    #[must_use]
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.arena.get(id).map(|e| e.flags)
    }

    /// Returns `true` if `stage`'s cached output of `id` is current.
    #[must_use]
    pub fn is_valid(&self, id: ElementId, stage: Stage) -> bool {
        self.arena.get(id).is_some_and(|e| e.is_valid(stage))
    }

    /// Returns `true` if `id` waits in `stage`'s queue.
    #[must_use]
    pub fn is_queued(&self, id: ElementId, stage: Stage) -> bool {
        self.queues.contains(id, stage.channel())
    }

    /// Elements waiting in `stage`'s queue, in drain order.
    pub fn queued(&self, stage: Stage) -> impl Iterator<Item = ElementId> + '_ {
        self.queues.queue(stage.channel()).iter()
    }

    /// Returns `true` if no stage has pending work.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queues.is_idle()
    }

    /// The behavior of `id`, if it is a `B`.
    #[must_use]
    pub fn behavior<B: ElementBehavior>(&self, id: ElementId) -> Option<&B> {
        let behavior: &dyn core::any::Any = self.arena.get(id)?.behavior.as_deref()?;
        behavior.downcast_ref()
    }

    /// The behavior of `id`, mutably, if it is a `B`.
    ///
    /// Changes that affect layout must be followed by an explicit
    /// [`invalidate`](Self::invalidate).
    pub fn behavior_mut<B: ElementBehavior>(&mut self, id: ElementId) -> Option<&mut B> {
        let behavior: &mut dyn core::any::Any = self.arena.get_mut(id)?.behavior.as_deref_mut()?;
        behavior.downcast_mut()
    }

    /// Runs `f` with the behavior of `id` taken out of its element.
    ///
    /// `None` if `id` is stale or its behavior is already running.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut dyn ElementBehavior, &mut Self) -> R,
    ) -> Option<R> {
        let mut behavior = self.arena.get_mut(id)?.behavior.take()?;
        let out = f(behavior.as_mut(), self);
        if let Some(element) = self.arena.get_mut(id) {
            element.behavior = Some(behavior);
        }
        Some(out)
    }

    /// Runs `f` with a snapshot of `id`'s children.
    ///
    /// `f` may freely re-enter the host, including this method.
    pub fn with_children<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Self, &[ElementId]) -> R,
    ) -> R {
        let mut buffer = self.child_buffers.pop().unwrap_or_default();
        buffer.clear();
        if let Some(element) = self.arena.get(id) {
            buffer.extend_from_slice(&element.children);
        }
        let out = f(self, &buffer);
        self.child_buffers.push(buffer);
        out
    }

    /// Writes `id` and its descendants into `out` in document order.
    pub(crate) fn collect_subtree(&mut self, id: ElementId, out: &mut Vec<ElementId>) {
        out.clear();
        if !self.arena.contains(id) {
            return;
        }
        let arena = &self.arena;
        self.traversal.collect_preorder(
            id,
            |key, children| {
                if let Some(element) = arena.get(key) {
                    children.extend_from_slice(&element.children);
                }
            },
            out,
        );
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn attach_subtree(&mut self, id: ElementId, depth: u32) {
        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);
        for &element in &subtree {
            let depth = match self.parent(element) {
                Some(parent) if element != id => self.depth(parent).map_or(depth, |d| d + 1),
                _ => depth,
            };
            if let Some(e) = self.arena.get_mut(element) {
                e.depth = depth;
                e.flags = ElementFlags::ATTACHED;
            }
            self.queues.push(element, Stage::Style.channel());
        }
    }

    fn detach_subtree(&mut self, id: ElementId) {
        self.hover.forget(id);
        // Focus lives on the target alone; ancestors left on the path would
        // read as focused without holding it.
        if self.focus.contains(id) {
            self.focus.clear();
        }
        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);
        let (hovering, focused) = (self.props.is_hovering, self.props.is_focused);
        for element in subtree {
            self.queues.remove_key(element);
            let Some(e) = self.arena.get_mut(element) else {
                continue;
            };
            e.flags = ElementFlags::ALL_VALID;
            e.depth = 0;
            e.layout = LayoutCache::default();
            e.pseudos.retain(|p| *p != HOVER && *p != FOCUS);
            // Detached, so these writes invalidate nothing.
            let _ = e.properties.clear_local(hovering, &self.registry);
            let _ = e.properties.clear_local(focused, &self.registry);
        }
    }

    // --- properties ---

    /// The effective value of `property` on `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or `property` is not registered with type `T`.
    /// Use [`try_get`](Self::try_get) to handle those cases.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, id: ElementId, property: Property<T>) -> &T {
        match self.try_get(id, property) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// The effective value of `property` on `id`.
    pub fn try_get<T: PropertyValue>(
        &self,
        id: ElementId,
        property: Property<T>,
    ) -> Result<&T, LayoutError> {
        self.element(id)?
            .properties
            .try_effective(property, &self.registry)
            .map_err(|error| LayoutError::Property { element: id, error })
    }

    /// The effective value of the property called `name` on `id`'s type chain.
    pub fn get_by_name(&self, id: ElementId, name: &str) -> Result<&ErasedValue, LayoutError> {
        let property = self.resolve_name(id, name)?;
        let element = self.element(id)?;
        element
            .properties
            .effective_erased(property, &self.registry)
            .ok_or_else(|| LayoutError::UnknownProperty {
                element: id,
                name: name.into(),
            })
    }

    /// Looks `name` up on `id`'s type, most-derived type first.
    pub fn resolve_name(&self, id: ElementId, name: &str) -> Result<PropertyId, LayoutError> {
        let type_tag = self.element(id)?.type_tag;
        self.registry
            .find(type_tag, name)
            .ok_or_else(|| LayoutError::UnknownProperty {
                element: id,
                name: name.into(),
            })
    }

    /// Sets the local value. Returns `true` if the effective value changed.
    pub fn set_local<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<bool, LayoutError> {
        self.write(id, property, Layer::Local, Some(value))
    }

    /// Clears the local value. Returns `true` if the effective value changed.
    pub fn clear_local<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
    ) -> Result<bool, LayoutError> {
        self.write(id, property, Layer::Local, None)
    }

    /// Sets the animated value. Returns `true` if the effective value changed.
    pub fn set_animated<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<bool, LayoutError> {
        self.write(id, property, Layer::Animated, Some(value))
    }

    /// Clears the animated value. Returns `true` if the effective value changed.
    pub fn clear_animated<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
    ) -> Result<bool, LayoutError> {
        self.write(id, property, Layer::Animated, None)
    }

    /// Sets the local value of the property called `name`.
    pub fn set_local_by_name(
        &mut self,
        id: ElementId,
        name: &str,
        value: ErasedValue,
    ) -> Result<bool, LayoutError> {
        let property = self.resolve_name(id, name)?;
        self.write_erased(id, property, Layer::Local, value)
    }

    fn write<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        layer: Layer,
        value: Option<T>,
    ) -> Result<bool, LayoutError> {
        let element = self.arena.get_mut(id).ok_or(LayoutError::StaleElement(id))?;
        let result = match value {
            Some(value) => element.properties.set(property, layer, value, &self.registry),
            None => element.properties.clear(property, layer, &self.registry),
        };
        let change = result.map_err(|error| LayoutError::Property { element: id, error })?;
        Ok(self.notify(id, change))
    }

    pub(crate) fn write_erased(
        &mut self,
        id: ElementId,
        property: PropertyId,
        layer: Layer,
        value: ErasedValue,
    ) -> Result<bool, LayoutError> {
        let element = self.arena.get_mut(id).ok_or(LayoutError::StaleElement(id))?;
        let change = element
            .properties
            .set_erased(property, layer, value, &self.registry)
            .map_err(|error| LayoutError::Property { element: id, error })?;
        Ok(self.notify(id, change))
    }

    pub(crate) fn clear_erased(
        &mut self,
        id: ElementId,
        property: PropertyId,
        layer: Layer,
    ) -> Result<bool, LayoutError> {
        let element = self.arena.get_mut(id).ok_or(LayoutError::StaleElement(id))?;
        let change = element
            .properties
            .clear_erased(property, layer, &self.registry)
            .map_err(|error| LayoutError::Property { element: id, error })?;
        Ok(self.notify(id, change))
    }

    /// Clears `layer` of every property on `id`, and on its descendants if
    /// `recursive`.
    pub(crate) fn clear_layer(
        &mut self,
        id: ElementId,
        layer: Layer,
        recursive: bool,
    ) -> Result<(), LayoutError> {
        let mut targets = Vec::new();
        if recursive {
            self.collect_subtree(id, &mut targets);
        } else {
            self.element(id)?;
            targets.push(id);
        }
        let mut changes = SmallVec::<[_; 8]>::new();
        for target in targets {
            let Some(element) = self.arena.get_mut(target) else {
                continue;
            };
            changes.clear();
            element
                .properties
                .clear_layer_all(layer, &self.registry, |change| changes.push(change))
                .map_err(|error| LayoutError::Property {
                    element: target,
                    error,
                })?;
            for change in changes.drain(..) {
                self.notify(target, Some(change));
            }
        }
        Ok(())
    }

    /// Clears every local value on `id` (and its descendants if `recursive`).
    pub fn clear_local_values(&mut self, id: ElementId, recursive: bool) -> Result<(), LayoutError> {
        self.clear_layer(id, Layer::Local, recursive)
    }

    /// Clears every styled value on `id` (and its descendants if `recursive`).
    ///
    /// The next style pass re-applies whatever the style provider says.
    pub fn clear_styled_values(
        &mut self,
        id: ElementId,
        recursive: bool,
    ) -> Result<(), LayoutError> {
        self.clear_layer(id, Layer::Styled, recursive)
    }

    // --- events ---

    /// Adds an instance handler for `event` on `id`.
    pub fn add_handler<A: 'static>(
        &mut self,
        id: ElementId,
        event: RoutedEvent<A>,
        handled_too: bool,
        handler: impl Fn(&mut Self, &mut RouteState<ElementId>, &mut A) + 'static,
    ) -> Result<HandlerId, LayoutError> {
        Ok(self.element_mut(id)?.handlers.add(event, handled_too, handler))
    }

    /// Removes an instance handler. Returns `false` if it was not present.
    pub fn remove_handler(&mut self, id: ElementId, handler: HandlerId) -> bool {
        self.arena
            .get_mut(id)
            .is_some_and(|e| e.handlers.remove(handler))
    }

    /// Routes `event` from `origin`. Returns whether a handler marked it handled.
    pub fn raise<A: 'static>(
        &mut self,
        origin: ElementId,
        event: RoutedEvent<A>,
        args: &mut A,
    ) -> bool {
        if !self.arena.contains(origin) {
            return false;
        }
        dispatcher::raise(self, origin, event, args)
    }
}

impl RouteHost<ElementId, TypeTag> for UiHost {
    fn parent(&self, node: ElementId) -> Option<ElementId> {
        Self::parent(self, node)
    }

    fn class_of(&self, node: ElementId) -> Option<TypeTag> {
        self.type_of(node)
    }

    fn class_chain(&self, class: TypeTag, out: &mut Vec<TypeTag>) {
        out.extend(self.registry.types().ancestors(class));
    }

    fn instance_handlers(&self, node: ElementId) -> Option<&HandlerList> {
        self.arena.get(node).map(|e| &e.handlers)
    }

    fn event_registry(&self) -> &EventRegistry<TypeTag> {
        &self.event_registry
    }
}
