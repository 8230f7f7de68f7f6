// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object layered property storage.
//!
//! Each property with at least one set layer owns a slot holding up to three
//! values. The effective value is the highest set layer, falling back to the
//! registered default:
//!
//! ```text
//! animated > local > styled > default
//! ```
//!
//! Slots live in a sorted `SmallVec` and are found by binary search, the
//! `WinUI` `vector_map` layout. Objects rarely set more than a handful of
//! properties, so the first few slots are stored inline.

use smallvec::SmallVec;
use trellis_dirty::ChannelSet;

use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::registry::PropertyRegistry;
use crate::value::{ErasedValue, PropertyValue};

const INLINE_CAPACITY: usize = 4;

/// A value layer. Later variants take precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Written by style application.
    Styled,
    /// Written by user code.
    Local,
    /// Written by running animation clocks.
    Animated,
}

/// Reported by a write that changed a property's effective value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyChange {
    /// The property whose effective value changed.
    pub property: PropertyId,
    /// Channels its metadata declares as affected.
    pub channels: ChannelSet,
}

#[derive(Clone, Debug)]
struct PropertySlot {
    id: PropertyId,
    styled: Option<ErasedValue>,
    local: Option<ErasedValue>,
    animated: Option<ErasedValue>,
}

impl PropertySlot {
    fn new(id: PropertyId) -> Self {
        Self {
            id,
            styled: None,
            local: None,
            animated: None,
        }
    }

    fn layer(&self, layer: Layer) -> Option<&ErasedValue> {
        match layer {
            Layer::Styled => self.styled.as_ref(),
            Layer::Local => self.local.as_ref(),
            Layer::Animated => self.animated.as_ref(),
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Option<ErasedValue> {
        match layer {
            Layer::Styled => &mut self.styled,
            Layer::Local => &mut self.local,
            Layer::Animated => &mut self.animated,
        }
    }

    fn top_layer(&self) -> Option<Layer> {
        if self.animated.is_some() {
            Some(Layer::Animated)
        } else if self.local.is_some() {
            Some(Layer::Local)
        } else if self.styled.is_some() {
            Some(Layer::Styled)
        } else {
            None
        }
    }

    fn effective(&self) -> Option<&ErasedValue> {
        self.top_layer().and_then(|l| self.layer(l))
    }

    fn is_empty(&self) -> bool {
        self.top_layer().is_none()
    }
}

/// Layered property values for one object.
///
/// Writes go through [`set`](Self::set) and [`clear`](Self::clear) (or their
/// per-layer shorthands). Each returns `Some(PropertyChange)` only when the
/// effective value actually changed, so writing the current value again costs
/// nothing downstream.
///
/// ```rust
/// use trellis_property::{Layer, PropertyMetadata, PropertyRegistry, PropertyStore};
///
/// let mut registry = PropertyRegistry::new();
/// let root = registry.register_type("Root", None);
/// let size = registry.register(root, "Size", PropertyMetadata::new(10_i32));
///
/// let mut store = PropertyStore::new();
/// assert_eq!(store.set_local(size, 10, &registry), Ok(None));
/// assert!(store.set_local(size, 20, &registry).unwrap().is_some());
///
/// store.set_animated(size, 30, &registry).unwrap();
/// assert_eq!(*store.effective(size, &registry), 30);
/// store.clear_animated(size, &registry).unwrap();
/// assert_eq!(*store.effective(size, &registry), 20);
/// assert_eq!(store.get_layer(size, Layer::Local), Some(&20));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    slots: SmallVec<[PropertySlot; INLINE_CAPACITY]>,
}

impl PropertyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no layer of any property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of properties with at least one set layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Ids of properties with at least one set layer, ascending.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    /// Ids of properties whose `layer` is set, ascending.
    pub fn ids_in_layer(&self, layer: Layer) -> impl Iterator<Item = PropertyId> + '_ {
        self.slots
            .iter()
            .filter(move |s| s.layer(layer).is_some())
            .map(|s| s.id)
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.slots.binary_search_by_key(&id, |s| s.id)
    }

    #[inline]
    fn slot(&self, id: PropertyId) -> Option<&PropertySlot> {
        self.find(id).ok().map(|i| &self.slots[i])
    }

    /// Returns `true` if `layer` of `id` is set.
    #[must_use]
    pub fn has_layer(&self, id: PropertyId, layer: Layer) -> bool {
        self.layer_erased(id, layer).is_some()
    }

    /// Highest set layer of `id`, if any.
    #[must_use]
    pub fn top_layer(&self, id: PropertyId) -> Option<Layer> {
        self.slot(id).and_then(PropertySlot::top_layer)
    }

    /// The boxed value stored in one layer.
    #[must_use]
    pub fn layer_erased(&self, id: PropertyId, layer: Layer) -> Option<&ErasedValue> {
        self.slot(id).and_then(|s| s.layer(layer))
    }

    /// The value stored in one layer.
    #[must_use]
    pub fn get_layer<T: PropertyValue>(&self, property: Property<T>, layer: Layer) -> Option<&T> {
        self.layer_erased(property.id(), layer)
            .and_then(ErasedValue::downcast_ref)
    }

    /// The local value, if set.
    #[must_use]
    pub fn get_local<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.get_layer(property, Layer::Local)
    }

    /// The effective value.
    pub fn try_effective<'a, T: PropertyValue>(
        &'a self,
        property: Property<T>,
        registry: &'a PropertyRegistry,
    ) -> Result<&'a T, PropertyError> {
        let metadata = registry.try_metadata(property)?;
        Ok(self
            .slot(property.id())
            .and_then(PropertySlot::effective)
            .and_then(ErasedValue::downcast_ref)
            .unwrap_or(metadata.default_value()))
    }

    /// The effective value.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not registered in `registry` with type `T`.
    /// Use [`try_effective`](Self::try_effective) to handle that case.
    #[must_use]
    pub fn effective<'a, T: PropertyValue>(
        &'a self,
        property: Property<T>,
        registry: &'a PropertyRegistry,
    ) -> &'a T {
        match self.try_effective(property, registry) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// The effective value, boxed; `None` if `id` is not registered.
    #[must_use]
    pub fn effective_erased<'a>(
        &'a self,
        id: PropertyId,
        registry: &'a PropertyRegistry,
    ) -> Option<&'a ErasedValue> {
        self.slot(id)
            .and_then(PropertySlot::effective)
            .or_else(|| registry.get(id).map(|r| r.default_erased()))
    }

    /// Writes `value` into `layer`.
    ///
    /// The value is coerced first. When the effective value changes the
    /// changed callback runs and the change is returned. Writing a lower layer
    /// underneath a set higher one stores the value without a change.
    pub fn set<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        layer: Layer,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let id = property.id();
        let metadata = registry.try_metadata(property)?;
        let value = metadata.coerce(value, &CoerceCx::new(self, registry));

        let index = self.find(id);
        let slot = index.ok().map(|i| &self.slots[i]);
        if slot
            .and_then(|s| s.layer(layer))
            .and_then(ErasedValue::downcast_ref::<T>)
            == Some(&value)
        {
            return Ok(None);
        }
        let masked = slot
            .and_then(PropertySlot::top_layer)
            .is_some_and(|top| top > layer);
        let old = slot
            .and_then(PropertySlot::effective)
            .and_then(ErasedValue::downcast_ref::<T>)
            .unwrap_or(metadata.default_value());
        let changed = !masked && *old != value;
        let previous = (changed && metadata.has_changed_callback()).then(|| old.clone());

        let index = match index {
            Ok(i) => i,
            Err(i) => {
                self.slots.insert(i, PropertySlot::new(id));
                i
            }
        };
        *self.slots[index].layer_mut(layer) = Some(ErasedValue::new(value));
        if !changed {
            return Ok(None);
        }
        if let Some(previous) = previous
            && let Some(new) = self.slots[index]
                .layer(layer)
                .and_then(ErasedValue::downcast_ref::<T>)
        {
            metadata.on_changed(&previous, new);
        }
        Ok(Some(PropertyChange {
            property: id,
            channels: metadata.affects_channels(),
        }))
    }

    /// Clears `layer`; a layer that was never set is a no-op.
    ///
    /// When the cleared layer was the effective one the value re-resolves to
    /// the next layer down, and a change is reported if it differs.
    pub fn clear<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        layer: Layer,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let id = property.id();
        let metadata = registry.try_metadata(property)?;
        let Ok(index) = self.find(id) else {
            return Ok(None);
        };
        let slot = &mut self.slots[index];
        let was_top = slot.top_layer() == Some(layer);
        let Some(removed) = slot.layer_mut(layer).take() else {
            return Ok(None);
        };
        if slot.is_empty() {
            self.slots.remove(index);
        }
        if !was_top {
            return Ok(None);
        }

        let new = self
            .slot(id)
            .and_then(PropertySlot::effective)
            .and_then(ErasedValue::downcast_ref::<T>)
            .unwrap_or(metadata.default_value());
        match removed.downcast_ref::<T>() {
            Some(old) if old == new => Ok(None),
            Some(old) => {
                metadata.on_changed(old, new);
                Ok(Some(PropertyChange {
                    property: id,
                    channels: metadata.affects_channels(),
                }))
            }
            None => Ok(None),
        }
    }

    /// [`set`](Self::set) with a boxed value, checked against the registered type.
    pub fn set_erased(
        &mut self,
        id: PropertyId,
        layer: Layer,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        registry
            .try_get(id)?
            .metadata()
            .write(id, self, layer, value, registry)
    }

    /// [`clear`](Self::clear) by untyped id.
    pub fn clear_erased(
        &mut self,
        id: PropertyId,
        layer: Layer,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        registry.try_get(id)?.metadata().clear(id, self, layer, registry)
    }

    /// Clears `layer` of every property, reporting each effective change.
    pub fn clear_layer_all(
        &mut self,
        layer: Layer,
        registry: &PropertyRegistry,
        mut on_change: impl FnMut(PropertyChange),
    ) -> Result<(), PropertyError> {
        let ids: SmallVec<[PropertyId; INLINE_CAPACITY]> = self.ids_in_layer(layer).collect();
        for id in ids {
            if let Some(change) = self.clear_erased(id, layer, registry)? {
                on_change(change);
            }
        }
        Ok(())
    }

    /// Sets the local value.
    pub fn set_local<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.set(property, Layer::Local, value, registry)
    }

    /// Clears the local value.
    pub fn clear_local<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.clear(property, Layer::Local, registry)
    }

    /// Sets the styled value.
    pub fn set_styled<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.set(property, Layer::Styled, value, registry)
    }

    /// Clears the styled value.
    pub fn clear_styled<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.clear(property, Layer::Styled, registry)
    }

    /// Sets the animated value.
    pub fn set_animated<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.set(property, Layer::Animated, value, registry)
    }

    /// Clears the animated value.
    pub fn clear_animated<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.clear(property, Layer::Animated, registry)
    }
}

/// Read access to an object's other properties during coercion.
#[derive(Copy, Clone, Debug)]
pub struct CoerceCx<'a> {
    store: &'a PropertyStore,
    registry: &'a PropertyRegistry,
}

impl<'a> CoerceCx<'a> {
    /// Wraps a store and the registry it is resolved against.
    #[must_use]
    pub fn new(store: &'a PropertyStore, registry: &'a PropertyRegistry) -> Self {
        Self { store, registry }
    }

    /// Current effective value of another property.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not registered with type `T`.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> &'a T {
        self.store.effective(property, self.registry)
    }

    /// The registry in use.
    #[must_use]
    pub fn registry(&self) -> &'a PropertyRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{PropertyMetadata, PropertyMetadataBuilder};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicU32, Ordering};
    use trellis_dirty::Channel;

    const MEASURE: Channel = Channel::new(1);

    fn registry_with(
        meta: PropertyMetadata<i32>,
    ) -> (PropertyRegistry, Property<i32>) {
        let mut registry = PropertyRegistry::new();
        let root = registry.register_type("Root", None);
        let p = registry.register(root, "P", meta);
        (registry, p)
    }

    #[test]
    fn precedence_animated_local_styled_default() {
        let (registry, p) = registry_with(PropertyMetadata::new(0));
        let mut store = PropertyStore::new();
        store.set_styled(p, 1, &registry).unwrap();
        store.set_local(p, 2, &registry).unwrap();
        store.set_animated(p, 3, &registry).unwrap();
        assert_eq!(*store.effective(p, &registry), 3);

        assert!(store.clear_animated(p, &registry).unwrap().is_some());
        assert_eq!(*store.effective(p, &registry), 2);
        assert!(store.clear_local(p, &registry).unwrap().is_some());
        assert_eq!(*store.effective(p, &registry), 1);
        assert!(store.clear_styled(p, &registry).unwrap().is_some());
        assert_eq!(*store.effective(p, &registry), 0);
        assert!(store.is_empty(), "slot is dropped with its last layer");
    }

    #[test]
    fn idempotent_write_reports_nothing() {
        let (registry, p) = registry_with(
            PropertyMetadataBuilder::new(10)
                .affects_channels(MEASURE.into_set())
                .build(),
        );
        let mut store = PropertyStore::new();
        assert_eq!(store.set_local(p, 10, &registry), Ok(None));
        let change = store.set_local(p, 20, &registry).unwrap().unwrap();
        assert_eq!(change.property, p.id());
        assert!(change.channels.contains(MEASURE));
        assert_eq!(store.set_local(p, 20, &registry), Ok(None));
    }

    #[test]
    fn masked_write_is_stored_but_silent() {
        let (registry, p) = registry_with(PropertyMetadata::new(0));
        let mut store = PropertyStore::new();
        store.set_local(p, 5, &registry).unwrap();
        assert_eq!(store.set_styled(p, 7, &registry), Ok(None));
        assert_eq!(store.get_layer(p, Layer::Styled), Some(&7));
        assert_eq!(store.clear_styled(p, &registry), Ok(None));
        assert_eq!(*store.effective(p, &registry), 5);
    }

    #[test]
    fn clearing_to_equal_value_is_silent() {
        let (registry, p) = registry_with(PropertyMetadata::new(4));
        let mut store = PropertyStore::new();
        store.set_styled(p, 9, &registry).unwrap();
        store.set_local(p, 9, &registry).unwrap();
        assert_eq!(store.clear_local(p, &registry), Ok(None));
    }

    #[test]
    fn clearing_unset_layer_is_a_noop() {
        let (registry, p) = registry_with(PropertyMetadata::new(0));
        let mut store = PropertyStore::new();
        assert_eq!(store.clear_animated(p, &registry), Ok(None));
        store.set_local(p, 1, &registry).unwrap();
        assert_eq!(store.clear_animated(p, &registry), Ok(None));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn changed_callback_sees_old_and_new() {
        let last = Arc::new(AtomicU32::new(0));
        let sink = last.clone();
        let (registry, p) = registry_with(
            PropertyMetadataBuilder::new(1)
                .on_changed(move |old, new| {
                    sink.store((old * 100 + new) as u32, Ordering::Relaxed);
                })
                .build(),
        );
        let mut store = PropertyStore::new();
        store.set_local(p, 7, &registry).unwrap();
        assert_eq!(last.load(Ordering::Relaxed), 107);
        store.set_animated(p, 3, &registry).unwrap();
        assert_eq!(last.load(Ordering::Relaxed), 703);
        store.clear_animated(p, &registry).unwrap();
        assert_eq!(last.load(Ordering::Relaxed), 307);
    }

    #[test]
    fn coercion_reads_sibling_values() {
        let mut registry = PropertyRegistry::new();
        let root = registry.register_type("Root", None);
        let max = registry.register(root, "Max", PropertyMetadata::new(10_i32));
        let value = registry.register(
            root,
            "Value",
            PropertyMetadataBuilder::new(0_i32)
                .coerce(move |v, cx| v.min(*cx.get(max)))
                .build(),
        );
        let mut store = PropertyStore::new();
        store.set_local(value, 50, &registry).unwrap();
        assert_eq!(*store.effective(value, &registry), 10);
        store.set_local(max, 3, &registry).unwrap();
        store.set_local(value, 50, &registry).unwrap();
        assert_eq!(*store.effective(value, &registry), 3);
    }

    #[test]
    fn erased_write_checks_type() {
        let (registry, p) = registry_with(PropertyMetadata::new(0));
        let mut store = PropertyStore::new();
        let err = store
            .set_erased(p.id(), Layer::Styled, ErasedValue::new(1.5_f32), &registry)
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { found: "f32", .. }));
        let change = store
            .set_erased(p.id(), Layer::Styled, ErasedValue::new(6_i32), &registry)
            .unwrap();
        assert!(change.is_some());
        assert_eq!(
            store.effective_erased(p.id(), &registry).and_then(|v| v.downcast_ref::<i32>()),
            Some(&6)
        );
    }

    #[test]
    fn unregistered_property_is_an_error() {
        let (registry, _) = registry_with(PropertyMetadata::new(0));
        let ghost: Property<i32> = Property::from_id(PropertyId::new(40));
        let mut store = PropertyStore::new();
        assert_eq!(
            store.set_local(ghost, 1, &registry),
            Err(PropertyError::Unregistered(ghost.id()))
        );
        assert!(store.try_effective(ghost, &registry).is_err());
        assert!(store.effective_erased(ghost.id(), &registry).is_none());
    }

    #[test]
    fn clear_layer_all_reports_each_change() {
        let mut registry = PropertyRegistry::new();
        let root = registry.register_type("Root", None);
        let a = registry.register(root, "A", PropertyMetadata::new(0_i32));
        let b = registry.register(root, "B", PropertyMetadata::new(0_i32));
        let c = registry.register(root, "C", PropertyMetadata::new(0_i32));
        let mut store = PropertyStore::new();
        store.set_animated(a, 1, &registry).unwrap();
        store.set_animated(b, 0, &registry).unwrap();
        store.set_local(c, 2, &registry).unwrap();

        let mut changes = Vec::new();
        store
            .clear_layer_all(Layer::Animated, &registry, |c| changes.push(c.property))
            .unwrap();
        assert_eq!(changes, [a.id()], "b was already at its default");
        assert_eq!(store.ids_in_layer(Layer::Animated).count(), 0);
        assert_eq!(store.property_ids().collect::<Vec<_>>(), [c.id()]);
    }
}
