// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use hashbrown::HashMap;
use trellis_dirty::ChannelSet;

use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::metadata::PropertyMetadata;
use crate::store::{Layer, PropertyChange, PropertyStore};
use crate::types::{TypeHierarchy, TypeTag};
use crate::value::{ErasedValue, PropertyValue};

/// Everything the registry knows about one property.
pub struct PropertyRegistration {
    owner: TypeTag,
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    default: ErasedValue,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Type that declared the property.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> TypeTag {
        self.owner
    }

    /// Property name, unique per owner type.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// [`TypeId`] of the value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust name of the value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Default value, boxed.
    #[must_use]
    #[inline]
    pub fn default_erased(&self) -> &ErasedValue {
        &self.default
    }

    /// Channels invalidated when the effective value changes.
    #[must_use]
    #[inline]
    pub fn affects_channels(&self) -> ChannelSet {
        self.metadata.affects_channels()
    }

    pub(crate) fn metadata(&self) -> &dyn ErasedMetadata {
        &*self.metadata
    }
}

impl fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("default", &self.default)
            .field("affects_channels", &self.affects_channels())
            .finish_non_exhaustive()
    }
}

/// Table of element types and the properties they declare.
///
/// Properties are keyed by `(owner type, name)`. Lookup by name from an
/// element's type walks that type's ancestors, so a property declared on a
/// base type is visible from every derived type.
///
/// ```rust
/// use trellis_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let element = registry.register_type("UIElement", None);
/// let label = registry.register_type("Label", Some(element));
///
/// let opacity = registry.register(element, "Opacity", PropertyMetadataBuilder::new(1.0_f32).build());
/// let text = registry.register(label, "Text", PropertyMetadataBuilder::new(String::new()).build());
///
/// assert_eq!(registry.find(label, "Opacity"), Some(opacity.id()));
/// assert_eq!(registry.find(label, "Text"), Some(text.id()));
/// assert_eq!(registry.find(element, "Text"), None);
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    types: TypeHierarchy,
    properties: Vec<PropertyRegistration>,
    by_owner: HashMap<TypeTag, HashMap<&'static str, PropertyId>>,
}

impl PropertyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The element type table.
    #[must_use]
    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    /// Registers an element type; see [`TypeHierarchy::register`].
    pub fn register_type(&mut self, name: &'static str, base: Option<TypeTag>) -> TypeTag {
        self.types.register(name, base)
    }

    /// Registers a property on `owner`.
    ///
    /// # Panics
    ///
    /// Panics if `owner` already declares a property called `name`, if
    /// `owner` is not a registered type, or if the `u16` id space is full.
    pub fn register<T: PropertyValue>(
        &mut self,
        owner: TypeTag,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Property<T> {
        assert!(
            self.types.name(owner).is_some(),
            "Owner type {owner:?} is not registered"
        );
        assert!(
            self.lookup(owner, name).is_none(),
            "Property '{name}' is already registered on {owner:?}"
        );
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            owner,
            name,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            default: ErasedValue::new(metadata.default_value().clone()),
            metadata: Box::new(metadata),
        });
        self.by_owner.entry(owner).or_default().insert(name, id);
        Property::from_id(id)
    }

    /// Number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no property is registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Exact lookup of a property declared by `owner`.
    #[must_use]
    pub fn lookup(&self, owner: TypeTag, name: &str) -> Option<PropertyId> {
        self.by_owner.get(&owner)?.get(name).copied()
    }

    /// Finds `name` on `tag` or the nearest ancestor declaring it.
    #[must_use]
    pub fn find(&self, tag: TypeTag, name: &str) -> Option<PropertyId> {
        self.types
            .ancestors(tag)
            .find_map(|owner| self.lookup(owner, name))
    }

    /// Name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::name)
    }

    /// Registration of a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(id.index() as usize)
    }

    /// Registration of a property, as a `Result`.
    pub fn try_get(&self, id: PropertyId) -> Result<&PropertyRegistration, PropertyError> {
        self.get(id).ok_or(PropertyError::Unregistered(id))
    }

    /// Channels a property invalidates; empty for unknown ids.
    #[must_use]
    pub fn affects_channels(&self, id: PropertyId) -> ChannelSet {
        self.get(id)
            .map(PropertyRegistration::affects_channels)
            .unwrap_or_default()
    }

    /// Typed metadata of a property.
    ///
    /// Returns `None` if the property is unknown or `T` is not its type.
    #[must_use]
    pub fn metadata<T: PropertyValue>(&self, property: Property<T>) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Typed metadata, distinguishing unknown ids from wrong types.
    pub fn try_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Result<&PropertyMetadata<T>, PropertyError> {
        let registration = self.try_get(property.id())?;
        registration
            .metadata
            .as_any()
            .downcast_ref()
            .ok_or(PropertyError::TypeMismatch {
                property: property.id(),
                expected: registration.type_name,
                found: core::any::type_name::<T>(),
            })
    }

    /// All registrations with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("types", &self.types.len())
            .field(
                "properties",
                &self.properties.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Lets erased callers reach the typed store algorithm of a property.
pub(crate) trait ErasedMetadata: Any {
    fn as_any(&self) -> &dyn Any;
    fn affects_channels(&self) -> ChannelSet;
    fn write(
        &self,
        id: PropertyId,
        store: &mut PropertyStore,
        layer: Layer,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError>;
    fn clear(
        &self,
        id: PropertyId,
        store: &mut PropertyStore,
        layer: Layer,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError>;
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn affects_channels(&self) -> ChannelSet {
        Self::affects_channels(self)
    }

    fn write(
        &self,
        id: PropertyId,
        store: &mut PropertyStore,
        layer: Layer,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let value = value
            .into_inner::<T>()
            .map_err(|v| PropertyError::TypeMismatch {
                property: id,
                expected: core::any::type_name::<T>(),
                found: v.type_name(),
            })?;
        store.set(Property::<T>::from_id(id), layer, value, registry)
    }

    fn clear(
        &self,
        id: PropertyId,
        store: &mut PropertyStore,
        layer: Layer,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        store.clear(Property::<T>::from_id(id), layer, registry)
    }
}
