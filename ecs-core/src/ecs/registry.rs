// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Name-keyed, type-erased component access
//!
//! Tooling such as inspectors and scene loaders only knows components by
//! name. [`ComponentRegistry`] keeps one table of monomorphized function
//! pointers per registered component and converts values to and from
//! [`serde_json::Value`].

use crate::ecs::component::{Component, ComponentTag};
use crate::ecs::{Entity, World};
use crate::error::{EcsError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

type EnsurePoolFn = fn(&mut World);
type HasFn = fn(&mut World, Entity) -> bool;
type RemoveFn = fn(&mut World, Entity) -> bool;
type GetValueFn = fn(&mut World, Entity) -> std::result::Result<Value, String>;
type SetValueFn = fn(&mut World, Entity, Value) -> std::result::Result<(), String>;
type DefaultValueFn = fn() -> std::result::Result<Value, String>;

/// Operations available on one registered component type
#[derive(Clone, Copy)]
struct ComponentVTable {
    tag: ComponentTag,
    ensure_pool: EnsurePoolFn,
    has: HasFn,
    remove: RemoveFn,
    get_value: GetValueFn,
    set_value: SetValueFn,
    default_value: DefaultValueFn,
}

impl ComponentVTable {
    fn of<T>() -> Self
    where
        T: Component + Serialize + DeserializeOwned + Default,
    {
        ComponentVTable {
            tag: ComponentTag::of::<T>(),
            ensure_pool: |world| {
                world.get_pool::<T>();
            },
            has: |world, entity| world.has::<T>(entity),
            remove: |world, entity| world.remove::<T>(entity),
            get_value: |world, entity| {
                let value = world.get::<T>(entity).map_err(|e| e.to_string())?;
                serde_json::to_value(value).map_err(|e| e.to_string())
            },
            set_value: |world, entity, value| {
                let defaults = serde_json::to_value(T::default()).map_err(|e| e.to_string())?;
                let value: T = serde_json::from_value(overlay(defaults, value))
                    .map_err(|e| e.to_string())?;
                world.set(entity, value);
                Ok(())
            },
            default_value: || serde_json::to_value(T::default()).map_err(|e| e.to_string()),
        }
    }
}

/// Apply the fields present in `patch` on top of `base`
///
/// Non-object patches replace the base entirely.
fn overlay(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                let merged = match base.remove(&key) {
                    Some(existing) => overlay(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

/// Shape of a serialized field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `true` / `false`
    Bool,
    /// Integral number
    Integer,
    /// Floating point number
    Float,
    /// Text
    String,
    /// Sequence
    Array,
    /// Nested record
    Object,
    /// Absent optional value
    Null,
}

impl FieldKind {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => FieldKind::Null,
            Value::Bool(_) => FieldKind::Bool,
            Value::Number(n) if n.is_f64() => FieldKind::Float,
            Value::Number(_) => FieldKind::Integer,
            Value::String(_) => FieldKind::String,
            Value::Array(_) => FieldKind::Array,
            Value::Object(_) => FieldKind::Object,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named field of a registered component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Field shape, derived from the default value
    pub kind: FieldKind,
}

/// Registry of components addressable by name
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{Component, ComponentRegistry, World};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// struct Health {
///     current: u32,
///     max: u32,
/// }
/// impl Component for Health {}
///
/// let mut registry = ComponentRegistry::new();
/// registry.register::<Health>("Health").unwrap();
///
/// let mut world = World::new();
/// let entity = world.create_entity();
/// registry.set_value(&mut world, "Health", entity, json!({ "max": 10 })).unwrap();
///
/// assert_eq!(world.get::<Health>(entity).unwrap(), &Health { current: 0, max: 10 });
/// assert_eq!(registry.components_of(&mut world, entity), vec!["Health"]);
/// ```
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentVTable>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentAlreadyRegistered`] if the name is taken.
    pub fn register<T>(&mut self, name: impl Into<String>) -> Result<()>
    where
        T: Component + Serialize + DeserializeOwned + Default,
    {
        let name = name.into();
        if self.components.contains_key(&name) {
            return Err(EcsError::ComponentAlreadyRegistered(name));
        }
        log::debug!("registered component {name} ({})", ComponentTag::of::<T>().name());
        self.components.insert(name, ComponentVTable::of::<T>());
        Ok(())
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.keys().map(String::as_str)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Type tag of a registered component
    pub fn tag(&self, name: &str) -> Result<ComponentTag> {
        Ok(self.vtable(name)?.tag)
    }

    /// Create the pool of a registered component
    pub fn ensure_pool(&self, world: &mut World, name: &str) -> Result<()> {
        (self.vtable(name)?.ensure_pool)(world);
        Ok(())
    }

    /// Check whether `entity` has the named component
    pub fn has(&self, world: &mut World, name: &str, entity: Entity) -> Result<bool> {
        Ok((self.vtable(name)?.has)(world, entity))
    }

    /// Remove the named component from `entity`
    pub fn remove(&self, world: &mut World, name: &str, entity: Entity) -> Result<bool> {
        Ok((self.vtable(name)?.remove)(world, entity))
    }

    /// Read the named component of `entity` as JSON
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`] if the entity lacks the component.
    pub fn get_value(&self, world: &mut World, name: &str, entity: Entity) -> Result<Value> {
        let vtable = self.vtable(name)?;
        if !(vtable.has)(world, entity) {
            return Err(EcsError::NotFound {
                component: vtable.tag.name(),
                entity,
            });
        }
        (vtable.get_value)(world, entity).map_err(|message| codec(name, message))
    }

    /// Write the named component of `entity` from JSON
    ///
    /// Fields missing from `value` take their `Default` value.
    pub fn set_value(&self, world: &mut World, name: &str, entity: Entity, value: Value) -> Result<()> {
        (self.vtable(name)?.set_value)(world, entity, value).map_err(|message| codec(name, message))
    }

    /// JSON form of the component's `Default` value
    pub fn default_value(&self, name: &str) -> Result<Value> {
        (self.vtable(name)?.default_value)().map_err(|message| codec(name, message))
    }

    /// Top-level fields of the named component, sorted by name
    ///
    /// Components that do not serialize to a JSON object have no fields.
    pub fn fields(&self, name: &str) -> Result<Vec<FieldInfo>> {
        let fields = match self.default_value(name)? {
            Value::Object(map) => map
                .iter()
                .map(|(name, value)| FieldInfo {
                    name: name.clone(),
                    kind: FieldKind::of(value),
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(fields)
    }

    /// Registered components present on `entity`, sorted by name
    pub fn components_of(&self, world: &mut World, entity: Entity) -> Vec<&str> {
        self.components
            .iter()
            .filter(|(_, vtable)| (vtable.has)(world, entity))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Merge the registrations of `other` into this registry
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentAlreadyRegistered`] on the first name collision;
    /// nothing is merged in that case.
    pub fn merge(&mut self, other: ComponentRegistry) -> Result<()> {
        if let Some(name) = other.components.keys().find(|name| self.contains(name)) {
            return Err(EcsError::ComponentAlreadyRegistered(name.clone()));
        }
        self.components.extend(other.components);
        Ok(())
    }

    fn vtable(&self, name: &str) -> Result<&ComponentVTable> {
        self.components
            .get(name)
            .ok_or_else(|| EcsError::UnknownComponent(name.to_string()))
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.keys()).finish()
    }
}

fn codec(name: &str, message: String) -> EcsError {
    EcsError::Codec {
        component: name.to_string(),
        message,
    }
}
