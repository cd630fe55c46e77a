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
//! Sparse-set component pools
//!
//! A [`Pool<T>`] stores every value of one component type in a dense,
//! gap-free array and keeps a sparse map from entity to dense slot:
//!
//! ```text
//! entity_to_index: {E1: 1, E3: 0, E4: 2}   entity -> dense slot
//! entities:        [E3, E1, E4]            dense slot -> owning entity
//! values:          [v3, v1, v4]            dense slot -> component value
//! ```
//!
//! Membership, lookup, insertion and removal are all O(1). Removal moves the
//! last dense entry into the vacated slot, so dense order is not stable
//! across removals. The sparse side is keyed by live entities only, so its
//! size follows the number of components held, not the largest entity id
//! ever seen.
//!
//! Pools expose three notification channels (Added, Changed, Removed).
//! Listeners run synchronously after the mutation has been applied. They
//! receive the entity and a shared reference to the value only, so they
//! cannot re-enter the pool that is firing.

use crate::ecs::component::{Component, ComponentTag};
use crate::ecs::Entity;
use crate::error::{EcsError, Result};
use std::any::{type_name, Any};
use std::collections::HashMap;

/// Default dense capacity of a freshly created pool
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Listener for Added and Changed notifications
pub type ValueListener<T> = Box<dyn FnMut(Entity, &T)>;

/// Listener for Removed notifications
pub type RemovedListener = Box<dyn FnMut(Entity)>;

/// Handle returned when subscribing to a pool channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct PoolEvents<T> {
    next_subscription: u64,
    added: Vec<(Subscription, ValueListener<T>)>,
    changed: Vec<(Subscription, ValueListener<T>)>,
    removed: Vec<(Subscription, RemovedListener)>,
}

impl<T> PoolEvents<T> {
    fn new() -> Self {
        PoolEvents {
            next_subscription: 0,
            added: Vec::new(),
            changed: Vec::new(),
            removed: Vec::new(),
        }
    }

    fn next(&mut self) -> Subscription {
        self.next_subscription += 1;
        Subscription(self.next_subscription)
    }

    fn emit_added(&mut self, entity: Entity, value: &T) {
        for (_, listener) in &mut self.added {
            listener(entity, value);
        }
    }

    fn emit_changed(&mut self, entity: Entity, value: &T) {
        for (_, listener) in &mut self.changed {
            listener(entity, value);
        }
    }

    fn emit_removed(&mut self, entity: Entity) {
        for (_, listener) in &mut self.removed {
            listener(entity);
        }
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.added.len() + self.changed.len() + self.removed.len();
        self.added.retain(|(s, _)| *s != subscription);
        self.changed.retain(|(s, _)| *s != subscription);
        self.removed.retain(|(s, _)| *s != subscription);
        before != self.added.len() + self.changed.len() + self.removed.len()
    }

    fn listener_count(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }
}

/// Sparse-set storage for a single component type
///
/// # Example
///
/// ```
/// use ecs_core::ecs::{Component, Entity, Pool};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Speed(f32);
/// impl Component for Speed {}
///
/// let mut pool = Pool::<Speed>::new();
/// let entity = Entity::from_raw(1).unwrap();
///
/// pool.add_or_set(entity, Speed(2.5));
/// assert!(pool.has(entity));
/// pool.get_mut(entity).unwrap().0 += 1.0;
/// assert_eq!(pool.get(entity).unwrap(), &Speed(3.5));
/// assert!(pool.remove(entity));
/// assert!(!pool.remove(entity));
/// ```
pub struct Pool<T: Component> {
    /// Entity -> dense index
    entity_to_index: HashMap<Entity, usize>,
    /// Dense slot -> owning entity
    entities: Vec<Entity>,
    /// Dense slot -> component value
    values: Vec<T>,
    events: PoolEvents<T>,
}

impl<T: Component> Pool<T> {
    /// Create an empty pool with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create an empty pool with room for `capacity` components
    ///
    /// The pool still grows geometrically past this capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            entity_to_index: HashMap::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            events: PoolEvents::new(),
        }
    }

    /// Tag of the component type stored here
    pub fn tag(&self) -> ComponentTag {
        ComponentTag::of::<T>()
    }

    /// Number of live components
    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Check if the pool holds no components
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dense capacity before the next reallocation
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    #[inline]
    fn slot(&self, entity: Entity) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    /// Number of entries the sparse map can hold without reallocating
    pub(crate) fn index_capacity(&self) -> usize {
        self.entity_to_index.capacity()
    }

    fn not_found(entity: Entity) -> EcsError {
        EcsError::NotFound {
            component: type_name::<T>(),
            entity,
        }
    }

    /// Check whether `entity` has a component in this pool
    #[inline]
    pub fn has(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Get the component of `entity`
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`] if the entity has no component here.
    pub fn get(&self, entity: Entity) -> Result<&T> {
        self.try_get(entity).ok_or_else(|| Self::not_found(entity))
    }

    /// Get a mutable reference to the component of `entity`
    ///
    /// The reference points straight into the dense array, so fields can be
    /// mutated in place. No Changed notification is emitted for in-place
    /// edits.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`] if the entity has no component here.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        self.try_get_mut(entity).ok_or_else(|| Self::not_found(entity))
    }

    /// Get the component of `entity`, or `None` if absent
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|i| &self.values[i])
    }

    /// Get a mutable reference to the component of `entity`, or `None` if absent
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.slot(entity) {
            Some(i) => Some(&mut self.values[i]),
            None => None,
        }
    }

    /// Insert or overwrite the component of `entity`
    ///
    /// Emits exactly one Added notification for a new entity, or exactly one
    /// Changed notification for an existing one. Returns `true` if the
    /// entity was new to this pool.
    pub fn add_or_set(&mut self, entity: Entity, value: T) -> bool {
        if let Some(i) = self.slot(entity) {
            self.values[i] = value;
            self.events.emit_changed(entity, &self.values[i]);
            return false;
        }

        let i = self.values.len();
        self.entities.push(entity);
        self.values.push(value);
        self.entity_to_index.insert(entity, i);

        debug_assert_eq!(self.entity_to_index.len(), self.entities.len());
        debug_assert_eq!(self.entities.len(), self.values.len());

        self.events.emit_added(entity, &self.values[i]);
        true
    }

    /// Remove the component of `entity`, returning its value
    ///
    /// Emits a Removed notification when something was removed.
    pub fn take(&mut self, entity: Entity) -> Option<T> {
        let i = self.entity_to_index.remove(&entity)?;

        // The last dense entry fills the hole; its sparse slot follows it.
        let value = self.values.swap_remove(i);
        self.entities.swap_remove(i);
        if let Some(&moved) = self.entities.get(i) {
            self.entity_to_index.insert(moved, i);
        }

        debug_assert_eq!(self.entity_to_index.len(), self.entities.len());
        debug_assert_eq!(self.entities.len(), self.values.len());

        self.events.emit_removed(entity);
        Some(value)
    }

    /// Remove the component of `entity`
    ///
    /// Returns `false` without side effects if the entity was absent.
    pub fn remove(&mut self, entity: Entity) -> bool {
        self.take(entity).is_some()
    }

    /// Iterate `(entity, value)` pairs in dense order
    pub fn all(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// Iterate entities in dense order
    pub fn all_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    /// Iterate `(entity, &mut value)` pairs in dense order
    ///
    /// The pool is mutably borrowed for the whole walk, so it cannot be
    /// structurally changed while iterating.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }

    /// Dense entity slice, used by joins to drive iteration
    pub(crate) fn entity_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Remove every component, emitting Removed for each
    pub fn clear(&mut self) {
        let entities = std::mem::take(&mut self.entities);
        self.values.clear();
        self.entity_to_index.clear();
        for entity in entities {
            self.events.emit_removed(entity);
        }
    }

    /// Subscribe to Added notifications
    pub fn on_added(&mut self, listener: impl FnMut(Entity, &T) + 'static) -> Subscription {
        let subscription = self.events.next();
        self.events.added.push((subscription, Box::new(listener)));
        subscription
    }

    /// Subscribe to Changed notifications
    pub fn on_changed(&mut self, listener: impl FnMut(Entity, &T) + 'static) -> Subscription {
        let subscription = self.events.next();
        self.events.changed.push((subscription, Box::new(listener)));
        subscription
    }

    /// Subscribe to Removed notifications
    pub fn on_removed(&mut self, listener: impl FnMut(Entity) + 'static) -> Subscription {
        let subscription = self.events.next();
        self.events.removed.push((subscription, Box::new(listener)));
        subscription
    }

    /// Drop a subscription. Returns `false` if it was not found.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    /// Number of registered listeners across all channels
    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }
}

impl<T: Component> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a pool
///
/// The world keeps every pool behind this trait so it can sweep destroyed
/// entities and enumerate pools without knowing their component types.
pub trait AnyPool: Any {
    /// Tag of the stored component type
    fn tag(&self) -> ComponentTag;

    /// Number of live components
    fn count(&self) -> usize;

    /// Check whether `entity` has a component in this pool
    fn contains(&self, entity: Entity) -> bool;

    /// Remove the component of `entity`, firing Removed if present
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Snapshot of the entities in dense order
    fn entities(&self) -> Vec<Entity>;

    /// Upcast for downcasting to the concrete pool
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete pool
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyPool for Pool<T> {
    fn tag(&self) -> ComponentTag {
        ComponentTag::of::<T>()
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn entities(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
