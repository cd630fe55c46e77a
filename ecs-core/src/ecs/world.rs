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
//! World management
//!
//! The World owns entity allocation and liveness plus one lazily created
//! pool per component type. Every query and system acts through it; there
//! is no global "current world", callers pass it explicitly.

use crate::ecs::component::{Component, ComponentTag};
use crate::ecs::pool::{AnyPool, Pool, DEFAULT_POOL_CAPACITY};
use crate::ecs::Entity;
use crate::error::Result;
use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

/// Configuration for a [`World`]
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Dense capacity reserved by each pool when it is first created
    pub initial_pool_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            initial_pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl WorldConfig {
    /// Set the capacity reserved by newly created pools
    pub fn with_initial_pool_capacity(mut self, capacity: usize) -> Self {
        self.initial_pool_capacity = capacity;
        self
    }
}

/// The main ECS world container
///
/// Entity identifiers come from a strictly increasing counter starting at 1
/// and are never reused, even after destruction.
///
/// # Example
///
/// ```
/// use ecs_core::ecs::{Component, World};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Position(f32, f32);
/// impl Component for Position {}
///
/// let mut world = World::new();
/// let entity = world.create_entity();
/// world.set(entity, Position(1.0, 2.0));
///
/// assert!(world.has::<Position>(entity));
/// world.destroy_entity(entity);
/// assert!(!world.exists(entity));
/// assert!(!world.has::<Position>(entity));
/// ```
pub struct World {
    config: WorldConfig,
    next_entity_id: NonZeroU32,
    alive_entities: HashSet<Entity>,
    /// Pools in creation order
    pools: Vec<Box<dyn AnyPool>>,
    /// Component type -> position in `pools`
    pool_index: HashMap<TypeId, usize>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new empty world with the given configuration
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            config,
            next_entity_id: NonZeroU32::MIN,
            alive_entities: HashSet::new(),
            pools: Vec::new(),
            pool_index: HashMap::new(),
        }
    }

    /// The configuration this world was created with
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Create a new entity
    ///
    /// # Panics
    ///
    /// Panics once all `u32::MAX` identifiers have been handed out.
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::from_non_zero(self.next_entity_id);
        self.next_entity_id = self
            .next_entity_id
            .checked_add(1)
            .unwrap_or_else(|| panic!("entity identifier space exhausted"));
        self.alive_entities.insert(entity);
        entity
    }

    /// Check if an entity was created and not yet destroyed
    pub fn exists(&self, entity: Entity) -> bool {
        self.alive_entities.contains(&entity)
    }

    /// Destroy an entity
    ///
    /// Removes the entity from every pool that holds it, firing each pool's
    /// Removed notification, then marks it dead. Returns `false` without
    /// side effects if the entity is not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.alive_entities.contains(&entity) {
            return false;
        }

        let mut swept = 0usize;
        for pool in &mut self.pools {
            if pool.remove_entity(entity) {
                swept += 1;
            }
        }
        self.alive_entities.remove(&entity);

        log::trace!("destroyed {entity}, removed from {swept} pool(s)");
        true
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive_entities.len()
    }

    /// Iterate over all alive entities in unspecified order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive_entities.iter().copied()
    }

    /// Get the pool for `T`, creating it on first access
    ///
    /// There is exactly one pool per component type for the lifetime of the
    /// world.
    pub fn get_pool<T: Component>(&mut self) -> &mut Pool<T> {
        let index = self.ensure_pool::<T>();
        downcast_pool_mut(&mut self.pools[index])
    }

    /// Get the pool for `T` if it has been created
    pub fn pool<T: Component>(&self) -> Option<&Pool<T>> {
        let index = *self.pool_index.get(&TypeId::of::<T>())?;
        self.pools[index].as_any().downcast_ref::<Pool<T>>()
    }

    /// Get the pool for `T` mutably if it has been created
    pub fn pool_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        let index = *self.pool_index.get(&TypeId::of::<T>())?;
        self.pools[index].as_any_mut().downcast_mut::<Pool<T>>()
    }

    /// Register the pool for `T` and return its position
    pub(crate) fn ensure_pool<T: Component>(&mut self) -> usize {
        if let Some(&index) = self.pool_index.get(&TypeId::of::<T>()) {
            return index;
        }
        let index = self.pools.len();
        self.pools
            .push(Box::new(Pool::<T>::with_capacity(self.config.initial_pool_capacity)));
        self.pool_index.insert(TypeId::of::<T>(), index);
        log::debug!("registered pool for {}", ComponentTag::of::<T>());
        index
    }

    /// Borrow two distinct pools mutably at the same time
    pub(crate) fn pools_pair_mut<A: Component, B: Component>(
        &mut self,
    ) -> (&mut Pool<A>, &mut Pool<B>) {
        let a = self.ensure_pool::<A>();
        let b = self.ensure_pool::<B>();
        assert_ne!(a, b, "cannot borrow the {} pool twice", type_name::<A>());

        if a < b {
            let (left, right) = self.pools.split_at_mut(b);
            (downcast_pool_mut(&mut left[a]), downcast_pool_mut(&mut right[0]))
        } else {
            let (left, right) = self.pools.split_at_mut(a);
            (downcast_pool_mut(&mut right[0]), downcast_pool_mut(&mut left[b]))
        }
    }

    /// Enumerate every pool created in this world
    pub fn get_all_pools(&self) -> impl Iterator<Item = (ComponentTag, &dyn AnyPool)> + '_ {
        self.pools.iter().map(|pool| (pool.tag(), pool.as_ref()))
    }

    /// Number of pools created so far
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Check whether `entity` has a `T` component
    ///
    /// Registers the `T` pool if this is the first access to the type.
    pub fn has<T: Component>(&mut self, entity: Entity) -> bool {
        self.get_pool::<T>().has(entity)
    }

    /// Get the `T` component of `entity`
    ///
    /// Registers the `T` pool if this is the first access to the type.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`](crate::EcsError::NotFound) if the entity has no such component.
    pub fn get<T: Component>(&mut self, entity: Entity) -> Result<&T> {
        self.get_pool::<T>().get(entity)
    }

    /// Get the `T` component of `entity` mutably
    ///
    /// # Errors
    ///
    /// [`EcsError::NotFound`](crate::EcsError::NotFound) if the entity has no such component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.get_pool::<T>().get_mut(entity)
    }

    /// Get a copy of the `T` component of `entity`, or `None` if absent
    pub fn try_get<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.get_pool::<T>().try_get(entity).cloned()
    }

    /// Insert or overwrite the `T` component of `entity`
    ///
    /// Setting a component on an entity that is not alive is a no-op and
    /// logs a warning; a destroyed entity never gets its components back.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) {
        if !self.exists(entity) {
            log::warn!("ignoring set of {} on dead {entity}", ComponentTag::of::<T>());
            return;
        }
        self.get_pool::<T>().add_or_set(entity, value);
    }

    /// Remove the `T` component of `entity`
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        self.get_pool::<T>().remove(entity)
    }

    /// Destroy every alive entity
    ///
    /// Pools and their listeners survive; the id counter keeps counting so
    /// old handles never alias new entities.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.alive_entities.iter().copied().collect();
        for entity in entities {
            self.destroy_entity(entity);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_pool_mut<T: Component>(pool: &mut Box<dyn AnyPool>) -> &mut Pool<T> {
    match pool.as_any_mut().downcast_mut::<Pool<T>>() {
        Some(pool) => pool,
        None => unreachable!("pool index maps {} to a foreign pool", type_name::<T>()),
    }
}
