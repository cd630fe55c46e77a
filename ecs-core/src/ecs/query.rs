//! Query and iteration helpers
//!
//! Queries compose pools into entity sequences. The two-type join walks the
//! smaller pool and probes the larger one, so its cost is bounded by
//! `min(|A|, |B|)` membership tests. No iteration order is guaranteed.

use crate::ecs::component::Component;
use crate::ecs::pool::AnyPool;
use crate::ecs::{Entity, World};
use std::iter::Copied;
use std::slice;

/// Lazy intersection of two pools
///
/// Produced by [`World::query2`]. Yields every entity present in both pools
/// exactly once.
pub struct Query2<'w> {
    driver: Copied<slice::Iter<'w, Entity>>,
    probe: Option<&'w dyn AnyPool>,
}

impl<'w> Query2<'w> {
    fn empty() -> Self {
        let nothing: &'static [Entity] = &[];
        Query2 {
            driver: nothing.iter().copied(),
            probe: None,
        }
    }
}

impl<'w> Iterator for Query2<'w> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let probe = self.probe?;
        self.driver.by_ref().find(|&entity| probe.contains(entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.probe {
            Some(_) => (0, self.driver.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl World {
    /// Entities that have a `T` component, in dense order
    ///
    /// Registers the `T` pool if this is the first access to the type.
    pub fn query<T: Component>(&mut self) -> impl Iterator<Item = Entity> + '_ {
        self.get_pool::<T>().entity_slice().iter().copied()
    }

    /// Entities that have both an `A` and a `B` component
    ///
    /// Registers both pools if this is the first access to either type.
    ///
    /// ```
    /// use ecs_core::ecs::{Component, World};
    ///
    /// #[derive(Clone)]
    /// struct A;
    /// impl Component for A {}
    /// #[derive(Clone)]
    /// struct B;
    /// impl Component for B {}
    ///
    /// let mut world = World::new();
    /// let both = world.create_entity();
    /// let only_a = world.create_entity();
    /// world.set(both, A);
    /// world.set(both, B);
    /// world.set(only_a, A);
    ///
    /// assert_eq!(world.query2::<A, B>().collect::<Vec<_>>(), vec![both]);
    /// ```
    pub fn query2<A: Component, B: Component>(&mut self) -> Query2<'_> {
        self.ensure_pool::<A>();
        self.ensure_pool::<B>();
        let world: &World = self;
        let (a, b) = match (world.pool::<A>(), world.pool::<B>()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Query2::empty(),
        };

        if a.count() <= b.count() {
            Query2 {
                driver: a.entity_slice().iter().copied(),
                probe: Some(b as &dyn AnyPool),
            }
        } else {
            Query2 {
                driver: b.entity_slice().iter().copied(),
                probe: Some(a as &dyn AnyPool),
            }
        }
    }

    /// Mutate every `T` component in place
    ///
    /// The pool stays mutably borrowed for the whole walk, so `f` cannot add
    /// or remove components of the same type.
    pub fn each_mut<T: Component>(&mut self, mut f: impl FnMut(Entity, &mut T)) {
        for (entity, value) in self.get_pool::<T>().iter_mut() {
            f(entity, value);
        }
    }

    /// Mutate the `A` and `B` components of every entity that has both
    ///
    /// The join is materialized into a snapshot before the walk starts, so
    /// probing never observes values that `f` is editing.
    ///
    /// # Panics
    ///
    /// Panics if `A` and `B` are the same type.
    pub fn each_mut2<A: Component, B: Component>(&mut self, mut f: impl FnMut(Entity, &mut A, &mut B)) {
        let (a, b) = self.pools_pair_mut::<A, B>();
        let snapshot: Vec<Entity> = if a.count() <= b.count() {
            a.all_entities().filter(|&e| b.has(e)).collect()
        } else {
            b.all_entities().filter(|&e| a.has(e)).collect()
        };

        for entity in snapshot {
            if let (Some(va), Some(vb)) = (a.try_get_mut(entity), b.try_get_mut(entity)) {
                f(entity, va, vb);
            }
        }
    }
}
