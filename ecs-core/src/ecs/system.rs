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
//! System execution framework
//!
//! Systems contain the logic that operates on entities and components. Each
//! system declares where it runs through a [`Schedule`]: the phase it belongs
//! to, a numeric order with an optional sub-group, and the systems it must
//! run before or after. The [`Scheduler`](crate::ecs::Scheduler) turns these
//! declarations into a [`Plan`](crate::ecs::Plan).

use crate::ecs::component::short_type_name;
use crate::ecs::World;
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Error type returned by system hooks
pub type SystemError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by system hooks
pub type SystemResult = std::result::Result<(), SystemError>;

/// Named execution group
///
/// Every system runs in exactly one phase. Phases are not ordered relative
/// to each other by the scheduler; the runner decides their sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(&'static str);

impl Phase {
    /// Create a phase with the given name
    pub const fn new(name: &'static str) -> Self {
        Phase(name)
    }

    /// The phase name
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl Default for Phase {
    fn default() -> Self {
        phases::SIMULATION
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Pre-defined standard phases
pub mod phases {
    use super::Phase;

    /// Game logic and state updates. The default phase.
    pub const SIMULATION: Phase = Phase::new("Simulation");

    /// Presentation and view synchronization, after simulation
    pub const PRESENTATION: Phase = Phase::new("Presentation");
}

/// Identity of a system type
///
/// Dependency declarations reference system types, not instances.
/// Equality and hashing use the [`TypeId`] only.
#[derive(Debug, Clone, Copy)]
pub struct SystemId {
    type_id: TypeId,
    type_name: &'static str,
}

impl SystemId {
    /// Identity of the system type `S`
    pub fn of<S: ?Sized + 'static>() -> Self {
        SystemId {
            type_id: TypeId::of::<S>(),
            type_name: type_name::<S>(),
        }
    }

    /// Fully qualified type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without its module path
    pub fn name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

impl PartialEq for SystemId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SystemId {}

impl Hash for SystemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative scheduling metadata of a system
///
/// ```
/// use ecs_core::ecs::{phases, Schedule};
///
/// struct Physics;
/// struct Render;
///
/// let schedule = Schedule::new()
///     .in_phase(phases::SIMULATION)
///     .order(10)
///     .sub_group("movement")
///     .after::<Physics>()
///     .before::<Render>();
///
/// assert_eq!(schedule.order, 10);
/// assert_eq!(schedule.after.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Phase the system executes in
    pub phase: Phase,
    /// Numeric order within the phase, lower runs first
    pub order: i32,
    /// Tie-break between systems that share the same numeric order
    pub sub_group: Option<&'static str>,
    /// Systems this one must run before
    pub before: Vec<SystemId>,
    /// Systems this one must run after
    pub after: Vec<SystemId>,
}

impl Schedule {
    /// Default schedule: simulation phase, order 0, no dependencies
    pub fn new() -> Self {
        Self::default()
    }

    /// Run in `phase`
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Set the numeric order
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set the sub-group discriminator
    pub fn sub_group(mut self, sub_group: &'static str) -> Self {
        self.sub_group = Some(sub_group);
        self
    }

    /// Run before the system type `S`
    pub fn before<S: ?Sized + 'static>(mut self) -> Self {
        self.before.push(SystemId::of::<S>());
        self
    }

    /// Run after the system type `S`
    pub fn after<S: ?Sized + 'static>(mut self) -> Self {
        self.after.push(SystemId::of::<S>());
        self
    }
}

/// Trait for systems that operate on the ECS world
///
/// Only [`run`](System::run) is required. The world is passed explicitly to
/// every hook.
pub trait System: 'static {
    /// Per-tick update
    fn run(&mut self, world: &mut World, dt: f32) -> SystemResult;

    /// Scheduling metadata, read once when a plan is built
    fn schedule(&self) -> Schedule {
        Schedule::default()
    }

    /// Called once by the runner before the first tick
    fn init(&mut self, _world: &mut World) -> SystemResult {
        Ok(())
    }

    /// Called once by the runner at shutdown
    fn stop(&mut self, _world: &mut World) -> SystemResult {
        Ok(())
    }

    /// Identity used to resolve dependency declarations
    fn id(&self) -> SystemId {
        SystemId::of::<Self>()
    }

    /// Get the name of this system for diagnostics
    fn name(&self) -> &str {
        short_type_name(type_name::<Self>())
    }
}
