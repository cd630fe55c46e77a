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
//! # ECS Core
//!
//! The runtime core of an entity-component framework: sparse-set component
//! storage and a deterministic, phase-based system scheduler.
//!
//! ## Features
//!
//! - **Sparse-set pools**: O(1) membership, lookup, insertion and removal per component type
//! - **World registry**: entity allocation and one lazily created pool per component type
//! - **Queries**: lazy two-type joins driven by the smaller pool
//! - **Scheduling**: phases, order keys and before/after dependencies, with conflict and cycle diagnostics
//! - **Runner**: per-tick execution with fault isolation
//! - **Extensibility**: name-keyed component registry and a plugin system
//!
//! ## Example
//!
//! ```rust
//! use ecs_core::ecs::{Component, World};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Velocity { x: f32, y: f32 }
//! impl Component for Velocity {}
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.set(entity, Position { x: 0.0, y: 0.0 });
//! world.set(entity, Velocity { x: 1.0, y: 2.0 });
//!
//! world.each_mut2::<Position, Velocity>(|_, p, v| {
//!     p.x += v.x;
//!     p.y += v.y;
//! });
//!
//! assert_eq!(world.get::<Position>(entity).unwrap(), &Position { x: 1.0, y: 2.0 });
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Crate-wide error type
pub mod error;

/// Plugin system for extensibility
pub mod plugins;

pub use ecs::{Entity, World};
pub use error::{EcsError, Result};
