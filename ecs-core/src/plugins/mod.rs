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
//! Plugin system
//!
//! Plugins bundle components and systems into installable features. A
//! [`PluginRegistry`] validates each plugin's API version on registration,
//! orders plugins by their declared dependencies, and lets each one install
//! into a shared [`AppBuilder`].
//!
//! ```rust
//! use ecs_core::ecs::{Component, RunnerConfig, System, SystemResult, World};
//! use ecs_core::plugins::{AppBuilder, Plugin, PluginRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! struct Regenerate;
//! impl System for Regenerate {
//!     fn run(&mut self, world: &mut World, _dt: f32) -> SystemResult {
//!         world.each_mut::<Health>(|_, health| health.0 += 1);
//!         Ok(())
//!     }
//! }
//!
//! struct HealthPlugin;
//! impl Plugin for HealthPlugin {
//!     fn name(&self) -> &str { "health" }
//!     fn version(&self) -> &str { "1.0.0" }
//!     fn build(&self, app: &mut AppBuilder) -> ecs_core::Result<()> {
//!         app.register_component::<Health>("Health")?.add_system(Regenerate);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(Box::new(HealthPlugin)).unwrap();
//!
//! let (components, mut runner) = registry
//!     .build()
//!     .unwrap()
//!     .into_runner(RunnerConfig::default());
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! components.set_value(&mut world, "Health", entity, serde_json::json!(5)).unwrap();
//! runner.tick(&mut world, 0.1);
//! assert_eq!(world.get::<Health>(entity).unwrap().0, 6);
//! ```

pub mod api;
pub mod registry;

pub use api::{AppBuilder, Plugin, PLUGIN_API_VERSION};
pub use registry::{InstalledApp, PluginRegistry};
