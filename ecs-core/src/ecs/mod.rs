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

mod component;
mod entity;
mod pool;
mod query;
mod registry;
mod runner;
mod scheduler;
mod system;
mod world;

pub use component::{Component, ComponentTag};
pub use entity::Entity;
pub use pool::{AnyPool, Pool, RemovedListener, Subscription, ValueListener, DEFAULT_POOL_CAPACITY};
pub use query::Query2;
pub use registry::{ComponentRegistry, FieldInfo, FieldKind};
pub use runner::{Runner, RunnerConfig, TickReport};
pub use scheduler::{OrderKey, Plan, PlannedSystem, Scheduler, SystemDescriptor};
pub use system::{phases, Phase, Schedule, System, SystemError, SystemId, SystemResult};
pub use world::{World, WorldConfig};
