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
//! Error types shared across the crate
//!
//! Storage errors propagate straight to the caller. Scheduling errors are
//! collected into a [`Plan`](crate::ecs::Plan) instead of aborting, and
//! system faults are captured by the [`Runner`](crate::ecs::Runner).

use crate::ecs::Entity;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EcsError>;

/// Errors produced by the storage layer, the scheduler, the runner and the
/// plugin/component registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component lookup targeted an entity absent from the pool.
    #[error("[{component}] {entity} not found")]
    NotFound {
        /// Type name of the component that was looked up.
        component: &'static str,
        /// The entity that has no such component.
        entity: Entity,
    },

    /// A system declared an ordering dependency on a system in another phase.
    #[error("cross-phase dependency forbidden: {system} -> {target} ({system_phase} -> {target_phase})")]
    SchedulingConflict {
        /// The system that declared the dependency.
        system: String,
        /// The dependency target.
        target: String,
        /// Phase of the declaring system.
        system_phase: String,
        /// Phase of the target system.
        target_phase: String,
    },

    /// The dependency graph of a phase contains a cycle.
    #[error("cycle detected in phase {phase}: {}", format_stuck(.stuck))]
    SchedulingCycle {
        /// The phase containing the cycle.
        phase: String,
        /// Systems that could not be ordered, with their residual indegree.
        stuck: Vec<(String, usize)>,
    },

    /// A system failed while being invoked by the runner.
    #[error("system {system} faulted in phase {phase}: {message}")]
    SystemFault {
        /// The failing system.
        system: String,
        /// The phase (or lifecycle hook) being executed.
        phase: String,
        /// Error or panic message.
        message: String,
    },

    /// No component is registered under this name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A component name was registered twice.
    #[error("component '{0}' is already registered")]
    ComponentAlreadyRegistered(String),

    /// A component value could not be converted to or from its generic form.
    #[error("failed to convert component {component}: {message}")]
    Codec {
        /// Registered component name.
        component: String,
        /// Underlying serde error.
        message: String,
    },

    /// A plugin with the same name was already registered.
    #[error("plugin '{0}' is already registered")]
    PluginAlreadyRegistered(String),

    /// A plugin targets an incompatible plugin API version.
    #[error("plugin '{plugin}' API version {requested} is incompatible with engine API version {supported}")]
    IncompatiblePlugin {
        /// Plugin name.
        plugin: String,
        /// API version the plugin was built against.
        requested: String,
        /// API version provided by this crate.
        supported: String,
    },

    /// A plugin depends on a plugin that was never registered.
    #[error("plugin '{plugin}' depends on '{dependency}' which is not registered")]
    MissingPluginDependency {
        /// Plugin name.
        plugin: String,
        /// Name of the missing dependency.
        dependency: String,
    },

    /// Plugin dependencies form a cycle.
    #[error("circular dependency detected among plugins: {}", .0.join(", "))]
    CircularPluginDependency(Vec<String>),
}

fn format_stuck(stuck: &[(String, usize)]) -> String {
    stuck
        .iter()
        .map(|(name, indegree)| format!("{name}(indeg={indegree})"))
        .collect::<Vec<_>>()
        .join(" ")
}
