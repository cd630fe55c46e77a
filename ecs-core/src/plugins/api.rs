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
//! Plugin API
//!
//! A plugin is a feature installer: when the registry builds the app it
//! hands every plugin an [`AppBuilder`] through which the plugin registers
//! its components and systems.

use crate::ecs::{Component, ComponentRegistry, System};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Version of the plugin API
///
/// Plugins report the API version they were built against through
/// [`Plugin::api_version`]; the registry rejects incompatible versions.
/// Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const PLUGIN_API_VERSION: &str = "0.1.0";

/// Collects what plugins install
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{System, SystemResult, World};
/// use ecs_core::plugins::AppBuilder;
///
/// struct Cleanup;
/// impl System for Cleanup {
///     fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult { Ok(()) }
/// }
///
/// let mut app = AppBuilder::new();
/// app.add_system(Cleanup);
/// assert_eq!(app.system_count(), 1);
/// ```
#[derive(Default)]
pub struct AppBuilder {
    components: ComponentRegistry,
    systems: Vec<Box<dyn System>>,
}

impl AppBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under `name`
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentAlreadyRegistered`](crate::error::EcsError::ComponentAlreadyRegistered)
    /// if another plugin already claimed the name.
    pub fn register_component<T>(&mut self, name: impl Into<String>) -> Result<&mut Self>
    where
        T: Component + Serialize + DeserializeOwned + Default,
    {
        self.components.register::<T>(name)?;
        Ok(self)
    }

    /// Add a system
    pub fn add_system<S: System>(&mut self, system: S) -> &mut Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Add an already boxed system
    pub fn add_boxed_system(&mut self, system: Box<dyn System>) -> &mut Self {
        self.systems.push(system);
        self
    }

    /// Components registered so far
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Number of systems added so far
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub(crate) fn into_parts(self) -> (ComponentRegistry, Vec<Box<dyn System>>) {
        (self.components, self.systems)
    }
}

/// A feature installer
pub trait Plugin {
    /// Get the name of this plugin
    ///
    /// Must be unique across all registered plugins.
    fn name(&self) -> &str;

    /// Get the version of this plugin
    fn version(&self) -> &str;

    /// Get the plugin API version this plugin was built against
    fn api_version(&self) -> &str {
        PLUGIN_API_VERSION
    }

    /// Names of the plugins that must be installed first
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Install components and systems
    ///
    /// # Errors
    ///
    /// Any error aborts the build of the whole app.
    fn build(&self, app: &mut AppBuilder) -> Result<()>;
}
