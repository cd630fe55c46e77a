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
//! Plugin registry and loader
//!
//! Plugins are registered statically, validated for API compatibility, and
//! installed in dependency order. The order is deterministic: among plugins
//! whose dependencies are satisfied, the one with the smallest name is
//! installed first.

use crate::ecs::{ComponentRegistry, Runner, RunnerConfig, System};
use crate::error::{EcsError, Result};
use crate::plugins::api::{AppBuilder, Plugin, PLUGIN_API_VERSION};
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};

/// Everything the registered plugins installed
pub struct InstalledApp {
    /// Components registered by all plugins
    pub components: ComponentRegistry,
    /// Systems added by all plugins, in installation order
    pub systems: Vec<Box<dyn System>>,
    /// Plugin names in installation order
    pub load_order: Vec<String>,
}

impl InstalledApp {
    /// Plan the installed systems and wrap them in a runner
    pub fn into_runner(self, config: RunnerConfig) -> (ComponentRegistry, Runner) {
        (self.components, Runner::new(self.systems, config))
    }
}

/// Plugin registry
///
/// # Examples
///
/// ```
/// use ecs_core::plugins::{AppBuilder, Plugin, PluginRegistry};
///
/// struct Core;
/// impl Plugin for Core {
///     fn name(&self) -> &str { "core" }
///     fn version(&self) -> &str { "1.0.0" }
///     fn build(&self, _app: &mut AppBuilder) -> ecs_core::Result<()> { Ok(()) }
/// }
///
/// struct Audio;
/// impl Plugin for Audio {
///     fn name(&self) -> &str { "audio" }
///     fn version(&self) -> &str { "0.3.0" }
///     fn dependencies(&self) -> Vec<&str> { vec!["core"] }
///     fn build(&self, _app: &mut AppBuilder) -> ecs_core::Result<()> { Ok(()) }
/// }
///
/// let mut registry = PluginRegistry::new();
/// registry.register(Box::new(Audio)).unwrap();
/// registry.register(Box::new(Core)).unwrap();
///
/// let app = registry.build().unwrap();
/// assert_eq!(app.load_order, vec!["core", "audio"]);
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    ///
    /// # Errors
    ///
    /// - [`EcsError::PluginAlreadyRegistered`] if the name is taken
    /// - [`EcsError::IncompatiblePlugin`] if the plugin API version does not
    ///   match [`PLUGIN_API_VERSION`]
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();

        if self.plugins.contains_key(&name) {
            return Err(EcsError::PluginAlreadyRegistered(name));
        }

        let requested = plugin.api_version();
        if !is_version_compatible(requested, PLUGIN_API_VERSION) {
            return Err(EcsError::IncompatiblePlugin {
                plugin: name,
                requested: requested.to_string(),
                supported: PLUGIN_API_VERSION.to_string(),
            });
        }

        log::debug!("registered plugin {name} {}", plugin.version());
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    /// Check whether a plugin is registered
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Get the number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Resolve the installation order without installing anything
    ///
    /// # Errors
    ///
    /// - [`EcsError::MissingPluginDependency`] for the first unknown
    ///   dependency, in plugin name order
    /// - [`EcsError::CircularPluginDependency`] listing the plugins that
    ///   could not be ordered
    pub fn load_order(&self) -> Result<Vec<String>> {
        let mut dependencies: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, plugin) in &self.plugins {
            let deps = plugin.dependencies();
            if let Some(missing) = deps.iter().find(|dep| !self.plugins.contains_key(**dep)) {
                return Err(EcsError::MissingPluginDependency {
                    plugin: name.clone(),
                    dependency: missing.to_string(),
                });
            }
            dependencies.insert(name.as_str(), deps);
        }

        topological_sort(&dependencies)
    }

    /// Install every plugin in dependency order
    ///
    /// # Errors
    ///
    /// Dependency errors from [`load_order`](Self::load_order), or the first
    /// error returned by a plugin's [`build`](Plugin::build).
    pub fn build(self) -> Result<InstalledApp> {
        let load_order = self.load_order()?;

        let mut app = AppBuilder::new();
        for name in &load_order {
            if let Some(plugin) = self.plugins.get(name) {
                let before = app.system_count();
                plugin.build(&mut app)?;
                log::info!(
                    "installed plugin {name} {} ({} systems)",
                    plugin.version(),
                    app.system_count() - before
                );
            }
        }

        let (components, systems) = app.into_parts();
        Ok(InstalledApp {
            components,
            systems,
            load_order,
        })
    }
}

/// Check if a plugin API version is compatible with the engine
///
/// - Major version must match
/// - For major version 0, minor versions must match
/// - For major version >= 1, the plugin minor version must not exceed the
///   engine's
/// - Patch version is ignored
fn is_version_compatible(plugin_version: &str, engine_version: &str) -> bool {
    let (Ok(plugin), Ok(engine)) = (Version::parse(plugin_version), Version::parse(engine_version))
    else {
        return false;
    };

    if plugin.major != engine.major {
        return false;
    }

    if plugin.major != 0 {
        plugin.minor <= engine.minor
    } else {
        plugin.minor == engine.minor
    }
}

/// Kahn's algorithm over plugin names, smallest ready name first
fn topological_sort(dependencies: &BTreeMap<&str, Vec<&str>>) -> Result<Vec<String>> {
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (&name, deps) in dependencies {
        in_degree.entry(name).or_insert(0);
        for &dep in deps {
            dependents.entry(dep).or_default().push(name);
            *in_degree.entry(name).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&name, _)| name)
        .collect();

    let mut sorted = Vec::with_capacity(dependencies.len());
    while let Some(node) = ready.pop_first() {
        sorted.push(node.to_string());

        for &dependent in dependents.get(node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if sorted.len() != dependencies.len() {
        let stuck = in_degree
            .into_iter()
            .filter(|&(_, degree)| degree > 0)
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(EcsError::CircularPluginDependency(stuck));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{SystemResult, World};

    struct TestPlugin {
        name: String,
        api: String,
        deps: Vec<String>,
    }

    impl TestPlugin {
        fn new(name: &str, deps: Vec<&str>) -> Box<Self> {
            Box::new(TestPlugin {
                name: name.to_string(),
                api: PLUGIN_API_VERSION.to_string(),
                deps: deps.iter().map(|s| s.to_string()).collect(),
            })
        }

        fn with_api(mut self: Box<Self>, api: &str) -> Box<Self> {
            self.api = api.to_string();
            self
        }
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn api_version(&self) -> &str {
            &self.api
        }

        fn dependencies(&self) -> Vec<&str> {
            self.deps.iter().map(|s| s.as_str()).collect()
        }

        fn build(&self, _app: &mut AppBuilder) -> Result<()> {
            Ok(())
        }
    }

    struct Tick;

    impl System for Tick {
        fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult {
            Ok(())
        }
    }

    struct SystemsPlugin;

    impl Plugin for SystemsPlugin {
        fn name(&self) -> &str {
            "systems"
        }

        fn version(&self) -> &str {
            "0.1.0"
        }

        fn build(&self, app: &mut AppBuilder) -> Result<()> {
            app.add_system(Tick);
            Ok(())
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = PluginRegistry::new();
        assert_eq!(registry.plugin_count(), 0);
        assert!(registry.build().unwrap().load_order.is_empty());
    }

    #[test]
    fn test_duplicate_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::new("a", vec![])).unwrap();
        assert_eq!(
            registry.register(TestPlugin::new("a", vec![])),
            Err(EcsError::PluginAlreadyRegistered("a".to_string()))
        );
        assert_eq!(registry.plugin_count(), 1);
        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").map(|p| p.version()), Some("1.0.0"));
    }

    #[test]
    fn test_version_compatibility() {
        assert!(is_version_compatible("0.1.0", "0.1.0"));
        assert!(is_version_compatible("0.1.5", "0.1.0"));
        assert!(!is_version_compatible("0.2.0", "0.1.0"));
        assert!(!is_version_compatible("1.0.0", "0.1.0"));
        assert!(is_version_compatible("1.2.0", "1.3.0"));
        assert!(!is_version_compatible("1.4.0", "1.3.0"));
        assert!(!is_version_compatible("not-a-version", "0.1.0"));
    }

    #[test]
    fn test_incompatible_plugin_rejected() {
        let mut registry = PluginRegistry::new();
        let result = registry.register(TestPlugin::new("old", vec![]).with_api("0.2.0"));
        assert_eq!(
            result,
            Err(EcsError::IncompatiblePlugin {
                plugin: "old".to_string(),
                requested: "0.2.0".to_string(),
                supported: PLUGIN_API_VERSION.to_string(),
            })
        );
    }

    #[test]
    fn test_dependency_order() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::new("render", vec!["physics", "assets"])).unwrap();
        registry.register(TestPlugin::new("physics", vec!["core"])).unwrap();
        registry.register(TestPlugin::new("assets", vec!["core"])).unwrap();
        registry.register(TestPlugin::new("core", vec![])).unwrap();
        registry.register(TestPlugin::new("audio", vec![])).unwrap();

        assert_eq!(
            registry.load_order().unwrap(),
            vec!["audio", "core", "assets", "physics", "render"]
        );
    }

    #[test]
    fn test_missing_dependency() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::new("a", vec!["ghost"])).unwrap();
        assert_eq!(
            registry.build().err(),
            Some(EcsError::MissingPluginDependency {
                plugin: "a".to_string(),
                dependency: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_circular_dependency() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::new("a", vec!["b"])).unwrap();
        registry.register(TestPlugin::new("b", vec!["a"])).unwrap();
        registry.register(TestPlugin::new("c", vec![])).unwrap();

        assert_eq!(
            registry.load_order(),
            Err(EcsError::CircularPluginDependency(vec![
                "a".to_string(),
                "b".to_string()
            ]))
        );
    }

    #[test]
    fn test_build_collects_systems() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(SystemsPlugin)).unwrap();

        let app = registry.build().unwrap();
        assert_eq!(app.systems.len(), 1);
        assert_eq!(app.load_order, vec!["systems"]);

        let (components, runner) = app.into_runner(RunnerConfig::default());
        assert!(components.is_empty());
        assert_eq!(runner.plan().system_count(), 1);
    }
}
