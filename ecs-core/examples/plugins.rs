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
//! Plugin example: features installed through a plugin registry
//!
//! Components registered by plugins are addressable by name, which is how
//! an inspector or a scene loader would touch them.

use ecs_core::ecs::{Component, RunnerConfig, Schedule, System, SystemResult, World};
use ecs_core::plugins::{AppBuilder, Plugin, PluginRegistry};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Health {
    current: f32,
    max: f32,
    regen: f32,
}

impl Component for Health {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Poison {
    damage: f32,
}

impl Component for Poison {}

struct Regenerate;

impl System for Regenerate {
    fn run(&mut self, world: &mut World, dt: f32) -> SystemResult {
        world.each_mut::<Health>(|_, h| h.current = (h.current + h.regen * dt).min(h.max));
        Ok(())
    }
}

struct ApplyPoison;

impl System for ApplyPoison {
    fn schedule(&self) -> Schedule {
        Schedule::new().before::<Regenerate>()
    }

    fn run(&mut self, world: &mut World, dt: f32) -> SystemResult {
        world.each_mut2::<Health, Poison>(|_, h, p| h.current -= p.damage * dt);
        Ok(())
    }
}

struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn name(&self) -> &str {
        "health"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn build(&self, app: &mut AppBuilder) -> ecs_core::Result<()> {
        app.register_component::<Health>("Health")?.add_system(Regenerate);
        Ok(())
    }
}

struct PoisonPlugin;

impl Plugin for PoisonPlugin {
    fn name(&self) -> &str {
        "poison"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["health"]
    }

    fn build(&self, app: &mut AppBuilder) -> ecs_core::Result<()> {
        app.register_component::<Poison>("Poison")?.add_system(ApplyPoison);
        Ok(())
    }
}

fn main() -> ecs_core::Result<()> {
    env_logger::init();

    let mut registry = PluginRegistry::new();
    registry.register(Box::new(PoisonPlugin))?;
    registry.register(Box::new(HealthPlugin))?;

    let app = registry.build()?;
    println!("Plugins installed: {}", app.load_order.join(", "));

    let (components, mut runner) = app.into_runner(RunnerConfig::default());

    for name in components.names() {
        let fields: Vec<String> = components
            .fields(name)?
            .into_iter()
            .map(|f| format!("{}: {}", f.name, f.kind))
            .collect();
        println!("  {name} {{ {} }}", fields.join(", "));
    }

    let mut world = World::new();
    let hero = world.create_entity();
    components.set_value(&mut world, "Health", hero, json!({ "current": 50.0, "max": 100.0, "regen": 5.0 }))?;
    components.set_value(&mut world, "Poison", hero, json!({ "damage": 8.0 }))?;

    runner.startup(&mut world);
    for tick in 1..=5 {
        runner.tick(&mut world, 1.0);
        println!("tick {tick}: {}", components.get_value(&mut world, "Health", hero)?);
    }

    components.remove(&mut world, "Poison", hero)?;
    runner.tick(&mut world, 1.0);
    println!("cured: {}", components.get_value(&mut world, "Health", hero)?);
    println!("components on hero: {:?}", components.components_of(&mut world, hero));

    runner.shutdown(&mut world);
    Ok(())
}
