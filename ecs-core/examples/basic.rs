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
//! Basic example demonstrating storage, scheduling and ticking
//!
//! Run with `RUST_LOG=debug` to see the planned order and any faults.

use ecs_core::ecs::{
    phases, Component, Runner, RunnerConfig, Schedule, System, SystemResult, World,
};

#[derive(Debug, Clone)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {}

#[derive(Debug, Clone)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {}

struct Gravity;

impl System for Gravity {
    fn schedule(&self) -> Schedule {
        Schedule::new().order(-10)
    }

    fn run(&mut self, world: &mut World, dt: f32) -> SystemResult {
        world.each_mut::<Velocity>(|_, v| v.dy -= 9.81 * dt);
        Ok(())
    }
}

struct Movement;

impl System for Movement {
    fn schedule(&self) -> Schedule {
        Schedule::new().after::<Gravity>()
    }

    fn run(&mut self, world: &mut World, dt: f32) -> SystemResult {
        world.each_mut2::<Position, Velocity>(|_, p, v| {
            p.x += v.dx * dt;
            p.y += v.dy * dt;
        });
        Ok(())
    }
}

struct Report;

impl System for Report {
    fn schedule(&self) -> Schedule {
        Schedule::new().in_phase(phases::PRESENTATION)
    }

    fn run(&mut self, world: &mut World, _dt: f32) -> SystemResult {
        for (entity, p) in world.get_pool::<Position>().all() {
            println!("  {entity}: ({:.2}, {:.2})", p.x, p.y);
        }
        Ok(())
    }
}

fn main() {
    env_logger::init();

    println!("ECS Core - Basic Example");
    println!("========================\n");

    let mut world = World::new();
    let ball = world.create_entity();
    let rock = world.create_entity();
    let marker = world.create_entity();

    world.set(ball, Position { x: 0.0, y: 10.0 });
    world.set(ball, Velocity { dx: 2.0, dy: 0.0 });
    world.set(rock, Position { x: 5.0, y: 0.0 });
    world.set(marker, Velocity { dx: 0.0, dy: 0.0 });

    world.get_pool::<Position>().on_removed(|entity| println!("  {entity} lost its position"));

    println!("Created {} entities", world.entity_count());
    println!("Entities with position and velocity: {:?}\n", world.query2::<Position, Velocity>().collect::<Vec<_>>());

    let systems: Vec<Box<dyn System>> = vec![Box::new(Report), Box::new(Movement), Box::new(Gravity)];
    let mut runner = Runner::new(systems, RunnerConfig::default());

    for phase in runner.phase_sequence() {
        println!("{phase}: {}", runner.plan().order(*phase).join(" -> "));
    }

    runner.startup(&mut world);
    for tick in 1..=3 {
        println!("\nTick {tick}");
        let report = runner.tick(&mut world, 0.1);
        if !report.is_clean() {
            println!("  {} faults", report.faults().len());
        }
    }
    runner.shutdown(&mut world);

    println!();
    world.destroy_entity(rock);
    println!("Remaining entities: {}", world.entity_count());
}
