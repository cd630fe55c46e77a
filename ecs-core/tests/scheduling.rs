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
//! Scheduling and tick execution through the public API

use ecs_core::ecs::{
    phases, Component, OrderKey, Phase, PlannedSystem, Runner, RunnerConfig, Schedule, Scheduler,
    System, SystemDescriptor, SystemResult, World,
};
use ecs_core::EcsError;

const SIM: Phase = Phase::new("Sim");
const PRESENT: Phase = Phase::new("Present");

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Appends its name to the shared trace component of entity 1
macro_rules! tracing_system {
    ($name:ident, $schedule:expr) => {
        struct $name;

        impl System for $name {
            fn schedule(&self) -> Schedule {
                $schedule
            }

            fn run(&mut self, world: &mut World, _dt: f32) -> SystemResult {
                world.each_mut::<Trace>(|_, trace| trace.0.push(stringify!($name)));
                Ok(())
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Trace(Vec<&'static str>);

impl Component for Trace {}

fn traced_world() -> (World, ecs_core::Entity) {
    let mut world = World::new();
    let entity = world.create_entity();
    world.set(entity, Trace::default());
    (world, entity)
}

#[test]
fn test_two_phases_without_errors() {
    init_logging();
    tracing_system!(A, Schedule::new().in_phase(SIM).order(0));
    tracing_system!(B, Schedule::new().in_phase(SIM).order(10).after::<A>());
    tracing_system!(C, Schedule::new().in_phase(PRESENT).order(0));

    let mut scheduler = Scheduler::new();
    scheduler.add_system(B);
    scheduler.add_system(C);
    scheduler.add_system(A);
    let plan = scheduler.build();

    assert_eq!(plan.order(SIM), vec!["A", "B"]);
    assert_eq!(plan.order(PRESENT), vec!["C"]);
    assert!(plan.errors().is_empty());

    let config = RunnerConfig::default().with_phase_order(vec![SIM, PRESENT]);
    let mut runner = Runner::from_plan(plan, config);
    let (mut world, entity) = traced_world();

    let report = runner.tick(&mut world, 1.0);
    assert!(report.is_clean());
    assert_eq!(report.executed(), 3);
    assert_eq!(world.get::<Trace>(entity).unwrap().0, vec!["A", "B", "C"]);
}

#[test]
fn test_cross_phase_conflict_keeps_both_systems() {
    init_logging();
    tracing_system!(X, Schedule::new().in_phase(SIM).before::<Y>());
    tracing_system!(Y, Schedule::new().in_phase(PRESENT));

    let mut scheduler = Scheduler::new();
    scheduler.add_system(X);
    scheduler.add_system(Y);
    let plan = scheduler.build();
    plan.log_diagnostics();

    assert_eq!(plan.errors().len(), 1);
    let message = plan.errors()[0].to_string();
    for needle in ["X", "Y", "Sim", "Present"] {
        assert!(message.contains(needle), "{message} lacks {needle}");
    }
    assert_eq!(plan.order(SIM), vec!["X"]);
    assert_eq!(plan.order(PRESENT), vec!["Y"]);
}

#[test]
fn test_cycle_still_runs_every_system() {
    init_logging();
    tracing_system!(P, Schedule::new().after::<Q>());
    tracing_system!(Q, Schedule::new().after::<P>());

    let mut runner = Runner::new(vec![Box::new(Q), Box::new(P)], RunnerConfig::default());

    assert_eq!(runner.plan().errors().len(), 1);
    assert!(matches!(
        &runner.plan().errors()[0],
        EcsError::SchedulingCycle { stuck, .. } if stuck.len() == 2
    ));
    assert_eq!(
        runner.plan().errors()[0].to_string(),
        "cycle detected in phase Simulation: P(indeg=1) Q(indeg=1)"
    );

    let (mut world, entity) = traced_world();
    runner.tick(&mut world, 1.0);
    assert_eq!(world.get::<Trace>(entity).unwrap().0, vec!["P", "Q"]);
}

#[test]
fn test_fault_does_not_stop_the_tick() {
    init_logging();
    tracing_system!(Before, Schedule::new().order(0));
    tracing_system!(After, Schedule::new().order(2));

    struct Broken;

    impl System for Broken {
        fn schedule(&self) -> Schedule {
            Schedule::new().order(1)
        }

        fn run(&mut self, world: &mut World, _dt: f32) -> SystemResult {
            let missing = world.create_entity();
            world.get::<Trace>(missing)?;
            Ok(())
        }
    }

    let systems: Vec<Box<dyn System>> = vec![Box::new(After), Box::new(Broken), Box::new(Before)];
    let mut runner = Runner::new(systems, RunnerConfig::default());
    let (mut world, entity) = traced_world();

    let report = runner.tick(&mut world, 1.0);
    assert_eq!(report.executed(), 2);
    assert_eq!(report.faults().len(), 1);
    assert!(matches!(
        &report.faults()[0],
        EcsError::SystemFault { system, phase, .. } if system == "Broken" && phase == "Simulation"
    ));
    assert_eq!(world.get::<Trace>(entity).unwrap().0, vec!["Before", "After"]);
}

#[test]
fn test_unlisted_phases_run_last() {
    tracing_system!(Late, Schedule::new().in_phase(Phase::new("Audio")));
    tracing_system!(Draw, Schedule::new().in_phase(phases::PRESENTATION));
    tracing_system!(Step, Schedule::new());

    let systems: Vec<Box<dyn System>> = vec![Box::new(Late), Box::new(Draw), Box::new(Step)];
    let mut runner = Runner::new(systems, RunnerConfig::default());
    let (mut world, entity) = traced_world();

    runner.tick(&mut world, 1.0);
    assert_eq!(world.get::<Trace>(entity).unwrap().0, vec!["Step", "Draw", "Late"]);

    runner.shutdown(&mut world);
}

#[test]
fn test_plan_exposes_resolved_descriptors() {
    tracing_system!(Late, Schedule::new().in_phase(SIM).order(5).sub_group("late"));
    tracing_system!(Early, Schedule::new().in_phase(SIM).order(5));

    let mut scheduler = Scheduler::new();
    scheduler.add_system(Late);
    scheduler.add_system(Early);
    let plan = scheduler.build();

    let planned: &[PlannedSystem] = plan.phase(SIM);
    let descriptors: Vec<&SystemDescriptor> = planned.iter().map(PlannedSystem::descriptor).collect();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].name(), "Early");
    assert_eq!(descriptors[1].name(), "Late");
    assert_eq!(descriptors[1].phase(), SIM);

    let keys: Vec<OrderKey> = descriptors.iter().map(|descriptor| descriptor.key()).collect();
    assert!(keys[0] < keys[1]);
    assert_eq!(keys[0].order(), 5);
    assert_eq!(keys[0].sub_group(), None);
    assert_eq!(keys[1].sub_group(), Some("late"));
    assert_eq!(SystemDescriptor::of(&Early).key(), keys[0]);
}
