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
//! Tick runner
//!
//! Executes a [`Plan`] against a [`World`]. Every system invocation is
//! isolated: an `Err` return or a panic is turned into an
//! [`EcsError::SystemFault`], logged, and collected into the report of the
//! current call while the remaining systems keep running.

use crate::ecs::scheduler::{Plan, PlannedSystem, Scheduler};
use crate::ecs::system::{phases, Phase, System, SystemResult};
use crate::ecs::World;
use crate::error::EcsError;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Phases executed first, in this order. Planned phases missing from the
    /// list run afterwards in name order.
    pub phase_order: Vec<Phase>,
    /// Convert panics inside systems into faults instead of unwinding
    pub catch_panics: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            phase_order: vec![phases::SIMULATION, phases::PRESENTATION],
            catch_panics: true,
        }
    }
}

impl RunnerConfig {
    /// Set the phase execution order
    pub fn with_phase_order(mut self, phase_order: Vec<Phase>) -> Self {
        self.phase_order = phase_order;
        self
    }

    /// Enable or disable panic isolation
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

/// Outcome of one runner call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    executed: usize,
    faults: Vec<EcsError>,
}

impl TickReport {
    /// Number of system invocations that completed successfully
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Faults captured during the call
    pub fn faults(&self) -> &[EcsError] {
        &self.faults
    }

    /// Check whether every invocation succeeded
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Drives the systems of a plan tick by tick
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{Runner, RunnerConfig, System, SystemResult, World};
///
/// struct Spawner;
/// impl System for Spawner {
///     fn run(&mut self, world: &mut World, _dt: f32) -> SystemResult {
///         world.create_entity();
///         Ok(())
///     }
/// }
///
/// let mut world = World::new();
/// let mut runner = Runner::new(vec![Box::new(Spawner)], RunnerConfig::default());
///
/// runner.startup(&mut world);
/// let report = runner.tick(&mut world, 1.0 / 60.0);
/// assert!(report.is_clean());
/// assert_eq!(world.entity_count(), 1);
/// ```
pub struct Runner {
    plan: Plan,
    config: RunnerConfig,
    sequence: Vec<Phase>,
}

impl Runner {
    /// Plan `systems` and log the scheduling diagnostics
    pub fn new(systems: Vec<Box<dyn System>>, config: RunnerConfig) -> Self {
        let plan = Scheduler::from(systems).build();
        plan.log_diagnostics();
        Self::from_plan(plan, config)
    }

    /// Wrap an already built plan
    pub fn from_plan(plan: Plan, config: RunnerConfig) -> Self {
        let mut sequence: Vec<Phase> = Vec::new();
        for phase in config.phase_order.iter().copied() {
            if !sequence.contains(&phase) {
                sequence.push(phase);
            }
        }
        for phase in plan.phases() {
            if !sequence.contains(&phase) {
                sequence.push(phase);
            }
        }

        Runner {
            plan,
            config,
            sequence,
        }
    }

    /// The execution plan
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Phases in execution order
    pub fn phase_sequence(&self) -> &[Phase] {
        &self.sequence
    }

    /// Call every system's `init` hook in plan order
    pub fn startup(&mut self, world: &mut World) -> TickReport {
        let mut report = TickReport::default();
        for &phase in &self.sequence {
            for planned in self.plan.phase_mut(phase) {
                invoke(self.config.catch_panics, planned, phase, "init", &mut report, |system| {
                    system.init(world)
                });
            }
        }
        report
    }

    /// Run every phase once
    pub fn tick(&mut self, world: &mut World, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        for &phase in &self.sequence {
            for planned in self.plan.phase_mut(phase) {
                invoke(self.config.catch_panics, planned, phase, "run", &mut report, |system| {
                    system.run(world, dt)
                });
            }
        }
        report
    }

    /// Call every system's `stop` hook in reverse plan order
    pub fn shutdown(&mut self, world: &mut World) -> TickReport {
        let mut report = TickReport::default();
        for &phase in self.sequence.iter().rev() {
            for planned in self.plan.phase_mut(phase).iter_mut().rev() {
                invoke(self.config.catch_panics, planned, phase, "stop", &mut report, |system| {
                    system.stop(world)
                });
            }
        }
        report
    }
}

fn invoke(
    catch_panics: bool,
    planned: &mut PlannedSystem,
    phase: Phase,
    hook: &str,
    report: &mut TickReport,
    call: impl FnOnce(&mut dyn System) -> SystemResult,
) {
    let system = planned.system_mut();
    let outcome = if catch_panics {
        catch_unwind(AssertUnwindSafe(|| call(system))).unwrap_or_else(|payload| {
            Err(format!("panicked: {}", panic_message(payload.as_ref())).into())
        })
    } else {
        call(system)
    };

    match outcome {
        Ok(()) => report.executed += 1,
        Err(error) => {
            let fault = EcsError::SystemFault {
                system: planned.name().to_string(),
                phase: if hook == "run" {
                    phase.to_string()
                } else {
                    format!("{phase}/{hook}")
                },
                message: error.to_string(),
            };
            log::error!("{fault}");
            report.faults.push(fault);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
