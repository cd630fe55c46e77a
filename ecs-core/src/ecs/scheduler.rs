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
//! System scheduler
//!
//! Builds an execution [`Plan`] from the scheduling metadata of a set of
//! systems:
//!
//! 1. Systems are partitioned by [`Phase`].
//! 2. Within a phase, `before`/`after` declarations become directed edges.
//!    Declarations that point into another phase are recorded as
//!    [`EcsError::SchedulingConflict`] and dropped.
//! 3. Each phase is topologically sorted with Kahn's algorithm, always
//!    picking the ready system with the lowest [`OrderKey`].
//! 4. Systems caught in a cycle are recorded as
//!    [`EcsError::SchedulingCycle`] and appended in order-key order.
//!
//! Building a plan never fails: problems degrade the ordering and are
//! reported as diagnostics.

use crate::ecs::system::{Phase, Schedule, System, SystemId};
use crate::error::EcsError;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sort key used to sequence systems without explicit dependency edges
///
/// Compares the numeric order first, then the sub-group (systems without a
/// sub-group come first), then the fully qualified type name so the
/// ordering never depends on registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey {
    order: i32,
    sub_group: Option<&'static str>,
    type_name: &'static str,
}

impl OrderKey {
    /// Numeric order
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Sub-group discriminator
    pub fn sub_group(&self) -> Option<&'static str> {
        self.sub_group
    }
}

/// Scheduling metadata resolved for one system
#[derive(Debug, Clone)]
pub struct SystemDescriptor {
    id: SystemId,
    name: String,
    phase: Phase,
    key: OrderKey,
    before: Vec<SystemId>,
    after: Vec<SystemId>,
}

impl SystemDescriptor {
    /// Read the metadata of `system`
    pub fn of(system: &dyn System) -> Self {
        let id = system.id();
        let Schedule {
            phase,
            order,
            sub_group,
            before,
            after,
        } = system.schedule();

        SystemDescriptor {
            id,
            name: system.name().to_string(),
            phase,
            key: OrderKey {
                order,
                sub_group,
                type_name: id.type_name(),
            },
            before,
            after,
        }
    }

    /// System type identity
    pub fn id(&self) -> SystemId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase the system runs in
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Order key
    pub fn key(&self) -> OrderKey {
        self.key
    }
}

/// A system placed in a plan together with its resolved metadata
pub struct PlannedSystem {
    descriptor: SystemDescriptor,
    system: Box<dyn System>,
}

impl PlannedSystem {
    /// Resolved scheduling metadata
    pub fn descriptor(&self) -> &SystemDescriptor {
        &self.descriptor
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The system instance
    pub fn system(&self) -> &dyn System {
        self.system.as_ref()
    }

    /// The system instance, mutably
    pub fn system_mut(&mut self) -> &mut dyn System {
        self.system.as_mut()
    }
}

/// Execution plan produced by [`Scheduler::build`]
///
/// Maps each phase to its ordered systems and carries the diagnostics
/// gathered while building.
#[derive(Default)]
pub struct Plan {
    phases: BTreeMap<Phase, Vec<PlannedSystem>>,
    errors: Vec<EcsError>,
    warnings: Vec<String>,
}

impl Plan {
    /// Phases present in the plan, sorted by name
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phases.keys().copied()
    }

    /// Ordered systems of `phase`, empty if the phase has none
    pub fn phase(&self, phase: Phase) -> &[PlannedSystem] {
        self.phases
            .get(&phase)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn phase_mut(&mut self, phase: Phase) -> &mut [PlannedSystem] {
        self.phases
            .get_mut(&phase)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    /// Names of the systems of `phase` in execution order
    pub fn order(&self, phase: Phase) -> Vec<&str> {
        self.phase(phase).iter().map(PlannedSystem::name).collect()
    }

    /// Fatal scheduling errors (conflicts and cycles)
    pub fn errors(&self) -> &[EcsError] {
        &self.errors
    }

    /// Advisory warnings
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Check whether any scheduling error was recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total number of planned systems
    pub fn system_count(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    /// Emit the diagnostics and the per-phase order through `log`
    pub fn log_diagnostics(&self) {
        for error in &self.errors {
            log::error!("{error}");
        }
        for warning in &self.warnings {
            log::warn!("{warning}");
        }
        for (phase, systems) in &self.phases {
            let names: Vec<&str> = systems.iter().map(PlannedSystem::name).collect();
            log::debug!("phase {phase}: {}", names.join(", "));
        }
    }
}

/// Collects systems and builds a [`Plan`]
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{phases, Schedule, Scheduler, System, SystemResult, World};
///
/// struct Input;
/// impl System for Input {
///     fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult { Ok(()) }
/// }
///
/// struct Movement;
/// impl System for Movement {
///     fn schedule(&self) -> Schedule {
///         Schedule::new().after::<Input>()
///     }
///     fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult { Ok(()) }
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(Movement);
/// scheduler.add_system(Input);
///
/// let plan = scheduler.build();
/// assert_eq!(plan.order(phases::SIMULATION), vec!["Input", "Movement"]);
/// assert!(!plan.has_errors());
/// ```
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
        }
    }

    /// Add a system
    pub fn add_system<S: System>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Add an already boxed system
    pub fn add_boxed(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Build the execution plan
    pub fn build(self) -> Plan {
        let mut plan = Plan::default();

        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(self.systems.len());
        let mut systems = Vec::with_capacity(self.systems.len());
        for system in self.systems {
            let descriptor = SystemDescriptor::of(system.as_ref());
            if !seen.insert(descriptor.id) {
                plan.warnings.push(format!(
                    "system {} registered more than once, keeping the first instance",
                    descriptor.name
                ));
                continue;
            }
            descriptors.push(descriptor);
            systems.push(Some(system));
        }

        let phase_of: HashMap<SystemId, Phase> =
            descriptors.iter().map(|d| (d.id, d.phase)).collect();

        let mut by_phase: BTreeMap<Phase, Vec<usize>> = BTreeMap::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            by_phase.entry(descriptor.phase).or_default().push(index);
        }

        for (phase, members) in by_phase {
            let edges = collect_edges(phase, &members, &descriptors, &phase_of, &mut plan);
            let ordered = order_phase(phase, &members, &edges, &descriptors, &mut plan);

            let planned = ordered
                .into_iter()
                .filter_map(|index| {
                    systems[index].take().map(|system| PlannedSystem {
                        descriptor: descriptors[index].clone(),
                        system,
                    })
                })
                .collect();
            plan.phases.insert(phase, planned);
        }

        plan
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn System>>> for Scheduler {
    fn from(systems: Vec<Box<dyn System>>) -> Self {
        Scheduler { systems }
    }
}

/// Translate the dependency declarations of one phase into local edges
///
/// Edges are `(from, to)` pairs of positions within `members`.
fn collect_edges(
    phase: Phase,
    members: &[usize],
    descriptors: &[SystemDescriptor],
    phase_of: &HashMap<SystemId, Phase>,
    plan: &mut Plan,
) -> Vec<(usize, usize)> {
    let local: HashMap<SystemId, usize> = members
        .iter()
        .enumerate()
        .map(|(position, &index)| (descriptors[index].id, position))
        .collect();

    let mut edges = Vec::new();
    for (position, &index) in members.iter().enumerate() {
        let descriptor = &descriptors[index];
        let declared = descriptor
            .before
            .iter()
            .map(|target| (target, true))
            .chain(descriptor.after.iter().map(|target| (target, false)));

        for (target, runs_before) in declared {
            if *target == descriptor.id {
                plan.warnings.push(format!(
                    "system {} declares a dependency on itself, ignoring",
                    descriptor.name
                ));
                continue;
            }

            match phase_of.get(target) {
                None => plan.warnings.push(format!(
                    "system {} references {} which is not registered, ignoring",
                    descriptor.name,
                    target.name()
                )),
                Some(&target_phase) if target_phase != phase => {
                    plan.errors.push(EcsError::SchedulingConflict {
                        system: descriptor.name.clone(),
                        target: target.name().to_string(),
                        system_phase: phase.to_string(),
                        target_phase: target_phase.to_string(),
                    });
                }
                Some(_) => {
                    let other = local[target];
                    if runs_before {
                        edges.push((position, other));
                    } else {
                        edges.push((other, position));
                    }
                }
            }
        }
    }
    edges
}

/// Deterministic Kahn's algorithm over one phase
///
/// Returns global descriptor indices in execution order.
fn order_phase(
    phase: Phase,
    members: &[usize],
    edges: &[(usize, usize)],
    descriptors: &[SystemDescriptor],
    plan: &mut Plan,
) -> Vec<usize> {
    let key = |position: usize| descriptors[members[position]].key;

    let mut indegree = vec![0usize; members.len()];
    let mut successors = vec![Vec::new(); members.len()];
    for &(from, to) in edges {
        indegree[to] += 1;
        successors[from].push(to);
    }

    let mut ready: Vec<usize> = (0..members.len()).filter(|&p| indegree[p] == 0).collect();
    ready.sort_by_key(|&p| key(p));

    let mut placed = vec![false; members.len()];
    let mut ordered = Vec::with_capacity(members.len());
    while !ready.is_empty() {
        let next = ready.remove(0);
        placed[next] = true;
        ordered.push(next);

        for &successor in &successors[next] {
            indegree[successor] -= 1;
            if indegree[successor] == 0 {
                ready.push(successor);
            }
        }
        // a freshly released low key may overtake systems already waiting
        ready.sort_by_key(|&p| key(p));
    }

    if ordered.len() < members.len() {
        let mut stuck: Vec<usize> = (0..members.len()).filter(|&p| !placed[p]).collect();
        stuck.sort_by_key(|&p| key(p));

        plan.errors.push(EcsError::SchedulingCycle {
            phase: phase.to_string(),
            stuck: stuck
                .iter()
                .map(|&p| (descriptors[members[p]].name.clone(), indegree[p]))
                .collect(),
        });
        ordered.extend(stuck);
    }

    ordered.into_iter().map(|position| members[position]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::{phases, SystemResult};
    use crate::ecs::World;

    const SIM: Phase = Phase::new("Sim");
    const PRESENT: Phase = Phase::new("Present");

    macro_rules! test_system {
        ($name:ident, $schedule:expr) => {
            struct $name;

            impl System for $name {
                fn schedule(&self) -> Schedule {
                    $schedule
                }

                fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult {
                    Ok(())
                }
            }
        };
    }

    fn plan_of(systems: Vec<Box<dyn System>>) -> Plan {
        Scheduler::from(systems).build()
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.system_count(), 0);
        let plan = scheduler.build();
        assert_eq!(plan.system_count(), 0);
        assert_eq!(plan.phases().count(), 0);
    }

    #[test]
    fn test_phases_and_after_dependency() {
        test_system!(A, Schedule::new().in_phase(SIM).order(0));
        test_system!(B, Schedule::new().in_phase(SIM).order(10).after::<A>());
        test_system!(C, Schedule::new().in_phase(PRESENT).order(0));

        let plan = plan_of(vec![Box::new(C), Box::new(B), Box::new(A)]);

        assert_eq!(plan.order(SIM), vec!["A", "B"]);
        assert_eq!(plan.order(PRESENT), vec!["C"]);
        assert!(plan.errors().is_empty());
        assert!(plan.warnings().is_empty());
    }

    #[test]
    fn test_dependency_beats_order_key() {
        test_system!(Early, Schedule::new().order(-100).after::<Late>());
        test_system!(Late, Schedule::new().order(100));

        let plan = plan_of(vec![Box::new(Early), Box::new(Late)]);
        assert_eq!(plan.order(phases::SIMULATION), vec!["Late", "Early"]);
        assert!(!plan.has_errors());
    }

    #[test]
    fn test_before_dependency() {
        test_system!(First, Schedule::new().order(50).before::<Second>());
        test_system!(Second, Schedule::new().order(0));
        test_system!(Unrelated, Schedule::new().order(25));

        let plan = plan_of(vec![Box::new(Second), Box::new(Unrelated), Box::new(First)]);
        // Second waits for First, so Unrelated (25) runs before First (50)
        assert_eq!(
            plan.order(phases::SIMULATION),
            vec!["Unrelated", "First", "Second"]
        );
    }

    #[test]
    fn test_released_low_key_overtakes_waiting_system() {
        test_system!(Gate, Schedule::new().order(0));
        test_system!(Fast, Schedule::new().order(1).after::<Gate>());
        test_system!(Slow, Schedule::new().order(5));

        let plan = plan_of(vec![Box::new(Slow), Box::new(Fast), Box::new(Gate)]);
        assert_eq!(plan.order(phases::SIMULATION), vec!["Gate", "Fast", "Slow"]);
    }

    #[test]
    fn test_order_is_independent_of_registration() {
        test_system!(Alpha, Schedule::new().order(3));
        test_system!(Beta, Schedule::new().order(1));
        test_system!(Gamma, Schedule::new().order(2));

        let forward = plan_of(vec![Box::new(Alpha), Box::new(Beta), Box::new(Gamma)]);
        let backward = plan_of(vec![Box::new(Gamma), Box::new(Beta), Box::new(Alpha)]);
        assert_eq!(forward.order(phases::SIMULATION), vec!["Beta", "Gamma", "Alpha"]);
        assert_eq!(
            forward.order(phases::SIMULATION),
            backward.order(phases::SIMULATION)
        );
    }

    #[test]
    fn test_sub_group_only_breaks_ties() {
        test_system!(Plain, Schedule::new().order(1));
        test_system!(Zeta, Schedule::new().order(1).sub_group("a"));
        test_system!(Eta, Schedule::new().order(1).sub_group("b"));
        test_system!(Later, Schedule::new().order(2).sub_group("a"));
        test_system!(Sooner, Schedule::new().order(0).sub_group("z"));

        let plan = plan_of(vec![
            Box::new(Later),
            Box::new(Eta),
            Box::new(Zeta),
            Box::new(Plain),
            Box::new(Sooner),
        ]);
        assert_eq!(
            plan.order(phases::SIMULATION),
            vec!["Sooner", "Plain", "Zeta", "Eta", "Later"]
        );
    }

    #[test]
    fn test_cross_phase_dependency_is_conflict() {
        test_system!(X, Schedule::new().in_phase(SIM).before::<Y>());
        test_system!(Y, Schedule::new().in_phase(PRESENT));

        let plan = plan_of(vec![Box::new(X), Box::new(Y)]);

        assert_eq!(
            plan.errors(),
            &[EcsError::SchedulingConflict {
                system: "X".to_string(),
                target: "Y".to_string(),
                system_phase: "Sim".to_string(),
                target_phase: "Present".to_string(),
            }]
        );
        assert_eq!(plan.order(SIM), vec!["X"]);
        assert_eq!(plan.order(PRESENT), vec!["Y"]);
    }

    #[test]
    fn test_cycle_falls_back_to_order_key() {
        test_system!(P, Schedule::new().after::<Q>());
        test_system!(Q, Schedule::new().after::<P>());

        let plan = plan_of(vec![Box::new(Q), Box::new(P)]);

        assert_eq!(plan.errors().len(), 1);
        match &plan.errors()[0] {
            EcsError::SchedulingCycle { phase, stuck } => {
                assert_eq!(phase, "Simulation");
                assert_eq!(stuck, &vec![("P".to_string(), 1), ("Q".to_string(), 1)]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(plan.order(phases::SIMULATION), vec!["P", "Q"]);
    }

    #[test]
    fn test_cycle_keeps_acyclic_prefix() {
        test_system!(Setup, Schedule::new().order(10));
        test_system!(Left, Schedule::new().order(2).after::<Right>().after::<Setup>());
        test_system!(Right, Schedule::new().order(1).after::<Left>());

        let plan = plan_of(vec![Box::new(Left), Box::new(Right), Box::new(Setup)]);

        assert_eq!(plan.errors().len(), 1);
        assert_eq!(
            plan.order(phases::SIMULATION),
            vec!["Setup", "Right", "Left"]
        );
    }

    #[test]
    fn test_unknown_target_and_self_dependency_warn() {
        struct Missing;
        test_system!(Lonely, Schedule::new().after::<Missing>().before::<Lonely>());

        let plan = plan_of(vec![Box::new(Lonely)]);

        assert!(!plan.has_errors());
        assert_eq!(plan.warnings().len(), 2);
        assert!(plan.warnings().iter().any(|w| w.contains("not registered")));
        assert!(plan.warnings().iter().any(|w| w.contains("itself")));
        assert_eq!(plan.order(phases::SIMULATION), vec!["Lonely"]);
    }

    #[test]
    fn test_duplicate_system_is_dropped() {
        test_system!(Twice, Schedule::new());

        let plan = plan_of(vec![Box::new(Twice), Box::new(Twice)]);
        assert_eq!(plan.system_count(), 1);
        assert_eq!(plan.warnings().len(), 1);
        assert!(plan.warnings()[0].contains("more than once"));
    }

    #[test]
    fn test_many_systems() {
        struct Numbered(usize);

        impl System for Numbered {
            fn run(&mut self, _world: &mut World, _dt: f32) -> SystemResult {
                Ok(())
            }

            fn name(&self) -> &str {
                "Numbered"
            }
        }

        // same type: only the first instance survives
        let systems: Vec<Box<dyn System>> =
            (0..100).map(|i| Box::new(Numbered(i)) as Box<dyn System>).collect();
        let plan = plan_of(systems);
        assert_eq!(plan.system_count(), 1);
        assert_eq!(plan.warnings().len(), 99);
    }

    #[test]
    fn test_descriptor_metadata() {
        test_system!(Described, Schedule::new().in_phase(PRESENT).order(7).sub_group("hud"));

        let plan = plan_of(vec![Box::new(Described)]);
        let planned = &plan.phase(PRESENT)[0];
        let descriptor = planned.descriptor();
        assert_eq!(descriptor.phase(), PRESENT);
        assert_eq!(descriptor.key().order(), 7);
        assert_eq!(descriptor.key().sub_group(), Some("hud"));
        assert_eq!(descriptor.id(), SystemId::of::<Described>());
        assert_eq!(planned.system().name(), "Described");
        assert!(plan.phase(SIM).is_empty());
    }
}
