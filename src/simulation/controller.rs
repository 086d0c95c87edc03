use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::snapshot::Snapshot;
use crate::RouterId;
use crate::algorithms::{DistanceVector, LinkState};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::network::Topology;
use crate::types::AlgorithmKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Idle,
    Running,
    Converged,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No run is active.
    Idle,
    /// A round was committed and more are needed.
    Progressed,
    /// The run finished; the completion callback has fired.
    Converged,
    /// The round budget ran out before the tables settled.
    Exhausted,
}

/// Bookkeeping for the current (or most recent) run.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub run_id: Uuid,
    pub algorithm: AlgorithmKind,
    pub source: Option<RouterId>,
    pub iteration: usize,
    pub max_iterations: usize,
    pub converged: bool,
    pub started_at: DateTime<Utc>,
}

type UpdateCallback = Box<dyn FnMut(&Snapshot) + Send>;
type CompleteCallback = Box<dyn FnMut(&RunState) + Send>;

/// Drives one routing engine at a time over the topology it owns.
///
/// The controller never sleeps: whoever owns the clock calls `step` once per tick.
/// While a run is `Running` the topology can only be read.
pub struct SimulationController {
    topology: Topology,
    state: ControllerState,
    run: Option<RunState>,
    distance_vector: DistanceVector,
    link_state: LinkState,
    last_snapshot: Option<Snapshot>,
    paths_ready: bool,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl SimulationController {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            state: ControllerState::Idle,
            run: None,
            distance_vector: DistanceVector::new(),
            link_state: LinkState::new(),
            last_snapshot: None,
            paths_ready: false,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn with_config(
        topology: Topology,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let mut controller = Self::new(topology);
        controller.distance_vector =
            DistanceVector::with_iteration_factor(config.iteration_factor()?);
        Ok(controller)
    }

    pub fn on_update(&mut self, callback: impl FnMut(&Snapshot) + Send + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    pub fn on_complete(&mut self, callback: impl FnMut(&RunState) + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Begins a run, stopping any active one first.
    ///
    /// Link state needs a source; without one the first router is used. Distance
    /// vector computes every table at once and only records the source.
    pub fn start(
        &mut self,
        algorithm: AlgorithmKind,
        source: Option<&str>,
    ) -> Result<Uuid, SimulationError> {
        if self.is_running() {
            self.stop();
        }

        let first = self
            .topology
            .routers()
            .first()
            .ok_or(SimulationError::EmptyTopology)?;

        let source = match source {
            Some(name) if self.topology.router(name).is_none() => {
                return Err(SimulationError::UnknownSource(name.to_string()));
            }
            Some(name) => Some(name.to_string()),
            None if algorithm == AlgorithmKind::LinkState => Some(first.name().to_string()),
            None => None,
        };

        if !self.topology.is_connected() {
            info!("Topology is not connected, some routers will stay unreachable");
        }

        self.topology.reset_routing_tables();
        self.distance_vector.restart();
        self.paths_ready = false;
        self.last_snapshot = None;

        let max_iterations = match algorithm {
            AlgorithmKind::DistanceVector => self.distance_vector.max_iterations(&self.topology),
            AlgorithmKind::LinkState => 1,
        };
        let run = RunState {
            run_id: Uuid::new_v4(),
            algorithm,
            source,
            iteration: 0,
            max_iterations,
            converged: false,
            started_at: Utc::now(),
        };

        info!(
            "Starting {} run {} over {} router(s) (source: {})",
            algorithm,
            run.run_id,
            self.topology.router_count(),
            run.source.as_deref().unwrap_or("all")
        );
        let run_id = run.run_id;
        self.run = Some(run);
        self.state = ControllerState::Running;
        Ok(run_id)
    }

    /// Advances the active run by one tick.
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        if self.state != ControllerState::Running {
            return Ok(StepOutcome::Idle);
        }
        let Some(algorithm) = self.run.as_ref().map(|r| r.algorithm) else {
            self.state = ControllerState::Idle;
            return Ok(StepOutcome::Idle);
        };

        match algorithm {
            AlgorithmKind::DistanceVector => Ok(self.step_distance_vector()),
            AlgorithmKind::LinkState => self.step_link_state(),
        }
    }

    /// Steps until the run is no longer `Running`.
    pub fn run_to_completion(&mut self) -> Result<StepOutcome, SimulationError> {
        let mut outcome = StepOutcome::Idle;
        while self.is_running() {
            outcome = self.step()?;
        }
        Ok(outcome)
    }

    /// Halts the run before the next tick. Tables computed so far are kept.
    pub fn stop(&mut self) {
        if self.state == ControllerState::Running {
            self.state = ControllerState::Stopped;
            if let Some(run) = &self.run {
                info!("Stopped run {} after {} step(s)", run.run_id, run.iteration);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable access for editing; refused while a run is active.
    pub fn topology_mut(&mut self) -> Result<&mut Topology, SimulationError> {
        if self.is_running() {
            warn!("Rejected topology edit during an active run");
            return Err(SimulationError::Busy);
        }
        self.paths_ready = false;
        Ok(&mut self.topology)
    }

    /// Path from `source` to `destination` using the tables of the last link state run.
    pub fn shortest_path(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Vec<RouterId>, SimulationError> {
        if !self.paths_ready {
            return Err(SimulationError::PathUnavailable);
        }
        Ok(self
            .link_state
            .shortest_path(&self.topology, source, destination)?)
    }

    fn step_distance_vector(&mut self) -> StepOutcome {
        let Some(max_iterations) = self.run.as_ref().map(|r| r.max_iterations) else {
            return StepOutcome::Idle;
        };

        if self.distance_vector.iteration() >= max_iterations {
            return self.exhaust();
        }

        let converged = self.distance_vector.run_iteration(&mut self.topology);
        let iteration = self.distance_vector.iteration();
        if let Some(run) = self.run.as_mut() {
            run.iteration = iteration;
        }
        debug!("Distance vector step {} committed", iteration);
        self.emit_snapshot();

        if converged {
            self.complete()
        } else if iteration >= max_iterations {
            self.exhaust()
        } else {
            StepOutcome::Progressed
        }
    }

    fn step_link_state(&mut self) -> Result<StepOutcome, SimulationError> {
        let source = self.run.as_ref().and_then(|r| r.source.clone());
        let Some(source) = source else {
            self.state = ControllerState::Stopped;
            return Err(SimulationError::EmptyTopology);
        };

        let computed = self
            .link_state
            .run(&mut self.topology, &source)
            .and_then(|_| self.link_state.run_for_all_routers(&mut self.topology));
        if let Err(e) = computed {
            warn!("Link state computation failed: {}", e);
            self.state = ControllerState::Stopped;
            return Err(e.into());
        }

        if let Some(run) = self.run.as_mut() {
            run.iteration = 1;
        }
        self.paths_ready = true;
        self.emit_snapshot();
        Ok(self.complete())
    }

    fn emit_snapshot(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        let snapshot = Snapshot::capture(&self.topology, run.run_id, run.algorithm, run.iteration);
        if let Some(callback) = self.on_update.as_mut() {
            callback(&snapshot);
        }
        self.last_snapshot = Some(snapshot);
    }

    fn complete(&mut self) -> StepOutcome {
        self.state = ControllerState::Converged;
        let Some(run) = self.run.as_mut() else {
            return StepOutcome::Converged;
        };
        run.converged = true;
        info!(
            "{} run {} completed after {} step(s)",
            run.algorithm, run.run_id, run.iteration
        );
        if let Some(callback) = self.on_complete.as_mut() {
            callback(&*run);
        }
        StepOutcome::Converged
    }

    fn exhaust(&mut self) -> StepOutcome {
        self.state = ControllerState::Stopped;
        if let Some(run) = &self.run {
            warn!(
                "Run {} hit its bound of {} round(s) without converging",
                run.run_id, run.max_iterations
            );
        }
        StepOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cost, Position};
    use std::sync::{Arc, Mutex};

    fn build(links: &[(&str, &str, i64)], names: &[&str]) -> Topology {
        let mut topo = Topology::new();
        for name in names {
            topo.add_router(name, Position::default());
        }
        for (a, b, c) in links {
            topo.add_link(a, b, *c).unwrap();
        }
        topo
    }

    #[test]
    fn distance_vector_emits_snapshot_per_step_and_one_completion() {
        let topo = build(&[("A", "B", 1), ("B", "C", 1)], &["A", "B", "C"]);
        let mut sim = SimulationController::new(topo);

        let updates = Arc::new(Mutex::new(Vec::new()));
        let completions = Arc::new(Mutex::new(0));
        let u = updates.clone();
        sim.on_update(move |s| u.lock().unwrap().push(s.iteration));
        let c = completions.clone();
        sim.on_complete(move |_| *c.lock().unwrap() += 1);

        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        assert_eq!(sim.step().unwrap(), StepOutcome::Progressed);
        assert_eq!(sim.step().unwrap(), StepOutcome::Converged);
        assert_eq!(sim.step().unwrap(), StepOutcome::Idle);

        assert_eq!(*updates.lock().unwrap(), vec![1, 2]);
        assert_eq!(*completions.lock().unwrap(), 1);
        assert_eq!(sim.state(), ControllerState::Converged);
        assert!(sim.run().unwrap().converged);
    }

    #[test]
    fn link_state_finishes_in_one_step() {
        let topo = build(
            &[("A", "B", 5), ("B", "C", 3), ("A", "C", 1)],
            &["A", "B", "C"],
        );
        let mut sim = SimulationController::new(topo);
        let completions = Arc::new(Mutex::new(0));
        let c = completions.clone();
        sim.on_complete(move |_| *c.lock().unwrap() += 1);

        sim.start(AlgorithmKind::LinkState, Some("A")).unwrap();
        assert_eq!(sim.run_to_completion().unwrap(), StepOutcome::Converged);
        assert_eq!(*completions.lock().unwrap(), 1);

        let snapshot = sim.last_snapshot().unwrap();
        let a = snapshot.table("A").unwrap();
        assert_eq!(a.cost_to("B"), Cost::Finite(4));
        assert_eq!(a.next_hop("B"), Some("C"));
        assert_eq!(sim.shortest_path("A", "B").unwrap(), vec!["A", "C", "B"]);
    }

    #[test]
    fn link_state_defaults_to_first_router() {
        let topo = build(&[("A", "B", 1)], &["A", "B"]);
        let mut sim = SimulationController::new(topo);
        sim.start(AlgorithmKind::LinkState, None).unwrap();
        assert_eq!(sim.run().unwrap().source.as_deref(), Some("A"));
    }

    #[test]
    fn start_rejects_bad_input() {
        let mut sim = SimulationController::new(Topology::new());
        assert_eq!(
            sim.start(AlgorithmKind::DistanceVector, None),
            Err(SimulationError::EmptyTopology)
        );

        let mut sim = SimulationController::new(build(&[], &["A"]));
        assert_eq!(
            sim.start(AlgorithmKind::LinkState, Some("Z")),
            Err(SimulationError::UnknownSource("Z".into()))
        );
        assert_eq!(sim.state(), ControllerState::Idle);
    }

    #[test]
    fn stop_keeps_tables_and_blocks_further_steps() {
        let topo = build(
            &[("A", "B", 1), ("B", "C", 1), ("C", "D", 1)],
            &["A", "B", "C", "D"],
        );
        let mut sim = SimulationController::new(topo);
        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        sim.step().unwrap();
        sim.stop();

        assert!(!sim.is_running());
        assert_eq!(sim.state(), ControllerState::Stopped);
        assert_eq!(sim.step().unwrap(), StepOutcome::Idle);
        let a = sim.topology().router("A").unwrap().routing_table();
        assert_eq!(a.cost_to("C"), Cost::Finite(2));
    }

    #[test]
    fn topology_is_locked_while_running() {
        let topo = build(&[("A", "B", 1)], &["A", "B"]);
        let mut sim = SimulationController::new(topo);
        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        assert!(matches!(sim.topology_mut(), Err(SimulationError::Busy)));

        sim.run_to_completion().unwrap();
        sim.topology_mut().unwrap().add_router("C", Position::default());
        assert_eq!(sim.topology().router_count(), 3);
    }

    #[test]
    fn restart_replaces_the_active_run() {
        let topo = build(&[("A", "B", 1), ("B", "C", 1)], &["A", "B", "C"]);
        let mut sim = SimulationController::new(topo);
        let first = sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        sim.step().unwrap();
        let second = sim.start(AlgorithmKind::LinkState, Some("B")).unwrap();

        assert_ne!(first, second);
        assert_eq!(sim.run().unwrap().iteration, 0);
        assert!(sim.is_running());
    }

    #[test]
    fn non_convergence_stops_without_completion() {
        let topo = build(
            &[("A", "B", -1), ("B", "C", -1), ("A", "C", -1)],
            &["A", "B", "C"],
        );
        let mut sim = SimulationController::new(topo);
        let completions = Arc::new(Mutex::new(0));
        let c = completions.clone();
        sim.on_complete(move |_| *c.lock().unwrap() += 1);

        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        assert_eq!(sim.run_to_completion().unwrap(), StepOutcome::Exhausted);

        let run = sim.run().unwrap();
        assert!(!run.converged);
        assert_eq!(run.iteration, run.max_iterations);
        assert_eq!(*completions.lock().unwrap(), 0);
        assert_eq!(sim.state(), ControllerState::Stopped);
    }

    #[test]
    fn zero_factor_exhausts_immediately() {
        let config = SimulationConfig {
            iteration_factor: 0,
            ..SimulationConfig::default()
        };
        let topo = build(&[("A", "B", 1)], &["A", "B"]);
        let mut sim = SimulationController::with_config(topo, &config).unwrap();
        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        assert_eq!(sim.step().unwrap(), StepOutcome::Exhausted);
        assert!(sim.last_snapshot().is_none());
    }

    #[test]
    fn paths_need_a_link_state_run() {
        let topo = build(&[("A", "B", 1)], &["A", "B"]);
        let mut sim = SimulationController::new(topo);
        assert_eq!(
            sim.shortest_path("A", "B"),
            Err(SimulationError::PathUnavailable)
        );
        sim.start(AlgorithmKind::DistanceVector, None).unwrap();
        sim.run_to_completion().unwrap();
        assert_eq!(
            sim.shortest_path("A", "B"),
            Err(SimulationError::PathUnavailable)
        );
    }
}
