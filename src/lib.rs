//! Routing table simulation over a small editable topology.
//!
//! Two engines compute per-router tables: Distance Vector (synchronous
//! Bellman-Ford rounds between neighbors) and Link State (Dijkstra from every
//! router over the full topology). A `SimulationController` steps them and
//! reports a snapshot of all tables after every step.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod routing_table;
pub mod simulation;
pub mod types;

pub type RouterId = String;

pub use config::SimulationConfig;
pub use error::{ConfigError, SimulationError, TopologyError};
pub use network::{Link, NodeId, Router, Topology};
pub use routing_table::RoutingTable;
pub use simulation::{ControllerState, RunState, SimulationController, Snapshot, StepOutcome};
pub use types::{AlgorithmKind, Cost, Position, RouteEntry};
