use log::{debug, info, warn};

use crate::network::Topology;
use crate::routing_table::RoutingTable;
use crate::types::RouteEntry;

pub const DEFAULT_ITERATION_FACTOR: usize = 10;

/// Bellman-Ford style table exchange, one synchronous round per iteration.
///
/// The engine keeps only the round counter and the convergence flag; routing
/// state lives in the topology it is handed on every call.
#[derive(Debug, Clone)]
pub struct DistanceVector {
    converged: bool,
    iteration: usize,
    iteration_factor: usize,
}

impl Default for DistanceVector {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceVector {
    pub fn new() -> Self {
        Self::with_iteration_factor(DEFAULT_ITERATION_FACTOR)
    }

    pub fn with_iteration_factor(iteration_factor: usize) -> Self {
        Self {
            converged: false,
            iteration: 0,
            iteration_factor,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Round budget for a run over `topology`: `factor × router count`.
    pub fn max_iterations(&self, topology: &Topology) -> usize {
        self.iteration_factor.saturating_mul(topology.router_count())
    }

    pub fn restart(&mut self) {
        self.converged = false;
        self.iteration = 0;
    }

    /// Runs one round and commits it. Returns whether the network has converged.
    pub fn run_iteration(&mut self, topology: &mut Topology) -> bool {
        if topology.is_empty() {
            self.converged = true;
            return true;
        }

        self.iteration += 1;
        let (tables, changed) = relax_round(topology);

        for (router, table) in topology.routers_mut().iter_mut().zip(tables) {
            router.set_routing_table(table);
        }

        self.converged = !changed;
        debug!(
            "Distance vector round {}: {}",
            self.iteration,
            if changed { "tables changed" } else { "stable" }
        );
        self.converged
    }

    /// Resets all tables and steps until convergence or the round budget runs out.
    pub fn run_until_convergence(&mut self, topology: &mut Topology) -> bool {
        self.restart();
        topology.reset_routing_tables();

        if topology.is_empty() {
            self.converged = true;
            return true;
        }

        let max_iterations = self.max_iterations(topology);
        while !self.converged && self.iteration < max_iterations {
            self.run_iteration(topology);
        }

        if self.converged {
            info!("Distance vector converged after {} round(s)", self.iteration);
        } else {
            warn!(
                "Distance vector stopped after {} round(s) without converging",
                self.iteration
            );
        }
        self.converged
    }
}

/// Computes every router's next table from its neighbors' current tables.
///
/// All routers read pre-round data; nothing is written to the topology. Returns the
/// candidate tables in topology order and whether any cost improved.
pub fn relax_round(topology: &Topology) -> (Vec<RoutingTable>, bool) {
    let mut changed = false;
    let mut tables = Vec::with_capacity(topology.router_count());

    for router in topology.routers() {
        let mut candidate = router.routing_table().clone();

        for other in topology.routers() {
            if !candidate.contains(other.name()) {
                candidate.add_route(other.name(), RouteEntry::unreachable());
            }
        }

        for (&neighbor_id, &link_cost) in router.neighbors() {
            let Some(neighbor) = topology.router_by_id(neighbor_id) else {
                continue;
            };

            for (destination, advertised) in neighbor.routing_table().iter() {
                if destination == router.name() || advertised.cost.is_infinite() {
                    continue;
                }
                let new_cost = advertised.cost.saturating_add_link(link_cost);
                if candidate.offer_route(destination, new_cost, neighbor.name()) {
                    changed = true;
                }
            }
        }

        tables.push(candidate);
    }

    (tables, changed)
}
