use log::{debug, info};
use std::collections::HashSet;

use super::dijkstra::shortest_path_tree;
use crate::RouterId;
use crate::error::TopologyError;
use crate::network::Topology;
use crate::types::RouteEntry;

/// Link state routing: every router knows the whole topology and runs Dijkstra
/// from itself. Link costs are expected to be non-negative.
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    source: Option<RouterId>,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of the last `run` call.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Recomputes `source`'s routing table from a shortest-path tree rooted at it.
    pub fn run(&mut self, topology: &mut Topology, source: &str) -> Result<(), TopologyError> {
        compute_routes(topology, source)?;
        self.source = Some(source.to_string());
        Ok(())
    }

    /// Every router computes its own table, as if each had flooded its link state.
    pub fn run_for_all_routers(&mut self, topology: &mut Topology) -> Result<(), TopologyError> {
        let names: Vec<RouterId> = topology
            .routers()
            .iter()
            .map(|r| r.name().to_string())
            .collect();

        for name in &names {
            compute_routes(topology, name)?;
        }
        info!("Link state tables computed for {} router(s)", names.len());
        Ok(())
    }

    /// Routers on the path from `source` to `destination`, both included.
    ///
    /// Starts at `source` and forwards hop by hop, each router contributing its own
    /// next hop toward `destination`. Stops at the destination, at a missing or
    /// "none" next hop, or on a repeated router; whatever was collected is returned.
    pub fn shortest_path(
        &self,
        topology: &Topology,
        source: &str,
        destination: &str,
    ) -> Result<Vec<RouterId>, TopologyError> {
        if topology.router(destination).is_none() {
            return Err(TopologyError::UnknownNode(destination.to_string()));
        }
        let mut current = topology
            .router(source)
            .ok_or_else(|| TopologyError::UnknownNode(source.to_string()))?;

        let mut path = vec![current.name().to_string()];
        let mut seen: HashSet<&str> = HashSet::from([current.name()]);

        while current.name() != destination {
            let Some(hop) = current.routing_table().next_hop(destination) else {
                break;
            };
            if hop == current.name() {
                break;
            }
            if !seen.insert(hop) {
                debug!("Loop at {} while tracing {} -> {}", hop, source, destination);
                break;
            }
            let Some(next) = topology.router(hop) else {
                break;
            };
            path.push(hop.to_string());
            current = next;
        }

        Ok(path)
    }
}

fn compute_routes(topology: &mut Topology, source: &str) -> Result<(), TopologyError> {
    topology.reset_routing_table(source)?;
    let source_id = topology
        .router(source)
        .map(|r| r.id())
        .ok_or_else(|| TopologyError::UnknownNode(source.to_string()))?;

    let tree = shortest_path_tree(topology, source_id);
    let mut routes = Vec::with_capacity(topology.router_count());

    for router in topology.routers() {
        if router.id() == source_id {
            continue;
        }
        let distance = tree.distance(router.id());
        let hop = tree
            .first_hop(router.id())
            .and_then(|id| topology.name_of(id));

        let entry = match hop {
            Some(hop) if distance.is_finite() => RouteEntry::new(distance, hop),
            _ => RouteEntry::unreachable(),
        };
        routes.push((router.name().to_string(), entry));
    }

    let idx = topology
        .index_of(source_id)
        .ok_or_else(|| TopologyError::UnknownNode(source.to_string()))?;
    let table = topology.routers_mut()[idx].routing_table_mut();
    for (destination, entry) in routes {
        table.add_route(destination, entry);
    }

    debug!("Link state table for {} has {} entries", source, table.len());
    Ok(())
}
