use log::{debug, info, warn};
use std::collections::{HashMap, HashSet, VecDeque};

use super::{Link, NodeId, Router};
use crate::RouterId;
use crate::error::TopologyError;
use crate::routing_table::RoutingTable;
use crate::types::{Cost, Position, RouteEntry};

/// The network being simulated: routers in insertion order plus the undirected
/// links between them.
///
/// Every link's endpoints exist, there is at most one link per router pair and
/// each router's adjacency mirrors the link list.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    routers: Vec<Router>,
    links: Vec<Link>,
    index: HashMap<NodeId, usize>,
    next_id: u32,
    name_counter: u32,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a router, or returns the existing one if the name is taken.
    pub fn add_router(&mut self, name: &str, position: Position) -> &Router {
        if let Some(idx) = self.position_of(name) {
            debug!("Router {} already exists", name);
            return &self.routers[idx];
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.routers.len());
        self.routers.push(Router::new(id, name.to_string(), position));
        info!("Added router {} at ({}, {})", name, position.x, position.y);

        let last = self.routers.len() - 1;
        &self.routers[last]
    }

    /// Removes a router together with every link touching it. No-op for unknown names.
    pub fn remove_router(&mut self, name: &str) -> Option<Router> {
        let idx = self.position_of(name)?;
        let id = self.routers[idx].id();

        let before = self.links.len();
        self.links.retain(|link| !link.touches(id));
        for router in &mut self.routers {
            router.remove_neighbor(id);
            let table = router.routing_table_mut();
            table.remove_route(name);
            table.remove_routes_via(name);
        }

        let removed = self.routers.remove(idx);
        self.rebuild_index();
        info!(
            "Removed router {} and {} link(s)",
            name,
            before - self.links.len()
        );
        Some(removed)
    }

    /// Links two routers, or updates the cost if they are already linked.
    pub fn add_link(&mut self, a: &str, b: &str, cost: i64) -> Result<Link, TopologyError> {
        if a == b {
            warn!("Rejected self-link on {}", a);
            return Err(TopologyError::SelfLoop(a.to_string()));
        }
        let ia = self
            .position_of(a)
            .ok_or_else(|| TopologyError::UnknownNode(a.to_string()))?;
        let ib = self
            .position_of(b)
            .ok_or_else(|| TopologyError::UnknownNode(b.to_string()))?;
        let (id_a, id_b) = (self.routers[ia].id(), self.routers[ib].id());

        self.routers[ia].add_neighbor(id_b, cost);
        self.routers[ib].add_neighbor(id_a, cost);

        if let Some(link) = self.links.iter_mut().find(|l| l.connects(id_a, id_b)) {
            debug!("Updating link {} - {} cost {} -> {}", a, b, link.cost(), cost);
            link.set_cost(cost);
            return Ok(*link);
        }

        let link = Link::new(id_a, id_b, cost);
        self.links.push(link);
        info!("Added link {} - {} cost {}", a, b, cost);
        Ok(link)
    }

    /// Removes the link between two routers. No-op if either name or the link is unknown.
    pub fn remove_link(&mut self, a: &str, b: &str) -> Option<Link> {
        let ia = self.position_of(a)?;
        let ib = self.position_of(b)?;
        let (id_a, id_b) = (self.routers[ia].id(), self.routers[ib].id());

        let pos = self.links.iter().position(|l| l.connects(id_a, id_b))?;
        let link = self.links.remove(pos);
        self.routers[ia].remove_neighbor(id_b);
        self.routers[ib].remove_neighbor(id_a);
        let dropped = self.routers[ia].routing_table_mut().remove_routes_via(b)
            + self.routers[ib].routing_table_mut().remove_routes_via(a);
        info!("Removed link {} - {} ({} stale route(s) dropped)", a, b, dropped);
        Some(link)
    }

    pub fn router(&self, name: &str) -> Option<&Router> {
        self.routers.iter().find(|r| r.name() == name)
    }

    pub fn router_by_id(&self, id: NodeId) -> Option<&Router> {
        self.index.get(&id).map(|&idx| &self.routers[idx])
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.router_by_id(id).map(Router::name)
    }

    /// Position of a router in insertion order.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Symmetric lookup: `find_link(a, b) == find_link(b, a)`.
    pub fn find_link(&self, a: &str, b: &str) -> Option<&Link> {
        let id_a = self.router(a)?.id();
        let id_b = self.router(b)?.id();
        self.links.iter().find(|l| l.connects(id_a, id_b))
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Names and link costs of a router's direct neighbors.
    pub fn neighbors(&self, name: &str) -> Vec<(&str, i64)> {
        let Some(router) = self.router(name) else {
            return Vec::new();
        };
        router
            .neighbors()
            .iter()
            .filter_map(|(&id, &cost)| self.name_of(id).map(|n| (n, cost)))
            .collect()
    }

    pub fn set_position(&mut self, name: &str, position: Position) -> Result<(), TopologyError> {
        let idx = self
            .position_of(name)
            .ok_or_else(|| TopologyError::UnknownNode(name.to_string()))?;
        self.routers[idx].set_position(position);
        Ok(())
    }

    /// First router (in insertion order) within `radius` of the point.
    pub fn router_at(&self, x: i32, y: i32, radius: f64) -> Option<&Router> {
        self.routers
            .iter()
            .find(|r| r.position().distance_to(x, y) <= radius)
    }

    /// Next free auto-generated name: `R1`, `R2`, ... skipping names already in use.
    pub fn next_router_name(&mut self, prefix: &str) -> RouterId {
        loop {
            self.name_counter += 1;
            let candidate = format!("{}{}", prefix, self.name_counter);
            if self.position_of(&candidate).is_none() {
                return candidate;
            }
        }
    }

    pub fn clear(&mut self) {
        self.routers.clear();
        self.links.clear();
        self.index.clear();
        info!("Topology cleared");
    }

    /// Resets every router to its own entry plus one-hop routes to its direct neighbors.
    pub fn reset_routing_tables(&mut self) {
        let seeds: Vec<RoutingTable> = self
            .routers
            .iter()
            .map(|router| self.seeded_table(router))
            .collect();

        for (router, table) in self.routers.iter_mut().zip(seeds) {
            router.set_routing_table(table);
        }
        debug!("Reset routing tables of {} router(s)", self.routers.len());
    }

    /// Resets a single router's table the same way `reset_routing_tables` does.
    pub fn reset_routing_table(&mut self, name: &str) -> Result<(), TopologyError> {
        let idx = self
            .position_of(name)
            .ok_or_else(|| TopologyError::UnknownNode(name.to_string()))?;
        let table = self.seeded_table(&self.routers[idx]);
        self.routers[idx].set_routing_table(table);
        Ok(())
    }

    /// Breadth-first reachability from the first router. An empty topology is connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.routers.first() else {
            return true;
        };

        let mut visited = HashSet::from([start.id()]);
        let mut queue = VecDeque::from([start.id()]);

        while let Some(current) = queue.pop_front() {
            let Some(router) = self.router_by_id(current) else {
                continue;
            };
            for &neighbor in router.neighbors().keys() {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited.len() == self.routers.len()
    }

    pub(crate) fn routers_mut(&mut self) -> &mut [Router] {
        &mut self.routers
    }

    fn seeded_table(&self, router: &Router) -> RoutingTable {
        let mut table = RoutingTable::new(router.name());
        for (&id, &cost) in router.neighbors() {
            if let Some(name) = self.name_of(id) {
                table.add_route(name, RouteEntry::new(Cost::Finite(cost), name));
            }
        }
        table
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.routers.iter().position(|r| r.name() == name)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .routers
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id(), idx))
            .collect();
    }
}
