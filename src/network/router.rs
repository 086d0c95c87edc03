use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::RouterId;
use crate::routing_table::RoutingTable;
use crate::types::Position;

/// Stable arena handle for a router. Handles are never reused inside one topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulated router: its name, where it sits on the canvas, its direct links
/// and the routing table the engines write into.
#[derive(Debug, Clone)]
pub struct Router {
    id: NodeId,
    name: RouterId,
    position: Position,
    neighbors: BTreeMap<NodeId, i64>,
    routing_table: RoutingTable,
}

impl Router {
    pub(crate) fn new(id: NodeId, name: RouterId, position: Position) -> Self {
        let routing_table = RoutingTable::new(name.clone());
        Self {
            id,
            name,
            position,
            neighbors: BTreeMap::new(),
            routing_table,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Direct neighbors and the cost of the link to each.
    pub fn neighbors(&self) -> &BTreeMap<NodeId, i64> {
        &self.neighbors
    }

    pub fn link_cost(&self, id: NodeId) -> Option<i64> {
        self.neighbors.get(&id).copied()
    }

    pub(crate) fn add_neighbor(&mut self, id: NodeId, cost: i64) {
        self.neighbors.insert(id, cost);
    }

    pub(crate) fn remove_neighbor(&mut self, id: NodeId) -> Option<i64> {
        self.neighbors.remove(&id)
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub(crate) fn routing_table_mut(&mut self) -> &mut RoutingTable {
        &mut self.routing_table
    }

    pub(crate) fn set_routing_table(&mut self, table: RoutingTable) {
        self.routing_table = table;
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
