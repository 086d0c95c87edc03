use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::network::{NodeId, Topology};
use crate::types::Cost;

/// Result of one single-source Dijkstra run.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeId,
    distances: HashMap<NodeId, Cost>,
    previous: HashMap<NodeId, NodeId>,
}

#[derive(Debug)]
struct State {
    cost: Cost,
    order: usize,
    router: NodeId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.order == other.order
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap, earlier routers first on equal cost
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn shortest_path_tree(topology: &Topology, source: NodeId) -> ShortestPathTree {
    let mut distances: HashMap<NodeId, Cost> = topology
        .routers()
        .iter()
        .map(|r| (r.id(), Cost::Infinite))
        .collect();
    let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    distances.insert(source, Cost::ZERO);
    heap.push(State {
        cost: Cost::ZERO,
        order: topology.index_of(source).unwrap_or(0),
        router: source,
    });

    while let Some(State { cost, router, .. }) = heap.pop() {
        if !visited.insert(router) {
            continue;
        }
        let Some(current) = topology.router_by_id(router) else {
            continue;
        };

        for (&neighbor, &link_cost) in current.neighbors() {
            if visited.contains(&neighbor) {
                continue;
            }
            let new_cost = cost.saturating_add_link(link_cost);
            let known = distances.get(&neighbor).copied().unwrap_or(Cost::Infinite);

            if new_cost < known {
                distances.insert(neighbor, new_cost);
                previous.insert(neighbor, router);
                heap.push(State {
                    cost: new_cost,
                    order: topology.index_of(neighbor).unwrap_or(usize::MAX),
                    router: neighbor,
                });
            }
        }
    }

    ShortestPathTree {
        source,
        distances,
        previous,
    }
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn distance(&self, dest: NodeId) -> Cost {
        self.distances.get(&dest).copied().unwrap_or(Cost::Infinite)
    }

    pub fn predecessor(&self, dest: NodeId) -> Option<NodeId> {
        self.previous.get(&dest).copied()
    }

    /// The neighbor of the source that starts the path to `dest`.
    ///
    /// Walks the predecessor chain back until it reaches the source; the node just
    /// before the source is the first hop. `None` if `dest` is unreachable.
    pub fn first_hop(&self, dest: NodeId) -> Option<NodeId> {
        if dest == self.source {
            return Some(self.source);
        }

        let mut current = dest;
        for _ in 0..=self.previous.len() {
            let prev = self.previous.get(&current)?;
            if *prev == self.source {
                return Some(current);
            }
            current = *prev;
        }
        None
    }

    /// Routers from the source to `dest`, both included. Empty if unreachable.
    pub fn path_to(&self, dest: NodeId) -> Vec<NodeId> {
        if self.distance(dest).is_infinite() {
            return Vec::new();
        }

        let mut path = vec![dest];
        let mut current = dest;
        while let Some(prev) = self.previous.get(&current) {
            if path.contains(prev) {
                break;
            }
            path.push(*prev);
            current = *prev;
        }

        path.reverse();
        path
    }
}
