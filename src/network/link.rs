use serde::Serialize;
use std::hash::{Hash, Hasher};

use super::NodeId;

/// Undirected weighted link. `Link(a, b)` and `Link(b, a)` are the same link.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Link {
    a: NodeId,
    b: NodeId,
    cost: i64,
}

impl Link {
    pub(crate) fn new(a: NodeId, b: NodeId, cost: i64) -> Self {
        Self { a, b, cost }
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    pub(crate) fn set_cost(&mut self, cost: i64) {
        self.cost = cost;
    }

    /// True if this link joins `x` and `y`, in either direction.
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }

    fn ordered(&self) -> (NodeId, NodeId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

// Equality and hashing ignore the cost and the endpoint order.
impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.connects(other.a, other.b)
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}
