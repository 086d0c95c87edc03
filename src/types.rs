use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use crate::RouterId;

/// Path cost. `Infinite` is the "no known path" sentinel and sorts after every finite cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cost {
    Finite(i64),
    Infinite,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0);

    pub fn is_infinite(&self) -> bool {
        matches!(self, Cost::Infinite)
    }

    pub fn is_finite(&self) -> bool {
        !self.is_infinite()
    }

    /// Adds a link cost, saturating to `Infinite` instead of wrapping.
    pub fn saturating_add_link(self, link_cost: i64) -> Cost {
        match self {
            Cost::Finite(v) => v.checked_add(link_cost).map_or(Cost::Infinite, Cost::Finite),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match rhs {
            Cost::Finite(v) => self.saturating_add_link(v),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cost::Finite(a), Cost::Finite(b)) => a.cmp(b),
            (Cost::Finite(_), Cost::Infinite) => Ordering::Less,
            (Cost::Infinite, Cost::Finite(_)) => Ordering::Greater,
            (Cost::Infinite, Cost::Infinite) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Cost {
    fn from(value: i64) -> Self {
        Cost::Finite(value)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(v) => write!(f, "{}", v),
            Cost::Infinite => write!(f, "∞"),
        }
    }
}

// Finite costs are plain JSON numbers, infinity is the string "inf".
impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cost::Finite(v) => serializer.serialize_i64(*v),
            Cost::Infinite => serializer.serialize_str("inf"),
        }
    }
}

/// One routing table row: how much it costs to reach a destination and which
/// neighbor to hand traffic to. `next_hop == None` is the "none" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub cost: Cost,
    pub next_hop: Option<RouterId>,
}

impl RouteEntry {
    pub fn new(cost: Cost, next_hop: impl Into<RouterId>) -> Self {
        Self {
            cost,
            next_hop: Some(next_hop.into()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            cost: Cost::Infinite,
            next_hop: None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.cost.is_finite() && self.next_hop.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    #[default]
    DistanceVector,
    LinkState,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::DistanceVector => write!(f, "Distance Vector"),
            AlgorithmKind::LinkState => write!(f, "Link State"),
        }
    }
}

/// Canvas coordinates of a router, kept for the editor that draws the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, x: i32, y: i32) -> f64 {
        let dx = f64::from(self.x) - f64::from(x);
        let dy = f64::from(self.y) - f64::from(y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_sorts_after_finite() {
        assert!(Cost::Finite(i64::MAX) < Cost::Infinite);
        assert!(Cost::Finite(-3) < Cost::Finite(2));
        assert_eq!(Cost::Infinite.cmp(&Cost::Infinite), Ordering::Equal);
    }

    #[test]
    fn addition_saturates_instead_of_wrapping() {
        assert_eq!(Cost::Finite(i64::MAX).saturating_add_link(1), Cost::Infinite);
        assert_eq!(Cost::Finite(i64::MIN).saturating_add_link(-1), Cost::Infinite);
        assert_eq!(Cost::Infinite.saturating_add_link(-5), Cost::Infinite);
        assert_eq!(Cost::Finite(2) + Cost::Finite(3), Cost::Finite(5));
        assert_eq!(Cost::Finite(2) + Cost::Infinite, Cost::Infinite);
    }

    #[test]
    fn cost_serializes_as_number_or_inf() {
        assert_eq!(serde_json::to_string(&Cost::Finite(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Cost::Infinite).unwrap(), "\"inf\"");
    }

    #[test]
    fn unreachable_entry_has_no_next_hop() {
        let entry = RouteEntry::unreachable();
        assert!(!entry.is_reachable());
        assert_eq!(entry.next_hop, None);
        assert!(RouteEntry::new(Cost::Finite(1), "B").is_reachable());
    }

    #[test]
    fn position_distance() {
        assert_eq!(Position::new(0, 0).distance_to(3, 4), 5.0);
    }
}
