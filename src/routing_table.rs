use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::RouterId;
use crate::types::{Cost, RouteEntry};

/// Routes known by one router, keyed by destination name.
///
/// The owner's own entry (cost 0, next hop itself) is always present: `new`, `reset`
/// and `remove_route` all preserve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutingTable {
    #[serde(skip)]
    owner: RouterId,
    entries: BTreeMap<RouterId, RouteEntry>,
}

impl RoutingTable {
    pub fn new(owner: impl Into<RouterId>) -> Self {
        let owner = owner.into();
        let mut entries = BTreeMap::new();
        entries.insert(owner.clone(), RouteEntry::new(Cost::ZERO, owner.clone()));
        Self { owner, entries }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Drops everything but the self entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.insert(
            self.owner.clone(),
            RouteEntry::new(Cost::ZERO, self.owner.clone()),
        );
    }

    pub fn add_route(&mut self, destination: impl Into<RouterId>, entry: RouteEntry) {
        let destination = destination.into();
        if destination == self.owner {
            debug!("{}: ignoring route to itself", self.owner);
            return;
        }
        self.entries.insert(destination, entry);
    }

    /// Installs `cost` via `next_hop` only if it beats the current entry.
    pub fn offer_route(&mut self, destination: &str, cost: Cost, next_hop: &str) -> bool {
        if destination == self.owner {
            return false;
        }
        let current = self.cost_to(destination);
        if cost < current {
            self.entries
                .insert(destination.to_string(), RouteEntry::new(cost, next_hop));
            true
        } else {
            false
        }
    }

    pub fn remove_route(&mut self, destination: &str) -> Option<RouteEntry> {
        if destination == self.owner {
            return None;
        }
        self.entries.remove(destination)
    }

    /// Forgets every route forwarded through `hop`, returning how many were dropped.
    pub fn remove_routes_via(&mut self, hop: &str) -> usize {
        let owner = &self.owner;
        let before = self.entries.len();
        self.entries
            .retain(|dest, entry| dest == owner || entry.next_hop.as_deref() != Some(hop));
        before - self.entries.len()
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.entries.contains_key(destination)
    }

    /// Missing destinations cost `Infinite`.
    pub fn cost_to(&self, destination: &str) -> Cost {
        self.entries
            .get(destination)
            .map_or(Cost::Infinite, |entry| entry.cost)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&str> {
        self.entries
            .get(destination)
            .and_then(|entry| entry.next_hop.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouterId, &RouteEntry)> {
        self.entries.iter()
    }

    /// Destinations with a finite cost.
    pub fn reachable(&self) -> impl Iterator<Item = (&RouterId, &RouteEntry)> {
        self.entries.iter().filter(|(_, entry)| entry.is_reachable())
    }

    /// `destination -> cost` view of the table.
    pub fn costs(&self) -> BTreeMap<RouterId, Cost> {
        self.entries
            .iter()
            .map(|(dest, entry)| (dest.clone(), entry.cost))
            .collect()
    }

    /// `destination -> next hop` view of the table, `"-"` standing for no next hop.
    pub fn next_hops(&self) -> BTreeMap<RouterId, RouterId> {
        self.entries
            .iter()
            .map(|(dest, entry)| {
                let hop = entry.next_hop.clone().unwrap_or_else(|| "-".to_string());
                (dest.clone(), hop)
            })
            .collect()
    }
}
