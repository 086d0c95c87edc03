use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::RouterId;
use crate::network::Topology;
use crate::routing_table::RoutingTable;
use crate::types::{AlgorithmKind, Cost};

/// One router's table as of the latest committed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterSnapshot {
    pub router: RouterId,
    pub routes: RoutingTable,
}

impl RouterSnapshot {
    pub fn costs(&self) -> BTreeMap<RouterId, Cost> {
        self.routes.costs()
    }

    pub fn next_hops(&self) -> BTreeMap<RouterId, RouterId> {
        self.routes.next_hops()
    }
}

/// Every router's table after a simulation step, in topology order.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub run_id: Uuid,
    pub algorithm: AlgorithmKind,
    pub iteration: usize,
    pub taken_at: DateTime<Utc>,
    pub routers: Vec<RouterSnapshot>,
}

impl Snapshot {
    pub fn capture(
        topology: &Topology,
        run_id: Uuid,
        algorithm: AlgorithmKind,
        iteration: usize,
    ) -> Self {
        let routers = topology
            .routers()
            .iter()
            .map(|r| RouterSnapshot {
                router: r.name().to_string(),
                routes: r.routing_table().clone(),
            })
            .collect();

        Self {
            run_id,
            algorithm,
            iteration,
            taken_at: Utc::now(),
            routers,
        }
    }

    pub fn table(&self, router: &str) -> Option<&RoutingTable> {
        self.routers
            .iter()
            .find(|r| r.router == router)
            .map(|r| &r.routes)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
