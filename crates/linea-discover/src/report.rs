use std::collections::BTreeMap;

use serde::Serialize;

use linea_core::{DataSourceId, LineageEdge};

use crate::orchestrator::RunState;

/// Structured summary of one discovery run.
///
/// Produced for completed, failed, and cancelled runs alike; `state` names
/// the stage the run reached.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub run_id: String,
    pub data_source_id: DataSourceId,
    pub state: RunState,
    pub edges_created: u64,
    pub by_kind: BTreeMap<String, u64>,
    pub by_tier: BTreeMap<String, u64>,
    pub skipped_tables: Vec<String>,
    pub suppressed_edges: u64,
    pub upgraded_edges: u64,
    pub duration_ms: u128,
    pub error: Option<String>,
}

/// Count edges per kind and per tier.
pub(crate) fn tally(edges: &[LineageEdge]) -> (BTreeMap<String, u64>, BTreeMap<String, u64>) {
    let mut by_kind = BTreeMap::new();
    let mut by_tier = BTreeMap::new();
    for edge in edges {
        *by_kind.entry(edge.kind.as_str().to_string()).or_insert(0) += 1;
        *by_tier.entry(edge.tier.as_str().to_string()).or_insert(0) += 1;
    }
    (by_kind, by_tier)
}
