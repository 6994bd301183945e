//! Lineage discovery pipeline.
//!
//! Combines authoritative FK constraints with naming, column-overlap, and
//! statistical heuristics to infer a deduplicated, confidence-scored
//! dependency graph for a data source.

pub mod accumulator;
pub mod config;
pub mod extract;
pub mod methods;
pub mod naming;
pub mod orchestrator;
pub mod report;
pub mod snapshot;

#[cfg(test)]
pub mod testkit;

pub use accumulator::EdgeAccumulator;
pub use config::DiscoverOptions;
pub use extract::{ExtractionOutcome, extract_foreign_keys};
pub use methods::{DiscoveryMethod, METHOD_ORDER};
pub use orchestrator::{CancelFlag, DiscoverError, DiscoveryOrchestrator, RunState};
pub use report::DiscoveryReport;
pub use snapshot::{MetadataSnapshot, is_system_asset};
