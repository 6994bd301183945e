//! Core contracts for the Linea lineage-discovery engine.
//!
//! This crate defines the canonical asset/column/edge model, the shared
//! confidence lookup, and validation helpers used across the catalog,
//! discovery, and graph crates.

pub mod asset;
pub mod edge;
pub mod error;
pub mod redaction;
pub mod score;
pub mod validation;

pub use asset::{Asset, AssetId, AssetKind, Column, ColumnId, DataSourceId};
pub use edge::{ConfidenceTier, EdgeDetails, EdgeKey, EdgeKind, LineageEdge};
pub use error::{Error, Result};
pub use redaction::{redact_connection_string, RedactedConnection};
pub use score::{clamp_score, tier_for, MAX_SCORE};
pub use validation::validate_edges;

/// Current contract version for persisted graph artifacts.
pub const GRAPH_VERSION: &str = "0.1";
