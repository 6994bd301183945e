use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;

/// How an edge was discovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    DatabaseFk,
    ViewSource,
    SmartFk,
    SemanticMatch,
    CardinalityMatch,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::DatabaseFk => "database_fk",
            EdgeKind::ViewSource => "view_source",
            EdgeKind::SmartFk => "smart_fk",
            EdgeKind::SemanticMatch => "semantic_match",
            EdgeKind::CardinalityMatch => "cardinality_match",
        }
    }
}

/// Categorical reliability label for an edge.
///
/// `Absolute` is reserved for edges backed by a real database constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Absolute,
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Absolute => "absolute",
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

/// Per-method match evidence attached to an edge.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EdgeDetails {
    DatabaseFk {
        constraint: Option<String>,
    },
    ViewSource {
        overlap_count: usize,
        overlap_ratio: f64,
        matched_columns: Vec<String>,
    },
    SmartFk {
        matched_entity: String,
        referenced_key: String,
        exact: bool,
    },
    SemanticMatch {
        matched_name: String,
        edit_distance: usize,
    },
    Cardinality {
        child_distinct: i64,
        parent_distinct: i64,
        range_contained: bool,
    },
}

/// Directed dependency relationship between two assets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineageEdge {
    pub from_asset_id: AssetId,
    pub to_asset_id: AssetId,
    /// Column on the referencing side, when the match is column-scoped.
    pub from_column: Option<String>,
    /// Column on the referenced side, when the match is column-scoped.
    pub to_column: Option<String>,
    pub kind: EdgeKind,
    /// Normalized confidence in `0..=100`.
    pub score: u8,
    pub tier: ConfidenceTier,
    pub details: EdgeDetails,
}

impl LineageEdge {
    /// Deduplication key: at most one edge may exist per key.
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from_asset_id: self.from_asset_id,
            to_asset_id: self.to_asset_id,
            from_column: self.from_column.clone(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from_asset_id == self.to_asset_id
    }
}

/// The `(from_asset, to_asset, from_column)` triple an edge is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub from_asset_id: AssetId,
    pub to_asset_id: AssetId,
    pub from_column: Option<String>,
}
