use async_trait::async_trait;

use linea_core::{AssetId, Result};

/// Column statistics produced by the external profiling subsystem.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub distinct_count: i64,
    /// Fraction of rows with a null value, in `0.0..=1.0`.
    pub null_rate: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sample_values: Vec<String>,
}

/// Optional read-only collaborator supplying column statistics.
///
/// Returning `None` for a column means profiling data is unavailable and
/// cardinality corroboration passes the candidate through unchanged.
#[async_trait]
pub trait ProfilingStore: Send + Sync {
    async fn column_profile(&self, asset_id: AssetId, column: &str)
        -> Result<Option<ColumnProfile>>;
}
