use async_trait::async_trait;

use linea_core::{AssetId, DataSourceId, LineageEdge, Result};

/// Persistent lineage graph.
///
/// Edges are stored flat and keyed by asset ids, so genuine cycles
/// (self-referencing FKs, mutual constraints) round-trip without
/// special-casing. Edges flagged as manually curated are never touched by
/// discovery writes.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Atomically replace all auto-discovered edges for a data source.
    ///
    /// Runs in a single transaction: prior auto-discovered edges are
    /// deleted, the new set inserted, and any error rolls the whole write
    /// back, leaving the previously persisted graph authoritative.
    async fn replace_discovered(
        &self,
        data_source_id: DataSourceId,
        edges: &[LineageEdge],
    ) -> Result<()>;

    /// Edges leading out of an asset — the assets it depends on.
    async fn get_upstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>>;

    /// Edges leading into an asset — the assets that depend on it.
    async fn get_downstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>>;

    /// Every edge persisted for a data source, manual edges included.
    async fn get_graph(&self, data_source_id: DataSourceId) -> Result<Vec<LineageEdge>>;
}
