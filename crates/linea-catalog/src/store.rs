use async_trait::async_trait;

use linea_core::{Asset, AssetId, Column, ColumnId, DataSourceId, Result};

/// Read/write access to scanner-populated catalog metadata.
///
/// Assets and columns are created by the external scanner; discovery only
/// reads them, except for the FK marker fields maintained by the constraint
/// extractor.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// All assets registered for a data source.
    async fn list_assets(&self, data_source_id: DataSourceId) -> Result<Vec<Asset>>;

    /// Columns of one asset in ordinal order.
    async fn list_columns(&self, asset_id: AssetId) -> Result<Vec<Column>>;

    /// Remove FK markers for every column of the data source.
    async fn clear_foreign_keys(&self, data_source_id: DataSourceId) -> Result<()>;

    /// Mark a column as a verified foreign key to `to_table.to_column`.
    async fn mark_foreign_key(
        &self,
        column_id: ColumnId,
        to_table: &str,
        to_column: &str,
    ) -> Result<()>;
}
