use async_trait::async_trait;
use sqlx::PgPool;

use linea_core::{Asset, AssetId, Column, ColumnId, DataSourceId, Result};

use crate::connector::{Connector, RawColumnInfo, RawForeignKey};
use crate::store::MetadataStore;

mod mapper;
mod queries;

/// Metadata store backed by the product catalog tables
/// (`data_assets`, `asset_columns`).
#[derive(Debug, Clone)]
pub struct PostgresMetadataStore {
    pool: PgPool,
}

impl PostgresMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    async fn list_assets(&self, data_source_id: DataSourceId) -> Result<Vec<Asset>> {
        let rows = queries::list_assets(&self.pool, data_source_id).await?;
        rows.into_iter().map(mapper::map_asset).collect()
    }

    async fn list_columns(&self, asset_id: AssetId) -> Result<Vec<Column>> {
        let rows = queries::list_columns(&self.pool, asset_id).await?;
        Ok(rows.into_iter().map(mapper::map_column).collect())
    }

    async fn clear_foreign_keys(&self, data_source_id: DataSourceId) -> Result<()> {
        queries::clear_foreign_keys(&self.pool, data_source_id).await
    }

    async fn mark_foreign_key(
        &self,
        column_id: ColumnId,
        to_table: &str,
        to_column: &str,
    ) -> Result<()> {
        queries::mark_foreign_key(&self.pool, column_id, to_table, to_column).await
    }
}

/// Introspection connector for PostgreSQL sources.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    pool: PgPool,
}

impl PostgresConnector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn supports_fk_introspection(&self) -> bool {
        true
    }

    async fn list_foreign_keys(&self, schema: &str, table: &str) -> Result<Vec<RawForeignKey>> {
        queries::list_foreign_keys(&self.pool, schema, table).await
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<RawColumnInfo>> {
        queries::list_table_columns(&self.pool, schema, table).await
    }
}
