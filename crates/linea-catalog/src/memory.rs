use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use linea_core::{Asset, AssetId, Column, ColumnId, DataSourceId, Error, Result};

use crate::connector::{Connector, RawColumnInfo, RawForeignKey};
use crate::profiling::{ColumnProfile, ProfilingStore};
use crate::store::MetadataStore;

/// In-memory catalog implementing all three store traits.
///
/// Used as the fixture backend for discovery and graph tests, and as a
/// stand-in catalog for engines that expose metadata snapshots directly.
/// Introspection failures can be injected per table to exercise the
/// skip-and-continue path.
#[derive(Debug)]
pub struct MemoryCatalog {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    assets: BTreeMap<AssetId, Asset>,
    columns: BTreeMap<ColumnId, Column>,
    constraints: BTreeMap<(String, String), Vec<RawForeignKey>>,
    profiles: BTreeMap<(AssetId, String), ColumnProfile>,
    failing_tables: BTreeSet<String>,
    fk_support: bool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                fk_support: true,
                ..Inner::default()
            }),
        }
    }

    pub fn insert_asset(&self, asset: Asset) -> Result<()> {
        let mut inner = self.lock()?;
        inner.assets.insert(asset.id, asset);
        Ok(())
    }

    pub fn insert_column(&self, column: Column) -> Result<()> {
        let mut inner = self.lock()?;
        inner.columns.insert(column.id, column);
        Ok(())
    }

    /// Register a real FK constraint surfaced by introspection.
    pub fn insert_constraint(&self, schema: &str, table: &str, fk: RawForeignKey) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .constraints
            .entry((schema.to_string(), table.to_string()))
            .or_default()
            .push(fk);
        Ok(())
    }

    pub fn insert_profile(
        &self,
        asset_id: AssetId,
        column: &str,
        profile: ColumnProfile,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        inner.profiles.insert((asset_id, column.to_string()), profile);
        Ok(())
    }

    /// Make `list_foreign_keys` fail for one table.
    pub fn fail_introspection_for(&self, table: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner.failing_tables.insert(table.to_string());
        Ok(())
    }

    /// Toggle engine-level FK introspection support.
    pub fn set_fk_support(&self, supported: bool) -> Result<()> {
        let mut inner = self.lock()?;
        inner.fk_support = supported;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Other("catalog lock poisoned".to_string()))
    }
}

#[async_trait]
impl MetadataStore for MemoryCatalog {
    async fn list_assets(&self, data_source_id: DataSourceId) -> Result<Vec<Asset>> {
        let inner = self.lock()?;
        Ok(inner
            .assets
            .values()
            .filter(|asset| asset.data_source_id == data_source_id)
            .cloned()
            .collect())
    }

    async fn list_columns(&self, asset_id: AssetId) -> Result<Vec<Column>> {
        let inner = self.lock()?;
        let mut columns: Vec<Column> = inner
            .columns
            .values()
            .filter(|column| column.asset_id == asset_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.ordinal_position);
        Ok(columns)
    }

    async fn clear_foreign_keys(&self, data_source_id: DataSourceId) -> Result<()> {
        let mut inner = self.lock()?;
        let asset_ids: BTreeSet<AssetId> = inner
            .assets
            .values()
            .filter(|asset| asset.data_source_id == data_source_id)
            .map(|asset| asset.id)
            .collect();
        for column in inner.columns.values_mut() {
            if asset_ids.contains(&column.asset_id) {
                column.is_foreign_key = false;
                column.foreign_key_table = None;
                column.foreign_key_column = None;
            }
        }
        Ok(())
    }

    async fn mark_foreign_key(
        &self,
        column_id: ColumnId,
        to_table: &str,
        to_column: &str,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        let column = inner
            .columns
            .get_mut(&column_id)
            .ok_or_else(|| Error::Db(format!("unknown column id {column_id}")))?;
        column.is_foreign_key = true;
        column.foreign_key_table = Some(to_table.to_string());
        column.foreign_key_column = Some(to_column.to_string());
        Ok(())
    }
}

#[async_trait]
impl Connector for MemoryCatalog {
    fn engine(&self) -> &'static str {
        "memory"
    }

    fn supports_fk_introspection(&self) -> bool {
        self.lock().map(|inner| inner.fk_support).unwrap_or(false)
    }

    async fn list_foreign_keys(&self, schema: &str, table: &str) -> Result<Vec<RawForeignKey>> {
        let inner = self.lock()?;
        if inner.failing_tables.contains(table) {
            return Err(Error::Db(format!("introspection failed for {schema}.{table}")));
        }
        Ok(inner
            .constraints
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<RawColumnInfo>> {
        let inner = self.lock()?;
        let asset = inner
            .assets
            .values()
            .find(|asset| asset.schema_name == schema && asset.name == table)
            .ok_or_else(|| Error::Db(format!("unknown table {schema}.{table}")))?;
        let mut columns: Vec<RawColumnInfo> = inner
            .columns
            .values()
            .filter(|column| column.asset_id == asset.id)
            .map(|column| RawColumnInfo {
                name: column.name.clone(),
                data_type: column.data_type.clone(),
                ordinal: column.ordinal_position,
            })
            .collect();
        columns.sort_by_key(|column| column.ordinal);
        Ok(columns)
    }
}

#[async_trait]
impl ProfilingStore for MemoryCatalog {
    async fn column_profile(
        &self,
        asset_id: AssetId,
        column: &str,
    ) -> Result<Option<ColumnProfile>> {
        let inner = self.lock()?;
        Ok(inner.profiles.get(&(asset_id, column.to_string())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linea_core::AssetKind;

    fn asset(id: AssetId, name: &str) -> Asset {
        Asset {
            id,
            kind: AssetKind::Table,
            schema_name: "public".to_string(),
            name: name.to_string(),
            database: None,
            data_source_id: 1,
        }
    }

    fn column(id: ColumnId, asset_id: AssetId, name: &str) -> Column {
        Column {
            id,
            asset_id,
            name: name.to_string(),
            data_type: "bigint".to_string(),
            ordinal_position: 1,
            is_nullable: false,
            is_primary_key: false,
            is_foreign_key: false,
            foreign_key_table: None,
            foreign_key_column: None,
        }
    }

    #[tokio::test]
    async fn marks_and_clears_foreign_keys() {
        let catalog = MemoryCatalog::new();
        catalog.insert_asset(asset(1, "orders")).unwrap();
        catalog.insert_column(column(10, 1, "customer_id")).unwrap();

        catalog.mark_foreign_key(10, "customers", "id").await.unwrap();
        let columns = MetadataStore::list_columns(&catalog, 1).await.unwrap();
        assert!(columns[0].is_foreign_key);
        assert_eq!(columns[0].foreign_key_table.as_deref(), Some("customers"));

        catalog.clear_foreign_keys(1).await.unwrap();
        let columns = MetadataStore::list_columns(&catalog, 1).await.unwrap();
        assert!(!columns[0].is_foreign_key);
        assert!(columns[0].foreign_key_table.is_none());
    }

    #[tokio::test]
    async fn injected_failure_surfaces_as_db_error() {
        let catalog = MemoryCatalog::new();
        catalog.insert_asset(asset(1, "orders")).unwrap();
        catalog.fail_introspection_for("orders").unwrap();

        let result = catalog.list_foreign_keys("public", "orders").await;
        assert!(matches!(result, Err(Error::Db(_))));
    }
}
