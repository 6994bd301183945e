use std::collections::BTreeMap;

use linea_catalog::{ColumnProfile, MetadataStore, ProfilingStore};
use linea_core::{Asset, AssetId, AssetKind, Column, DataSourceId, Result};

use crate::naming;

/// Schema namespaces and object prefixes belonging to engine catalogs.
/// Assets matching these never participate in heuristic matching.
const SYSTEM_SCHEMAS: &[&str] = &[
    "information_schema",
    "pg_catalog",
    "pg_toast",
    "performance_schema",
    "mysql",
    "sys",
];
const SYSTEM_PREFIXES: &[&str] = &["pg_", "sqlite_", "sys_"];

/// Read-once view of a data source's metadata, pinned at run start.
///
/// All method lookups go through the snapshot, so a discovery run observes
/// one consistent catalog state regardless of concurrent scanner activity.
#[derive(Debug)]
pub struct MetadataSnapshot {
    data_source_id: DataSourceId,
    assets: BTreeMap<AssetId, Asset>,
    columns_by_asset: BTreeMap<AssetId, Vec<Column>>,
    profiles: BTreeMap<(AssetId, String), ColumnProfile>,
}

impl MetadataSnapshot {
    /// Load assets and columns for a data source from the metadata store.
    pub async fn load(
        store: &dyn MetadataStore,
        data_source_id: DataSourceId,
    ) -> Result<Self> {
        let mut snapshot = Self::from_parts(data_source_id, Vec::new(), Vec::new());
        for asset in store.list_assets(data_source_id).await? {
            let columns = store.list_columns(asset.id).await?;
            snapshot.columns_by_asset.insert(asset.id, columns);
            snapshot.assets.insert(asset.id, asset);
        }
        Ok(snapshot)
    }

    /// Build a snapshot directly from asset and column records.
    pub fn from_parts(
        data_source_id: DataSourceId,
        assets: Vec<Asset>,
        columns: Vec<Column>,
    ) -> Self {
        let mut columns_by_asset: BTreeMap<AssetId, Vec<Column>> = BTreeMap::new();
        for column in columns {
            columns_by_asset.entry(column.asset_id).or_default().push(column);
        }
        for asset_columns in columns_by_asset.values_mut() {
            asset_columns.sort_by_key(|column| column.ordinal_position);
        }
        Self {
            data_source_id,
            assets: assets.into_iter().map(|asset| (asset.id, asset)).collect(),
            columns_by_asset,
            profiles: BTreeMap::new(),
        }
    }

    /// Attach prefetched profiling statistics.
    pub async fn prefetch_profiles(&mut self, profiling: &dyn ProfilingStore) -> Result<()> {
        for (asset_id, columns) in &self.columns_by_asset {
            for column in columns {
                if let Some(profile) = profiling.column_profile(*asset_id, &column.name).await? {
                    self.profiles.insert((*asset_id, column.name.clone()), profile);
                }
            }
        }
        Ok(())
    }

    /// Move profiling records pinned by an earlier snapshot into this one.
    pub fn adopt_profiles(&mut self, other: &mut MetadataSnapshot) {
        self.profiles = std::mem::take(&mut other.profiles);
    }

    /// Attach one profiling record directly (fixtures and tests).
    pub fn attach_profile(&mut self, asset_id: AssetId, column: &str, profile: ColumnProfile) {
        self.profiles.insert((asset_id, column.to_string()), profile);
    }

    pub fn data_source_id(&self) -> DataSourceId {
        self.data_source_id
    }

    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    /// All assets in deterministic id order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Non-system assets eligible for heuristic matching, in id order.
    pub fn heuristic_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values().filter(|asset| !is_system_asset(asset))
    }

    /// Non-system table assets, in id order.
    pub fn heuristic_tables(&self) -> impl Iterator<Item = &Asset> {
        self.heuristic_assets()
            .filter(|asset| asset.kind == AssetKind::Table)
    }

    /// Non-system view assets, in id order.
    pub fn heuristic_views(&self) -> impl Iterator<Item = &Asset> {
        self.heuristic_assets()
            .filter(|asset| asset.kind == AssetKind::View)
    }

    pub fn columns(&self, asset_id: AssetId) -> &[Column] {
        self.columns_by_asset
            .get(&asset_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn profile(&self, asset_id: AssetId, column: &str) -> Option<&ColumnProfile> {
        self.profiles.get(&(asset_id, column.to_string()))
    }

    pub fn has_profiles(&self) -> bool {
        !self.profiles.is_empty()
    }

    /// Resolve a referenced table name to an asset, preferring the same
    /// schema as the referencing asset.
    pub fn resolve_table(&self, name: &str, prefer_schema: &str) -> Option<&Asset> {
        let mut fallback = None;
        for asset in self.assets.values() {
            if !asset.name.eq_ignore_ascii_case(name) {
                continue;
            }
            if asset.schema_name.eq_ignore_ascii_case(prefer_schema) {
                return Some(asset);
            }
            if fallback.is_none() {
                fallback = Some(asset);
            }
        }
        fallback
    }

    /// The primary-key column of an asset.
    ///
    /// Prefers an explicitly marked column, then the conventional `id`,
    /// then `<entity>_id` named after the asset itself.
    pub fn primary_key(&self, asset_id: AssetId) -> Option<&Column> {
        let columns = self.columns(asset_id);
        if let Some(marked) = columns.iter().find(|column| column.is_primary_key) {
            return Some(marked);
        }
        if let Some(id_column) = columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case("id"))
        {
            return Some(id_column);
        }
        let asset = self.asset(asset_id)?;
        let entity_key = format!("{}id", naming::singularize(&naming::normalize(&asset.name)));
        columns
            .iter()
            .find(|column| naming::normalize(&column.name) == entity_key)
    }
}

/// Whether an asset belongs to an engine's own catalog.
pub fn is_system_asset(asset: &Asset) -> bool {
    let schema = asset.schema_name.to_lowercase();
    let name = asset.name.to_lowercase();
    SYSTEM_SCHEMAS.contains(&schema.as_str())
        || SYSTEM_PREFIXES
            .iter()
            .any(|prefix| schema.starts_with(prefix) || name.starts_with(prefix))
}
