//! Shared fixtures for the method unit tests.

use linea_catalog::ColumnProfile;
use linea_core::{Asset, AssetId, AssetKind, Column, ColumnId};

use crate::snapshot::MetadataSnapshot;

pub fn table(id: AssetId, name: &str) -> Asset {
    asset(id, name, AssetKind::Table)
}

pub fn view(id: AssetId, name: &str) -> Asset {
    asset(id, name, AssetKind::View)
}

fn asset(id: AssetId, name: &str, kind: AssetKind) -> Asset {
    Asset {
        id,
        kind,
        schema_name: "public".to_string(),
        name: name.to_string(),
        database: None,
        data_source_id: 1,
    }
}

pub fn column(id: ColumnId, asset_id: AssetId, name: &str, data_type: &str, pk: bool) -> Column {
    Column {
        id,
        asset_id,
        name: name.to_string(),
        data_type: data_type.to_string(),
        ordinal_position: id as i16,
        is_nullable: false,
        is_primary_key: pk,
        is_foreign_key: false,
        foreign_key_table: None,
        foreign_key_column: None,
    }
}

pub fn fk_column(
    id: ColumnId,
    asset_id: AssetId,
    name: &str,
    to_table: &str,
    to_column: &str,
) -> Column {
    let mut column = column(id, asset_id, name, "bigint", false);
    column.is_foreign_key = true;
    column.foreign_key_table = Some(to_table.to_string());
    column.foreign_key_column = Some(to_column.to_string());
    column
}

pub fn snapshot(assets: Vec<Asset>, columns: Vec<Column>) -> MetadataSnapshot {
    MetadataSnapshot::from_parts(1, assets, columns)
}

pub fn profiled_snapshot(
    assets: Vec<Asset>,
    columns: Vec<Column>,
    profiles: Vec<(AssetId, &str, ColumnProfile)>,
) -> MetadataSnapshot {
    let mut snapshot = snapshot(assets, columns);
    for (asset_id, column, profile) in profiles {
        snapshot.attach_profile(asset_id, column, profile);
    }
    snapshot
}
