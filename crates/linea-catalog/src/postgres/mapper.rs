use linea_core::{Asset, AssetKind, Column, Error, Result};

use super::queries::{AssetRow, ColumnRow};

pub fn map_asset(row: AssetRow) -> Result<Asset> {
    let kind = match row.kind.as_str() {
        "table" => AssetKind::Table,
        "view" => AssetKind::View,
        "function" => AssetKind::Function,
        other => {
            return Err(Error::Db(format!(
                "unknown asset kind '{other}' for {}.{}",
                row.schema_name, row.name
            )))
        }
    };

    Ok(Asset {
        id: row.id,
        kind,
        schema_name: row.schema_name,
        name: row.name,
        database: row.database,
        data_source_id: row.data_source_id,
    })
}

pub fn map_column(row: ColumnRow) -> Column {
    Column {
        id: row.id,
        asset_id: row.asset_id,
        name: row.name,
        data_type: row.data_type,
        ordinal_position: row.ordinal_position,
        is_nullable: row.is_nullable,
        is_primary_key: row.is_primary_key,
        is_foreign_key: row.is_foreign_key,
        foreign_key_table: row.foreign_key_table,
        foreign_key_column: row.foreign_key_column,
    }
}
