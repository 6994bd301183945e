use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier of a registered data source.
pub type DataSourceId = i64;
/// Identifier of a cataloged asset.
pub type AssetId = i64;
/// Identifier of a cataloged column.
pub type ColumnId = i64;

/// A cataloged object within a data source.
///
/// Assets are created by the external scanner and are read-only to the
/// discovery core.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    /// Namespace the object lives in (e.g. `public`).
    pub schema_name: String,
    pub name: String,
    pub database: Option<String>,
    pub data_source_id: DataSourceId,
}

impl Asset {
    /// Qualified `schema.name` form used in logs and reports.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }
}

/// Kind of cataloged asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Table,
    View,
    Function,
}

/// Column metadata for an asset.
///
/// The `is_foreign_key` marker and its target fields are written only by the
/// FK constraint extractor; everything else comes from the scanner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub id: ColumnId,
    pub asset_id: AssetId,
    pub name: String,
    pub data_type: String,
    pub ordinal_position: i16,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub foreign_key_table: Option<String>,
    pub foreign_key_column: Option<String>,
}
