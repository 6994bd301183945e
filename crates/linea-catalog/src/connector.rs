use async_trait::async_trait;

use linea_core::Result;

/// Single-column foreign-key tuple returned by engine introspection.
#[derive(Debug, Clone)]
pub struct RawForeignKey {
    pub constraint: Option<String>,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Column metadata returned by engine introspection.
#[derive(Debug, Clone)]
pub struct RawColumnInfo {
    pub name: String,
    pub data_type: String,
    pub ordinal: i16,
}

/// Trait implemented by per-engine connectors used for introspection.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Whether this engine can enumerate real FK constraints.
    ///
    /// Engines without FK introspection skip constraint extraction and the
    /// pipeline proceeds heuristics-only.
    fn supports_fk_introspection(&self) -> bool;

    /// List FK constraints declared on a table, one tuple per column pair.
    async fn list_foreign_keys(&self, schema: &str, table: &str) -> Result<Vec<RawForeignKey>>;

    /// List the columns of a table in ordinal order.
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<RawColumnInfo>>;
}
