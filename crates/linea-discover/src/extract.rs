use std::time::Duration;

use tokio::time::timeout;

use linea_catalog::{Connector, MetadataStore};
use linea_core::{AssetKind, DataSourceId, Result};

/// Summary of one FK extraction pass.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Whether the engine supports FK introspection at all.
    pub supported: bool,
    /// Tables whose introspection call failed or timed out.
    pub skipped_tables: Vec<String>,
    /// Columns marked as verified foreign keys.
    pub marked_columns: u64,
}

/// Populate FK markers on column metadata from the engine connector.
///
/// Re-running overwrites prior markers for the data source. A failure or
/// timeout on one table skips that table and continues; heuristics still
/// run for it later.
pub async fn extract_foreign_keys(
    store: &dyn MetadataStore,
    connector: &dyn Connector,
    data_source_id: DataSourceId,
    per_table_timeout: Duration,
) -> Result<ExtractionOutcome> {
    let mut outcome = ExtractionOutcome::default();

    if !connector.supports_fk_introspection() {
        tracing::info!(
            event = "fk_extraction_skipped",
            engine = connector.engine(),
            data_source_id,
            "engine has no FK introspection; proceeding heuristics-only"
        );
        return Ok(outcome);
    }
    outcome.supported = true;

    store.clear_foreign_keys(data_source_id).await?;

    let assets = store.list_assets(data_source_id).await?;
    for asset in assets {
        if asset.kind != AssetKind::Table {
            continue;
        }

        let qualified = asset.qualified_name();
        let introspection = timeout(
            per_table_timeout,
            connector.list_foreign_keys(&asset.schema_name, &asset.name),
        )
        .await;

        let foreign_keys = match introspection {
            Ok(Ok(foreign_keys)) => foreign_keys,
            Ok(Err(err)) => {
                tracing::warn!(event = "fk_introspection_failed", table = %qualified, error = %err);
                outcome.skipped_tables.push(qualified);
                continue;
            }
            Err(_) => {
                tracing::warn!(event = "fk_introspection_timeout", table = %qualified);
                outcome.skipped_tables.push(qualified);
                continue;
            }
        };

        let columns = store.list_columns(asset.id).await?;
        for fk in foreign_keys {
            let Some(column) = columns
                .iter()
                .find(|column| column.name.eq_ignore_ascii_case(&fk.from_column))
            else {
                tracing::warn!(
                    event = "fk_column_missing",
                    table = %qualified,
                    column = %fk.from_column
                );
                continue;
            };
            store
                .mark_foreign_key(column.id, &fk.to_table, &fk.to_column)
                .await?;
            outcome.marked_columns += 1;
        }
    }

    Ok(outcome)
}
