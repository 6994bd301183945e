use linea_core::{ConfidenceTier, EdgeDetails, EdgeKind, LineageEdge};

use crate::snapshot::MetadataSnapshot;

/// Emit an edge for every column carrying a verified FK marker.
///
/// The single authoritative source of `absolute` edges. Self-referencing
/// constraints produce the only permitted self-loops.
pub fn propose(snapshot: &MetadataSnapshot) -> Vec<LineageEdge> {
    let mut edges = Vec::new();

    for asset in snapshot.assets() {
        for column in snapshot.columns(asset.id) {
            if !column.is_foreign_key {
                continue;
            }
            let Some(target_table) = column.foreign_key_table.as_deref() else {
                continue;
            };
            let Some(target) = snapshot.resolve_table(target_table, &asset.schema_name) else {
                tracing::warn!(
                    event = "fk_target_unresolved",
                    table = %asset.qualified_name(),
                    column = %column.name,
                    target = %target_table
                );
                continue;
            };

            let to_column = column
                .foreign_key_column
                .clone()
                .or_else(|| snapshot.primary_key(target.id).map(|pk| pk.name.clone()));

            edges.push(LineageEdge {
                from_asset_id: asset.id,
                to_asset_id: target.id,
                from_column: Some(column.name.clone()),
                to_column,
                kind: EdgeKind::DatabaseFk,
                score: 100,
                tier: ConfidenceTier::Absolute,
                details: EdgeDetails::DatabaseFk { constraint: None },
            });
        }
    }

    edges
}
