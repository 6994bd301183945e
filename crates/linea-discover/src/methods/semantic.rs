use linea_core::{Asset, Column, EdgeDetails, EdgeKind, LineageEdge, clamp_score, tier_for};

use crate::accumulator::EdgeAccumulator;
use crate::config::DiscoverOptions;
use crate::naming;
use crate::snapshot::MetadataSnapshot;

/// Fuzzy-match remaining uncovered columns against other assets' key names.
///
/// Catches near-miss references (typos, dropped separators) that the exact
/// token conventions miss: `custmer_id` still resolves to `customers.id`
/// at edit distance 1. Requires a matching data type, and never emits
/// self-loops.
pub fn propose(
    snapshot: &MetadataSnapshot,
    accumulated: &EdgeAccumulator,
    options: &DiscoverOptions,
) -> Vec<LineageEdge> {
    let mut edges = Vec::new();

    for asset in snapshot.heuristic_assets() {
        for column in snapshot.columns(asset.id) {
            if column.is_foreign_key
                || column.is_primary_key
                || accumulated.covers_column(asset.id, &column.name)
            {
                continue;
            }
            if let Some(edge) = best_match(snapshot, asset, column, options) {
                edges.push(edge);
            }
        }
    }

    edges
}

struct Match<'a> {
    target: &'a Asset,
    referenced_key: String,
    matched_name: String,
    distance: usize,
}

fn best_match<'a>(
    snapshot: &'a MetadataSnapshot,
    asset: &Asset,
    column: &Column,
    options: &DiscoverOptions,
) -> Option<LineageEdge> {
    let column_norm = naming::normalize(&column.name);
    let column_type = naming::normalize_data_type(&column.data_type);
    let mut best: Option<Match<'a>> = None;

    for target in snapshot.heuristic_tables() {
        if target.id == asset.id {
            continue;
        }
        let Some(pk) = snapshot.primary_key(target.id) else {
            continue;
        };
        if naming::normalize_data_type(&pk.data_type) != column_type {
            continue;
        }

        for reference in reference_names(target, pk) {
            let distance = naming::levenshtein(&column_norm, &reference);
            if distance > options.max_edit_distance {
                continue;
            }
            let better = match &best {
                Some(current) => {
                    distance < current.distance
                        || (distance == current.distance && target.name < current.target.name)
                }
                None => true,
            };
            if better {
                best = Some(Match {
                    target,
                    referenced_key: pk.name.clone(),
                    matched_name: reference.clone(),
                    distance,
                });
            }
        }
    }

    let matched = best?;
    let score = clamp_score(85 - 5 * matched.distance as i32);
    let tier = tier_for(EdgeKind::SemanticMatch, score);
    Some(LineageEdge {
        from_asset_id: asset.id,
        to_asset_id: matched.target.id,
        from_column: Some(column.name.clone()),
        to_column: Some(matched.referenced_key),
        kind: EdgeKind::SemanticMatch,
        score,
        tier,
        details: EdgeDetails::SemanticMatch {
            matched_name: matched.matched_name,
            edit_distance: matched.distance,
        },
    })
}

/// Normalized names a reference to this table's key could plausibly carry.
///
/// A generic `id` key is only matched through its entity-qualified forms,
/// otherwise every short column would sit within edit distance of it.
fn reference_names(target: &Asset, pk: &Column) -> Vec<String> {
    let pk_norm = naming::normalize(&pk.name);
    let entity = naming::singularize(&naming::normalize(&target.name));
    let plural = naming::normalize(&target.name);

    let mut names = Vec::new();
    if pk_norm != "id" {
        names.push(pk_norm.clone());
    }
    names.push(format!("{entity}{pk_norm}"));
    if plural != entity {
        names.push(format!("{plural}{pk_norm}"));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use linea_core::ConfidenceTier;

    use crate::testkit::{column, snapshot, table};

    fn options() -> DiscoverOptions {
        DiscoverOptions::default()
    }

    #[test]
    fn misspelled_reference_matches_within_distance() {
        let snap = snapshot(
            vec![table(1, "order_notes"), table(2, "customers")],
            vec![
                column(1, 1, "id", "bigint", true),
                column(2, 1, "custmer_id", "bigint", false),
                column(3, 2, "id", "bigint", true),
            ],
        );

        let edges = propose(&snap, &EdgeAccumulator::new(), &options());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_asset_id, 2);
        assert_eq!(edges[0].kind, EdgeKind::SemanticMatch);
        assert_eq!(edges[0].score, 80);
        assert_eq!(edges[0].tier, ConfidenceTier::Medium);
        match &edges[0].details {
            EdgeDetails::SemanticMatch { edit_distance, .. } => assert_eq!(*edit_distance, 1),
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let snap = snapshot(
            vec![table(1, "order_notes"), table(2, "customers")],
            vec![
                column(1, 1, "custmer_id", "text", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        assert!(propose(&snap, &EdgeAccumulator::new(), &options()).is_empty());
    }

    #[test]
    fn distance_beyond_threshold_is_rejected() {
        let snap = snapshot(
            vec![table(1, "order_notes"), table(2, "customers")],
            vec![
                column(1, 1, "cstmr_id", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        let tight = DiscoverOptions {
            max_edit_distance: 2,
            ..DiscoverOptions::default()
        };
        assert!(propose(&snap, &EdgeAccumulator::new(), &tight).is_empty());
    }

    #[test]
    fn generic_id_key_needs_entity_qualified_form() {
        let snap = snapshot(
            vec![table(1, "orders"), table(2, "customers")],
            vec![
                column(1, 1, "uid", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        // "uid" vs "customerid"/"customersid" is far beyond the threshold
        assert!(propose(&snap, &EdgeAccumulator::new(), &options()).is_empty());
    }

    #[test]
    fn covered_column_is_not_reproposed() {
        let snap = snapshot(
            vec![table(1, "order_notes"), table(2, "customers")],
            vec![
                column(1, 1, "custmer_id", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        let mut acc = EdgeAccumulator::new();
        let first = propose(&snap, &acc, &options());
        for edge in first {
            acc.insert(edge);
        }
        assert!(propose(&snap, &acc, &options()).is_empty());
    }
}
