use linea_core::{Asset, Column, EdgeDetails, EdgeKind, LineageEdge, tier_for};

use crate::accumulator::EdgeAccumulator;
use crate::naming;
use crate::snapshot::MetadataSnapshot;

/// Suffix tokens that mark a column as an entity reference.
const REFERENCE_SUFFIXES: &[&str] = &["id", "ref", "key"];

/// Infer FK-like edges from entity-reference naming conventions.
///
/// A column named `customer_id`, `CustomerID`, or `order_ref` is treated as
/// a reference to the entity named by its leading tokens, resolved against
/// asset names with singular/plural normalization. Columns already marked
/// as foreign keys or already covered by a higher-priority edge are
/// skipped, and no self-loops are emitted.
pub fn propose(snapshot: &MetadataSnapshot, accumulated: &EdgeAccumulator) -> Vec<LineageEdge> {
    let mut edges = Vec::new();

    for asset in snapshot.heuristic_assets() {
        for column in snapshot.columns(asset.id) {
            if column.is_foreign_key || accumulated.covers_column(asset.id, &column.name) {
                continue;
            }
            let Some(entity_tokens) = entity_reference(&column.name) else {
                continue;
            };
            if let Some(edge) = best_match(snapshot, asset, column, &entity_tokens) {
                edges.push(edge);
            }
        }
    }

    edges
}

/// Leading tokens of a reference-style column name, or `None` when the
/// name does not follow a `<entity><suffix>` convention.
fn entity_reference(column_name: &str) -> Option<Vec<String>> {
    let tokens = naming::tokens(column_name);
    if tokens.len() < 2 {
        return None;
    }
    let (suffix, entity) = tokens.split_last()?;
    if !REFERENCE_SUFFIXES.contains(&suffix.as_str()) {
        return None;
    }
    Some(entity.to_vec())
}

struct Match<'a> {
    target: &'a Asset,
    referenced_key: String,
    score: u8,
    exact: bool,
}

fn best_match<'a>(
    snapshot: &'a MetadataSnapshot,
    asset: &Asset,
    column: &Column,
    entity_tokens: &[String],
) -> Option<LineageEdge> {
    let entity = entity_tokens.concat();
    let mut candidates: Vec<Match<'a>> = Vec::new();

    for target in snapshot.heuristic_tables() {
        if target.id == asset.id {
            continue;
        }
        let Some(pk) = snapshot.primary_key(target.id) else {
            continue;
        };

        if naming::same_entity(&entity, &target.name) {
            let score = if key_name_matches(&pk.name, &entity, &target.name) {
                95
            } else {
                80
            };
            candidates.push(Match {
                target,
                referenced_key: pk.name.clone(),
                score,
                exact: score == 95,
            });
            continue;
        }

        // qualified references: billing_customer_id still points at customers
        if entity_tokens.len() > 1 {
            let tail = &entity_tokens[entity_tokens.len() - 1];
            if naming::same_entity(tail, &target.name) {
                candidates.push(Match {
                    target,
                    referenced_key: pk.name.clone(),
                    score: 80,
                    exact: false,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.target.name.cmp(&b.target.name))
            .then_with(|| a.target.id.cmp(&b.target.id))
    });
    let best = candidates.into_iter().next()?;

    let tier = tier_for(EdgeKind::SmartFk, best.score);
    Some(LineageEdge {
        from_asset_id: asset.id,
        to_asset_id: best.target.id,
        from_column: Some(column.name.clone()),
        to_column: Some(best.referenced_key.clone()),
        kind: EdgeKind::SmartFk,
        score: best.score,
        tier,
        details: EdgeDetails::SmartFk {
            matched_entity: entity,
            referenced_key: best.referenced_key,
            exact: best.exact,
        },
    })
}

/// Whether the target's key column is named the way the reference implies.
fn key_name_matches(pk_name: &str, entity: &str, target_name: &str) -> bool {
    let normalized = naming::normalize(pk_name);
    normalized == "id"
        || normalized == format!("{entity}id")
        || normalized == format!("{}id", naming::singularize(&naming::normalize(target_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linea_core::ConfidenceTier;

    use crate::testkit::{column, snapshot, table};

    #[test]
    fn exact_entity_and_key_match_scores_high() {
        let snap = snapshot(
            vec![table(1, "order_notes"), table(2, "orders")],
            vec![
                column(1, 1, "id", "bigint", true),
                column(2, 1, "order_ref", "bigint", false),
                column(3, 2, "id", "bigint", true),
            ],
        );

        let edges = propose(&snap, &EdgeAccumulator::new());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from_asset_id, 1);
        assert_eq!(edges[0].to_asset_id, 2);
        assert_eq!(edges[0].from_column.as_deref(), Some("order_ref"));
        assert_eq!(edges[0].to_column.as_deref(), Some("id"));
        assert_eq!(edges[0].score, 95);
        assert_eq!(edges[0].tier, ConfidenceTier::High);
    }

    #[test]
    fn camel_case_reference_resolves() {
        let snap = snapshot(
            vec![table(1, "invoices"), table(2, "customers")],
            vec![
                column(1, 1, "CustomerID", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        let edges = propose(&snap, &EdgeAccumulator::new());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_asset_id, 2);
        assert_eq!(edges[0].score, 95);
    }

    #[test]
    fn qualified_reference_scores_medium() {
        let snap = snapshot(
            vec![table(1, "invoices"), table(2, "customers")],
            vec![
                column(1, 1, "billing_customer_id", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        let edges = propose(&snap, &EdgeAccumulator::new());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].score, 80);
        assert_eq!(edges[0].tier, ConfidenceTier::Medium);
    }

    #[test]
    fn marked_and_covered_columns_are_skipped() {
        let snap = snapshot(
            vec![table(1, "orders"), table(2, "customers")],
            vec![
                {
                    let mut c = column(1, 1, "customer_id", "bigint", false);
                    c.is_foreign_key = true;
                    c.foreign_key_table = Some("customers".to_string());
                    c
                },
                column(2, 2, "id", "bigint", true),
            ],
        );

        assert!(propose(&snap, &EdgeAccumulator::new()).is_empty());
    }

    #[test]
    fn no_self_loop_for_own_key_reference() {
        let snap = snapshot(
            vec![table(1, "orders")],
            vec![
                column(1, 1, "id", "bigint", true),
                column(2, 1, "order_id", "bigint", false),
            ],
        );

        assert!(propose(&snap, &EdgeAccumulator::new()).is_empty());
    }

    #[test]
    fn plain_words_are_not_references() {
        let snap = snapshot(
            vec![table(1, "contacts"), table(2, "cells")],
            vec![
                column(1, 1, "cell_phone", "text", false),
                column(2, 2, "id", "bigint", true),
            ],
        );

        // cell_phone ends in "phone", not a reference suffix
        assert!(propose(&snap, &EdgeAccumulator::new()).is_empty());
    }
}
