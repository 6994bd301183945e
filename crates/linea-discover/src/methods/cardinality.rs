use linea_catalog::ColumnProfile;
use linea_core::{ConfidenceTier, EdgeDetails, EdgeKind, LineageEdge};

use crate::accumulator::EdgeAccumulator;
use crate::snapshot::MetadataSnapshot;

/// Result of the corroboration pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CorroborationOutcome {
    pub upgraded: u64,
    pub suppressed: u64,
}

/// Statistically corroborate naming-based candidates.
///
/// Originates no edges. For each accumulated `smart_fk`/`semantic_match`
/// candidate with profiles on both sides, a child column denser than the
/// presumed parent key (or a nullable parent key) is incompatible with a
/// referential relationship and suppresses the candidate; a medium-tier
/// candidate whose value range sits inside the parent's is upgraded to
/// high. Candidates without profiling data pass through unchanged.
pub fn corroborate(
    snapshot: &MetadataSnapshot,
    accumulated: &mut EdgeAccumulator,
) -> CorroborationOutcome {
    let mut outcome = CorroborationOutcome::default();
    if !snapshot.has_profiles() {
        return outcome;
    }

    let candidates =
        accumulated.keys_of_kinds(&[EdgeKind::SmartFk, EdgeKind::SemanticMatch]);
    for key in candidates {
        let Some(edge) = accumulated.get(&key) else {
            continue;
        };
        let (Some(from_column), Some(to_column)) =
            (edge.from_column.clone(), edge.to_column.clone())
        else {
            continue;
        };
        let child = snapshot.profile(edge.from_asset_id, &from_column);
        let parent = snapshot.profile(edge.to_asset_id, &to_column);
        let (Some(child), Some(parent)) = (child, parent) else {
            continue;
        };

        if incompatible(child, parent) {
            tracing::debug!(
                event = "candidate_suppressed",
                from_asset_id = edge.from_asset_id,
                to_asset_id = edge.to_asset_id,
                column = %from_column,
                child_distinct = child.distinct_count,
                parent_distinct = parent.distinct_count
            );
            accumulated.remove(&key);
            outcome.suppressed += 1;
            continue;
        }

        if edge.tier == ConfidenceTier::Medium && range_contained(child, parent) {
            let upgraded = LineageEdge {
                kind: EdgeKind::CardinalityMatch,
                score: 90,
                tier: ConfidenceTier::High,
                details: EdgeDetails::Cardinality {
                    child_distinct: child.distinct_count,
                    parent_distinct: parent.distinct_count,
                    range_contained: true,
                },
                ..edge.clone()
            };
            accumulated.replace(upgraded);
            outcome.upgraded += 1;
        }
    }

    outcome
}

/// A child side with more distinct values than the presumed parent key, or
/// a parent key with nulls, cannot be the target of a referential
/// relationship.
fn incompatible(child: &ColumnProfile, parent: &ColumnProfile) -> bool {
    parent.distinct_count <= 0
        || child.distinct_count > parent.distinct_count
        || parent.null_rate > 0.0
}

fn range_contained(child: &ColumnProfile, parent: &ColumnProfile) -> bool {
    match (child.min, child.max, parent.min, parent.max) {
        (Some(child_min), Some(child_max), Some(parent_min), Some(parent_max)) => {
            child_min >= parent_min && child_max <= parent_max
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linea_core::{EdgeKey, tier_for};

    use crate::testkit::{column, profiled_snapshot, table};

    fn candidate(kind: EdgeKind, score: u8) -> LineageEdge {
        LineageEdge {
            from_asset_id: 1,
            to_asset_id: 2,
            from_column: Some("customer_ref".to_string()),
            to_column: Some("id".to_string()),
            kind,
            score,
            tier: tier_for(kind, score),
            details: EdgeDetails::SemanticMatch {
                matched_name: "customerid".to_string(),
                edit_distance: 1,
            },
        }
    }

    fn profile(distinct: i64, null_rate: f64, min: f64, max: f64) -> ColumnProfile {
        ColumnProfile {
            distinct_count: distinct,
            null_rate,
            min: Some(min),
            max: Some(max),
            sample_values: Vec::new(),
        }
    }

    fn fixtures() -> (Vec<linea_core::Asset>, Vec<linea_core::Column>) {
        (
            vec![table(1, "order_notes"), table(2, "customers")],
            vec![
                column(1, 1, "customer_ref", "bigint", false),
                column(2, 2, "id", "bigint", true),
            ],
        )
    }

    #[test]
    fn upgrades_contained_medium_candidate() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(
            assets,
            columns,
            vec![
                (1, "customer_ref", profile(40, 0.1, 3.0, 90.0)),
                (2, "id", profile(100, 0.0, 1.0, 100.0)),
            ],
        );

        let mut acc = EdgeAccumulator::new();
        acc.insert(candidate(EdgeKind::SemanticMatch, 80));
        let outcome = corroborate(&snap, &mut acc);

        assert_eq!(outcome, CorroborationOutcome { upgraded: 1, suppressed: 0 });
        let edges = acc.into_edges();
        assert_eq!(edges[0].kind, EdgeKind::CardinalityMatch);
        assert_eq!(edges[0].score, 90);
        assert_eq!(edges[0].tier, ConfidenceTier::High);
    }

    #[test]
    fn suppresses_denser_child() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(
            assets,
            columns,
            vec![
                (1, "customer_ref", profile(500, 0.0, 1.0, 500.0)),
                (2, "id", profile(100, 0.0, 1.0, 100.0)),
            ],
        );

        let mut acc = EdgeAccumulator::new();
        acc.insert(candidate(EdgeKind::SmartFk, 80));
        let outcome = corroborate(&snap, &mut acc);

        assert_eq!(outcome, CorroborationOutcome { upgraded: 0, suppressed: 1 });
        assert!(acc.is_empty());
    }

    #[test]
    fn nullable_parent_key_is_incompatible() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(
            assets,
            columns,
            vec![
                (1, "customer_ref", profile(40, 0.0, 1.0, 90.0)),
                (2, "id", profile(100, 0.2, 1.0, 100.0)),
            ],
        );

        let mut acc = EdgeAccumulator::new();
        acc.insert(candidate(EdgeKind::SemanticMatch, 80));
        let outcome = corroborate(&snap, &mut acc);
        assert_eq!(outcome.suppressed, 1);
    }

    #[test]
    fn missing_profiles_pass_through_unchanged() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(
            assets,
            columns,
            vec![(2, "id", profile(100, 0.0, 1.0, 100.0))],
        );

        let mut acc = EdgeAccumulator::new();
        acc.insert(candidate(EdgeKind::SemanticMatch, 80));
        let outcome = corroborate(&snap, &mut acc);

        assert_eq!(outcome, CorroborationOutcome::default());
        let key = EdgeKey {
            from_asset_id: 1,
            to_asset_id: 2,
            from_column: Some("customer_ref".to_string()),
        };
        assert_eq!(acc.get(&key).map(|edge| edge.kind), Some(EdgeKind::SemanticMatch));
    }

    #[test]
    fn no_profiling_store_is_a_no_op() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(assets, columns, Vec::new());

        let mut acc = EdgeAccumulator::new();
        acc.insert(candidate(EdgeKind::SemanticMatch, 80));
        let outcome = corroborate(&snap, &mut acc);

        assert_eq!(outcome, CorroborationOutcome::default());
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn database_fk_edges_are_never_touched() {
        let (assets, columns) = fixtures();
        let snap = profiled_snapshot(
            assets,
            columns,
            vec![
                (1, "customer_ref", profile(500, 0.0, 1.0, 500.0)),
                (2, "id", profile(100, 0.0, 1.0, 100.0)),
            ],
        );

        let mut fk_edge = candidate(EdgeKind::DatabaseFk, 100);
        fk_edge.tier = ConfidenceTier::Absolute;
        fk_edge.details = EdgeDetails::DatabaseFk { constraint: None };

        let mut acc = EdgeAccumulator::new();
        acc.insert(fk_edge);
        let outcome = corroborate(&snap, &mut acc);

        assert_eq!(outcome, CorroborationOutcome::default());
        assert_eq!(acc.len(), 1);
    }
}
