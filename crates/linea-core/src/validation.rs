use std::collections::{BTreeMap, BTreeSet};

use crate::edge::{ConfidenceTier, EdgeKind, LineageEdge};
use crate::error::{Error, Result};

/// Validate internal consistency of a discovered edge set.
///
/// This checks:
/// - at most one edge per `(from, to, from_column)` triple
/// - self-loops only on constraint-backed edges
/// - the `absolute` tier only on constraint-backed edges
/// - at most one `view_source` edge per originating asset
/// - scores within range
pub fn validate_edges(edges: &[LineageEdge]) -> Result<()> {
    let mut keys = BTreeSet::new();
    let mut view_sources: BTreeMap<i64, usize> = BTreeMap::new();

    for edge in edges {
        if !keys.insert(edge.key()) {
            return Err(Error::InvalidEdges(format!(
                "duplicate edge for {} -> {} on column {:?}",
                edge.from_asset_id, edge.to_asset_id, edge.from_column
            )));
        }

        if edge.is_self_loop() && edge.kind != EdgeKind::DatabaseFk {
            return Err(Error::InvalidEdges(format!(
                "heuristic self-loop on asset {} via {}",
                edge.from_asset_id,
                edge.kind.as_str()
            )));
        }

        if edge.tier == ConfidenceTier::Absolute && edge.kind != EdgeKind::DatabaseFk {
            return Err(Error::InvalidEdges(format!(
                "absolute tier on non-constraint edge {} -> {}",
                edge.from_asset_id, edge.to_asset_id
            )));
        }

        if edge.score > 100 {
            return Err(Error::InvalidEdges(format!(
                "score {} out of range on {} -> {}",
                edge.score, edge.from_asset_id, edge.to_asset_id
            )));
        }

        if edge.kind == EdgeKind::ViewSource {
            let count = view_sources.entry(edge.from_asset_id).or_insert(0);
            *count += 1;
            if *count > 1 {
                return Err(Error::InvalidEdges(format!(
                    "multiple view_source edges for view {}",
                    edge.from_asset_id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeDetails;

    fn edge(from: i64, to: i64, column: Option<&str>, kind: EdgeKind) -> LineageEdge {
        let tier = crate::score::tier_for(kind, 80);
        LineageEdge {
            from_asset_id: from,
            to_asset_id: to,
            from_column: column.map(str::to_string),
            to_column: None,
            kind,
            score: 80,
            tier,
            details: EdgeDetails::DatabaseFk { constraint: None },
        }
    }

    #[test]
    fn accepts_constraint_backed_self_loop() {
        let edges = vec![edge(1, 1, Some("parent_id"), EdgeKind::DatabaseFk)];
        assert!(validate_edges(&edges).is_ok());
    }

    #[test]
    fn rejects_heuristic_self_loop() {
        let edges = vec![edge(1, 1, Some("parent_id"), EdgeKind::SmartFk)];
        assert!(validate_edges(&edges).is_err());
    }

    #[test]
    fn rejects_duplicate_triple() {
        let edges = vec![
            edge(1, 2, Some("customer_id"), EdgeKind::SmartFk),
            edge(1, 2, Some("customer_id"), EdgeKind::SemanticMatch),
        ];
        assert!(validate_edges(&edges).is_err());
    }

    #[test]
    fn rejects_absolute_heuristic() {
        let mut bad = edge(1, 2, Some("customer_id"), EdgeKind::SmartFk);
        bad.tier = ConfidenceTier::Absolute;
        assert!(validate_edges(&[bad]).is_err());
    }

    #[test]
    fn rejects_second_view_source() {
        let mut first = edge(5, 2, None, EdgeKind::ViewSource);
        first.details = EdgeDetails::ViewSource {
            overlap_count: 3,
            overlap_ratio: 0.75,
            matched_columns: Vec::new(),
        };
        let mut second = first.clone();
        second.to_asset_id = 3;
        assert!(validate_edges(&[first, second]).is_err());
    }

    #[test]
    fn distinct_columns_are_distinct_edges() {
        let edges = vec![
            edge(1, 2, Some("customer_id"), EdgeKind::SmartFk),
            edge(1, 2, Some("billing_customer_id"), EdgeKind::SmartFk),
        ];
        assert!(validate_edges(&edges).is_ok());
    }
}
