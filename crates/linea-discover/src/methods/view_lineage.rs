use linea_core::{Asset, EdgeDetails, EdgeKind, LineageEdge, tier_for};

use crate::config::DiscoverOptions;
use crate::naming;
use crate::snapshot::MetadataSnapshot;

/// Match each view against candidate source tables by column overlap.
///
/// Keeps only the single best-scoring table per view, so a view never gets
/// more than one `view_source` edge.
pub fn propose(snapshot: &MetadataSnapshot, options: &DiscoverOptions) -> Vec<LineageEdge> {
    let mut edges = Vec::new();

    for view in snapshot.heuristic_views() {
        let view_columns: Vec<(String, String)> = snapshot
            .columns(view.id)
            .iter()
            .map(|column| {
                (
                    column.name.to_lowercase(),
                    naming::normalize_data_type(&column.data_type),
                )
            })
            .collect();
        if view_columns.is_empty() {
            continue;
        }

        let mut best: Option<Candidate<'_>> = None;
        for table in snapshot.heuristic_tables() {
            if table.id == view.id {
                continue;
            }
            let Some(candidate) = score_candidate(snapshot, view, table, &view_columns, options)
            else {
                continue;
            };
            best = Some(match best.take() {
                Some(current) if current.beats(&candidate) => current,
                _ => candidate,
            });
        }

        if let Some(candidate) = best {
            edges.push(candidate.into_edge(view));
        }
    }

    edges
}

struct Candidate<'a> {
    table: &'a Asset,
    score: u8,
    overlap_count: usize,
    overlap_ratio: f64,
    matched_columns: Vec<String>,
}

impl<'a> Candidate<'a> {
    /// Tie-break: score, then overlap count, then lexicographically
    /// smaller table name.
    fn beats(&self, other: &Candidate<'a>) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        if self.overlap_count != other.overlap_count {
            return self.overlap_count > other.overlap_count;
        }
        self.table.name < other.table.name
    }

    fn into_edge(self, view: &Asset) -> LineageEdge {
        let tier = tier_for(EdgeKind::ViewSource, self.score);
        LineageEdge {
            from_asset_id: view.id,
            to_asset_id: self.table.id,
            from_column: None,
            to_column: None,
            kind: EdgeKind::ViewSource,
            score: self.score,
            tier,
            details: EdgeDetails::ViewSource {
                overlap_count: self.overlap_count,
                overlap_ratio: self.overlap_ratio,
                matched_columns: self.matched_columns,
            },
        }
    }
}

fn score_candidate<'a>(
    snapshot: &MetadataSnapshot,
    view: &Asset,
    table: &'a Asset,
    view_columns: &[(String, String)],
    options: &DiscoverOptions,
) -> Option<Candidate<'a>> {
    let table_columns: Vec<(String, String)> = snapshot
        .columns(table.id)
        .iter()
        .map(|column| {
            (
                column.name.to_lowercase(),
                naming::normalize_data_type(&column.data_type),
            )
        })
        .collect();

    let mut matched_columns = Vec::new();
    for (name, data_type) in view_columns {
        let matched = table_columns
            .iter()
            .any(|(table_name, table_type)| table_name == name && table_type == data_type);
        if matched {
            matched_columns.push(name.clone());
        }
    }

    let overlap_count = matched_columns.len();
    let overlap_ratio = overlap_count as f64 / view_columns.len() as f64;
    if overlap_count < options.min_view_overlap_count
        || overlap_ratio < options.min_view_overlap_ratio
    {
        return None;
    }

    let score = if naming::normalize(&view.name) == naming::normalize(&table.name) {
        100
    } else if naming::is_prefix_variant(&view.name, &table.name) {
        95
    } else if overlap_ratio >= 0.9 {
        90
    } else if overlap_ratio >= 0.7 {
        80
    } else {
        return None;
    };

    Some(Candidate {
        table,
        score,
        overlap_count,
        overlap_ratio,
        matched_columns,
    })
}
