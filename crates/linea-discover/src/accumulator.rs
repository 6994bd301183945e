use std::collections::BTreeMap;

use linea_core::{AssetId, EdgeKey, EdgeKind, LineageEdge};

/// Accumulating edge set threaded through the discovery methods.
///
/// Keyed by the `(from, to, from_column)` triple; the first writer wins, so
/// methods running earlier in the priority order suppress later proposals
/// for the same triple.
#[derive(Debug, Default)]
pub struct EdgeAccumulator {
    edges: BTreeMap<EdgeKey, LineageEdge>,
}

impl EdgeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge unless its triple is already covered.
    /// Returns whether the edge was accepted.
    pub fn insert(&mut self, edge: LineageEdge) -> bool {
        let key = edge.key();
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, edge);
        true
    }

    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Whether any accumulated edge already originates from this column.
    pub fn covers_column(&self, asset_id: AssetId, column: &str) -> bool {
        self.edges.values().any(|edge| {
            edge.from_asset_id == asset_id && edge.from_column.as_deref() == Some(column)
        })
    }

    pub fn remove(&mut self, key: &EdgeKey) -> Option<LineageEdge> {
        self.edges.remove(key)
    }

    /// Replace an edge in place, keeping its key.
    pub fn replace(&mut self, edge: LineageEdge) {
        self.edges.insert(edge.key(), edge);
    }

    /// Keys of accumulated edges of the given kinds, in key order.
    pub fn keys_of_kinds(&self, kinds: &[EdgeKind]) -> Vec<EdgeKey> {
        self.edges
            .values()
            .filter(|edge| kinds.contains(&edge.kind))
            .map(LineageEdge::key)
            .collect()
    }

    pub fn get(&self, key: &EdgeKey) -> Option<&LineageEdge> {
        self.edges.get(key)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineageEdge> {
        self.edges.values()
    }

    /// Drain into a vector ordered by edge key.
    pub fn into_edges(self) -> Vec<LineageEdge> {
        self.edges.into_values().collect()
    }
}
