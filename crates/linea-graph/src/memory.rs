use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use linea_core::{AssetId, DataSourceId, Error, LineageEdge, Result, validate_edges};

use crate::store::GraphStore;

#[derive(Debug, Clone)]
struct StoredEdge {
    data_source_id: DataSourceId,
    manual: bool,
    edge: LineageEdge,
}

/// In-memory graph store used by tests and fixtures.
///
/// The replace is atomic: the new edge set is staged on a copy and swapped
/// in only when every step succeeded, so an injected failure leaves the
/// prior graph untouched.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    edges: Mutex<Vec<StoredEdge>>,
    fail_next_write: AtomicBool,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user-curated edge that discovery writes must preserve.
    pub fn insert_manual(&self, data_source_id: DataSourceId, edge: LineageEdge) -> Result<()> {
        let mut edges = self.lock()?;
        edges.push(StoredEdge {
            data_source_id,
            manual: true,
            edge,
        });
        Ok(())
    }

    /// Make the next `replace_discovered` call fail mid-transaction.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredEdge>>> {
        self.edges
            .lock()
            .map_err(|_| Error::Other("graph lock poisoned".to_string()))
    }

    fn collect<F>(&self, predicate: F) -> Result<Vec<LineageEdge>>
    where
        F: Fn(&StoredEdge) -> bool,
    {
        let edges = self.lock()?;
        let mut matched: Vec<LineageEdge> = edges
            .iter()
            .filter(|stored| predicate(stored))
            .map(|stored| stored.edge.clone())
            .collect();
        matched.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(matched)
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn replace_discovered(
        &self,
        data_source_id: DataSourceId,
        edges: &[LineageEdge],
    ) -> Result<()> {
        validate_edges(edges)?;

        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(Error::Db("injected write failure".to_string()));
        }

        let mut stored = self.lock()?;
        let mut next: Vec<StoredEdge> = stored
            .iter()
            .filter(|entry| entry.manual || entry.data_source_id != data_source_id)
            .cloned()
            .collect();
        next.extend(edges.iter().map(|edge| StoredEdge {
            data_source_id,
            manual: false,
            edge: edge.clone(),
        }));
        *stored = next;
        Ok(())
    }

    async fn get_upstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>> {
        self.collect(|stored| stored.edge.from_asset_id == asset_id)
    }

    async fn get_downstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>> {
        self.collect(|stored| stored.edge.to_asset_id == asset_id)
    }

    async fn get_graph(&self, data_source_id: DataSourceId) -> Result<Vec<LineageEdge>> {
        self.collect(|stored| stored.data_source_id == data_source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linea_core::{ConfidenceTier, EdgeDetails, EdgeKind};

    fn fk_edge(from: AssetId, to: AssetId, column: &str) -> LineageEdge {
        LineageEdge {
            from_asset_id: from,
            to_asset_id: to,
            from_column: Some(column.to_string()),
            to_column: Some("id".to_string()),
            kind: EdgeKind::DatabaseFk,
            score: 100,
            tier: ConfidenceTier::Absolute,
            details: EdgeDetails::DatabaseFk { constraint: None },
        }
    }

    #[tokio::test]
    async fn replace_preserves_manual_edges() {
        let store = MemoryGraphStore::new();
        store.insert_manual(1, fk_edge(8, 9, "curated_ref")).unwrap();

        store
            .replace_discovered(1, &[fk_edge(1, 2, "customer_id")])
            .await
            .unwrap();
        store
            .replace_discovered(1, &[fk_edge(3, 4, "order_id")])
            .await
            .unwrap();

        let graph = store.get_graph(1).await.unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.iter().any(|edge| edge.from_asset_id == 8));
        assert!(graph.iter().any(|edge| edge.from_asset_id == 3));
        assert!(!graph.iter().any(|edge| edge.from_asset_id == 1));
    }

    #[tokio::test]
    async fn failed_write_leaves_prior_graph_intact() {
        let store = MemoryGraphStore::new();
        store
            .replace_discovered(1, &[fk_edge(1, 2, "customer_id")])
            .await
            .unwrap();

        store.fail_next_write();
        let result = store.replace_discovered(1, &[fk_edge(3, 4, "order_id")]).await;
        assert!(result.is_err());

        let graph = store.get_graph(1).await.unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[0].from_asset_id, 1);
    }

    #[tokio::test]
    async fn sources_are_isolated() {
        let store = MemoryGraphStore::new();
        store
            .replace_discovered(1, &[fk_edge(1, 2, "customer_id")])
            .await
            .unwrap();
        store
            .replace_discovered(2, &[fk_edge(5, 6, "order_id")])
            .await
            .unwrap();

        assert_eq!(store.get_graph(1).await.unwrap().len(), 1);
        assert_eq!(store.get_graph(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_and_downstream_directions() {
        let store = MemoryGraphStore::new();
        store
            .replace_discovered(1, &[fk_edge(1, 2, "customer_id")])
            .await
            .unwrap();

        let upstream = store.get_upstream(1).await.unwrap();
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].to_asset_id, 2);

        let downstream = store.get_downstream(2).await.unwrap();
        assert_eq!(downstream.len(), 1);
        assert_eq!(downstream[0].from_asset_id, 1);

        assert!(store.get_upstream(2).await.unwrap().is_empty());
    }
}
