use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use linea_catalog::{Connector, MetadataStore, ProfilingStore};
use linea_core::{DataSourceId, LineageEdge, validate_edges};
use linea_graph::GraphStore;

use crate::accumulator::EdgeAccumulator;
use crate::config::DiscoverOptions;
use crate::extract::{ExtractionOutcome, extract_foreign_keys};
use crate::methods::{DiscoveryMethod, METHOD_ORDER, cardinality, database_fk, semantic, smart_fk, view_lineage};
use crate::report::{DiscoveryReport, tally};
use crate::snapshot::MetadataSnapshot;

/// Stages of a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Profiling,
    ExtractingFk,
    Matching,
    Writing,
    Completed,
    Failed,
    Cancelled,
}

/// Cooperative cancellation flag.
///
/// Checked only at method boundaries; a cancelled run discards its
/// in-memory edge set and leaves the persisted graph untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Errors that reject a discovery request outright.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// At most one run per data source may be in flight.
    #[error("discovery already running for data source {0}")]
    AlreadyRunning(DataSourceId),
    #[error(transparent)]
    Core(#[from] linea_core::Error),
}

/// Runs the discovery pipeline for one data source at a time.
///
/// Methods execute in strict priority order over a pinned metadata
/// snapshot, feeding one accumulating edge set; the terminal write replaces
/// the persisted graph transactionally.
pub struct DiscoveryOrchestrator {
    metadata: Arc<dyn MetadataStore>,
    connector: Arc<dyn Connector>,
    profiling: Option<Arc<dyn ProfilingStore>>,
    graph: Arc<dyn GraphStore>,
    options: DiscoverOptions,
    in_flight: Mutex<BTreeSet<DataSourceId>>,
}

impl DiscoveryOrchestrator {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        connector: Arc<dyn Connector>,
        profiling: Option<Arc<dyn ProfilingStore>>,
        graph: Arc<dyn GraphStore>,
        options: DiscoverOptions,
    ) -> Self {
        Self {
            metadata,
            connector,
            profiling,
            graph,
            options,
            in_flight: Mutex::new(BTreeSet::new()),
        }
    }

    /// Run the full pipeline to completion or failure.
    pub async fn discover(
        &self,
        data_source_id: DataSourceId,
    ) -> Result<DiscoveryReport, DiscoverError> {
        self.discover_cancellable(data_source_id, &CancelFlag::new())
            .await
    }

    /// Run the pipeline with an external cancellation flag.
    pub async fn discover_cancellable(
        &self,
        data_source_id: DataSourceId,
        cancel: &CancelFlag,
    ) -> Result<DiscoveryReport, DiscoverError> {
        let _guard = self.claim(data_source_id)?;
        let run = RunContext {
            run_id: Uuid::new_v4().to_string(),
            data_source_id,
            timer: Instant::now(),
        };
        tracing::info!(event = "run_started", run_id = %run.run_id, data_source_id);

        // profiling: pin metadata and statistics as of run start
        tracing::info!(event = "stage", run_id = %run.run_id, state = "profiling");
        let mut pinned = MetadataSnapshot::load(&*self.metadata, data_source_id).await?;
        if let Some(profiling) = &self.profiling {
            if let Err(err) = pinned.prefetch_profiles(&**profiling).await {
                tracing::warn!(event = "profiling_unavailable", error = %err);
            }
        }
        if cancel.is_cancelled() {
            return Ok(run.cancelled(RunState::Profiling));
        }

        tracing::info!(event = "stage", run_id = %run.run_id, state = "extracting_fk");
        let extraction = match extract_foreign_keys(
            &*self.metadata,
            &*self.connector,
            data_source_id,
            self.options.fk_timeout(),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                // degrade to heuristics-only rather than failing the run
                tracing::warn!(event = "fk_extraction_degraded", error = %err);
                ExtractionOutcome::default()
            }
        };
        if cancel.is_cancelled() {
            return Ok(run.cancelled_with(RunState::ExtractingFk, extraction.skipped_tables));
        }

        tracing::info!(event = "stage", run_id = %run.run_id, state = "matching");
        // reload columns so matching sees this run's FK markers
        let mut snapshot = MetadataSnapshot::load(&*self.metadata, data_source_id).await?;
        snapshot.adopt_profiles(&mut pinned);

        let mut accumulated = EdgeAccumulator::new();
        let mut suppressed = 0;
        let mut upgraded = 0;
        for method in METHOD_ORDER {
            if cancel.is_cancelled() {
                return Ok(run.cancelled_with(RunState::Matching, extraction.skipped_tables));
            }
            match method {
                DiscoveryMethod::DatabaseFk => {
                    merge(&mut accumulated, database_fk::propose(&snapshot), method);
                }
                DiscoveryMethod::ViewLineage => {
                    merge(
                        &mut accumulated,
                        view_lineage::propose(&snapshot, &self.options),
                        method,
                    );
                }
                DiscoveryMethod::SmartFk => {
                    let proposals = smart_fk::propose(&snapshot, &accumulated);
                    merge(&mut accumulated, proposals, method);
                }
                DiscoveryMethod::SemanticSimilarity => {
                    let proposals = semantic::propose(&snapshot, &accumulated, &self.options);
                    merge(&mut accumulated, proposals, method);
                }
                DiscoveryMethod::CardinalityCorroboration => {
                    let outcome = cardinality::corroborate(&snapshot, &mut accumulated);
                    suppressed = outcome.suppressed;
                    upgraded = outcome.upgraded;
                }
            }
        }

        let edges = accumulated.into_edges();
        validate_edges(&edges)?;
        if cancel.is_cancelled() {
            return Ok(run.cancelled_with(RunState::Matching, extraction.skipped_tables));
        }

        tracing::info!(event = "stage", run_id = %run.run_id, state = "writing");
        if let Err(err) = self.graph.replace_discovered(data_source_id, &edges).await {
            tracing::error!(event = "write_failed", run_id = %run.run_id, error = %err);
            return Ok(DiscoveryReport {
                run_id: run.run_id.clone(),
                data_source_id,
                state: RunState::Failed,
                edges_created: 0,
                by_kind: Default::default(),
                by_tier: Default::default(),
                skipped_tables: extraction.skipped_tables,
                suppressed_edges: suppressed,
                upgraded_edges: upgraded,
                duration_ms: run.timer.elapsed().as_millis(),
                error: Some(err.to_string()),
            });
        }

        let (by_kind, by_tier) = tally(&edges);
        let report = DiscoveryReport {
            run_id: run.run_id.clone(),
            data_source_id,
            state: RunState::Completed,
            edges_created: edges.len() as u64,
            by_kind,
            by_tier,
            skipped_tables: extraction.skipped_tables,
            suppressed_edges: suppressed,
            upgraded_edges: upgraded,
            duration_ms: run.timer.elapsed().as_millis(),
            error: None,
        };
        tracing::info!(
            event = "run_finished",
            run_id = %run.run_id,
            edges_created = report.edges_created,
            duration_ms = report.duration_ms as u64
        );
        Ok(report)
    }

    fn claim(&self, data_source_id: DataSourceId) -> Result<RunGuard<'_>, DiscoverError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| linea_core::Error::Other("run registry lock poisoned".to_string()))?;
        if !in_flight.insert(data_source_id) {
            return Err(DiscoverError::AlreadyRunning(data_source_id));
        }
        Ok(RunGuard {
            in_flight: &self.in_flight,
            data_source_id,
        })
    }
}

struct RunContext {
    run_id: String,
    data_source_id: DataSourceId,
    timer: Instant,
}

impl RunContext {
    fn cancelled(&self, reached: RunState) -> DiscoveryReport {
        self.cancelled_with(reached, Vec::new())
    }

    fn cancelled_with(&self, reached: RunState, skipped_tables: Vec<String>) -> DiscoveryReport {
        tracing::info!(event = "run_cancelled", run_id = %self.run_id, reached = ?reached);
        DiscoveryReport {
            run_id: self.run_id.clone(),
            data_source_id: self.data_source_id,
            state: RunState::Cancelled,
            edges_created: 0,
            by_kind: Default::default(),
            by_tier: Default::default(),
            skipped_tables,
            suppressed_edges: 0,
            upgraded_edges: 0,
            duration_ms: self.timer.elapsed().as_millis(),
            error: None,
        }
    }
}

/// Releases the per-source in-flight claim when the run ends.
struct RunGuard<'a> {
    in_flight: &'a Mutex<BTreeSet<DataSourceId>>,
    data_source_id: DataSourceId,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.data_source_id);
        }
    }
}

fn merge(accumulated: &mut EdgeAccumulator, proposals: Vec<LineageEdge>, method: DiscoveryMethod) {
    let mut accepted = 0usize;
    let mut dropped = 0usize;
    for edge in proposals {
        if accumulated.insert(edge) {
            accepted += 1;
        } else {
            dropped += 1;
        }
    }
    tracing::debug!(
        event = "method_finished",
        method = method.name(),
        accepted,
        dropped_duplicates = dropped
    );
}
