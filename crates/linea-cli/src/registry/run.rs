use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use linea_core::RedactedConnection;
use linea_discover::{DiscoverOptions, DiscoveryReport};

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub data_source_id: i64,
    pub run_dir: PathBuf,
    pub out: Option<PathBuf>,
    pub options: DiscoverOptions,
    pub connection: RedactedConnection,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    engine: &'a str,
    data_source_id: i64,
    graph_version: &'a str,
    options: OptionsSnapshot,
    connection: &'a RedactedConnection,
}

/// Serializable copy of the discovery thresholds in effect.
#[derive(Debug, Serialize)]
struct OptionsSnapshot {
    max_edit_distance: usize,
    min_view_overlap_count: usize,
    min_view_overlap_ratio: f64,
    fk_timeout_secs: u64,
}

impl From<&DiscoverOptions> for OptionsSnapshot {
    fn from(options: &DiscoverOptions) -> Self {
        Self {
            max_edit_distance: options.max_edit_distance,
            min_view_overlap_count: options.min_view_overlap_count,
            min_view_overlap_ratio: options.min_view_overlap_ratio,
            fk_timeout_secs: options.fk_timeout_secs,
        }
    }
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&run_root)?;

    let config_path = run_root.join("config.json");
    let logs_path = run_root.join("logs.ndjson");
    let report_path = run_root.join("report.json");

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        engine: &ctx.engine,
        data_source_id: ctx.data_source_id,
        graph_version: linea_core::GRAPH_VERSION,
        options: OptionsSnapshot::from(&ctx.options),
        connection: &ctx.connection,
    };
    write_json(&config_path, &config)?;

    OpenOptions::new().create(true).append(true).open(&logs_path)?;

    Ok(RunPaths {
        logs_path,
        report_path,
    })
}

pub fn write_report(
    paths: &RunPaths,
    report: &DiscoveryReport,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.report_path, report)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, report)?;
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
