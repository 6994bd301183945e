mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use linea_catalog::{PostgresConnector, PostgresMetadataStore};
use linea_core::{Error as CoreError, redact_connection_string};
use linea_discover::{DiscoverError, DiscoverOptions, DiscoveryOrchestrator, RunState};
use linea_graph::{GraphStore, PostgresGraphStore};
use registry::{RunContext, init_run_logging, start_run, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("discovery error: {0}")]
    Discover(#[from] DiscoverError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
    #[error("discovery run failed: {0}")]
    RunFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "linea", version, about = "Linea lineage discovery CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run lineage discovery for a data source.
    Discover(DiscoverArgs),
    /// Print the edges an asset depends on.
    Upstream(AssetArgs),
    /// Print the edges that depend on an asset.
    Downstream(AssetArgs),
    /// Print the full persisted graph for a data source.
    Graph(GraphArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Data source to discover lineage for.
    #[arg(long, value_name = "ID")]
    source: i64,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional output path for report.json.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Optional TOML file with discovery thresholds.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum edit distance for semantic matching.
    #[arg(long)]
    max_edit_distance: Option<usize>,
    /// Per-table FK introspection timeout in seconds.
    #[arg(long)]
    fk_timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct AssetArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Asset id to query.
    #[arg(long, value_name = "ID")]
    asset: i64,
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Data source id to query.
    #[arg(long, value_name = "ID")]
    source: i64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Discover(args) => run_discover(args).await,
        Command::Upstream(args) => {
            let store = graph_store(&args.conn).await?;
            print_edges(store.get_upstream(args.asset).await?)
        }
        Command::Downstream(args) => {
            let store = graph_store(&args.conn).await?;
            print_edges(store.get_downstream(args.asset).await?)
        }
        Command::Graph(args) => {
            let store = graph_store(&args.conn).await?;
            print_edges(store.get_graph(args.source).await?)
        }
    }
}

async fn run_discover(args: DiscoverArgs) -> Result<(), CliError> {
    let engine = detect_engine(&args.conn)?;
    let options = load_options(&args)?;

    let run_id = Uuid::new_v4().to_string();
    let connection = redact_connection_string(&args.conn);
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: engine.to_string(),
        data_source_id: args.source,
        run_dir: args.run_dir,
        out: args.out,
        options: options.clone(),
        connection,
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, engine = %engine, data_source_id = args.source);

    let pool = connect(&args.conn).await?;
    let metadata = Arc::new(PostgresMetadataStore::new(pool.clone()));
    let connector = Arc::new(PostgresConnector::new(pool.clone()));
    let graph = Arc::new(PostgresGraphStore::new(pool));

    let orchestrator = DiscoveryOrchestrator::new(metadata, connector, None, graph, options);
    let report = orchestrator.discover(args.source).await?;

    write_report(&run_paths, &report, run_ctx.out.as_deref())?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(registry::RegistryError::from)?
    );

    if report.state != RunState::Completed {
        return Err(CliError::RunFailed(
            report
                .error
                .unwrap_or_else(|| format!("run ended in state {:?}", report.state)),
        ));
    }
    Ok(())
}

fn load_options(args: &DiscoverArgs) -> Result<DiscoverOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|err| CliError::InvalidConfig(format!("{}: {err}", path.display())))?;
            toml::from_str(&contents)
                .map_err(|err| CliError::InvalidConfig(format!("{}: {err}", path.display())))?
        }
        None => DiscoverOptions::default(),
    };

    if let Some(distance) = args.max_edit_distance {
        options.max_edit_distance = distance;
    }
    if let Some(secs) = args.fk_timeout_secs {
        options.fk_timeout_secs = secs;
    }
    if options.min_view_overlap_ratio <= 0.0 || options.min_view_overlap_ratio > 1.0 {
        return Err(CliError::InvalidConfig(
            "min_view_overlap_ratio must be within (0, 1]".to_string(),
        ));
    }
    Ok(options)
}

async fn graph_store(conn: &str) -> Result<PostgresGraphStore, CliError> {
    detect_engine(conn)?;
    Ok(PostgresGraphStore::new(connect(conn).await?))
}

async fn connect(conn: &str) -> Result<sqlx::PgPool, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(pool)
}

fn print_edges(edges: Vec<linea_core::LineageEdge>) -> Result<(), CliError> {
    println!(
        "{}",
        serde_json::to_string_pretty(&edges).map_err(registry::RegistryError::from)?
    );
    Ok(())
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(conn.to_string()))
    }
}
