use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use objekt_server::background_jobs::jobs::{job_types, ObjektNoRetryJob, ObjektRetryJob};
use objekt_server::background_jobs::{create_queue, JobRegistry};
use objekt_server::config;
use objekt_server::objekt::{Objekt, ObjektStore, SqliteObjektStore};
use objekt_server::server_store::SqliteServerStore;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing database files (objekt.db, server.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// Maximum number of pending submissions the queue holds before submit fails.
    #[clap(long)]
    pub queue_capacity: Option<usize>,

    /// Job type to dispatch at startup (repeatable):
    /// objekt_no_retry, objekt_retry or objekt_standard_error.
    #[clap(long = "dispatch")]
    pub dispatch: Vec<String>,

    /// Objekt to dispatch. A new objekt is created when omitted.
    #[clap(long)]
    pub objekt_id: Option<i64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            queue_capacity: args.queue_capacity,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  queue capacity: {}", app_config.queue.capacity);

    // Create objekt store (will create DB if not exists)
    if !app_config.objekt_db_path().exists() {
        info!(
            "Creating new objekt database at {:?}",
            app_config.objekt_db_path()
        );
    }
    let objekt_store = Arc::new(SqliteObjektStore::new(app_config.objekt_db_path())?);

    // Create server store for job audit history
    info!(
        "Initializing server store at {:?}",
        app_config.server_db_path()
    );
    let server_store = Arc::new(SqliteServerStore::new(app_config.server_db_path())?);

    // Register jobs. The standard-error executor is deployed separately;
    // submissions against its identifier are accepted without a local
    // registration.
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(ObjektNoRetryJob))?;
    registry.register(Arc::new(ObjektRetryJob))?;

    let shutdown_token = CancellationToken::new();
    let (runner, queue) = create_queue(
        registry,
        server_store.clone(),
        shutdown_token.child_token(),
        app_config.queue.capacity,
    );

    info!(
        "Job queue initialized with {} registered job(s)",
        runner.job_count()
    );

    if !cli_args.dispatch.is_empty() {
        let objekt = resolve_objekt(objekt_store.as_ref(), cli_args.objekt_id)?;
        for job_type in &cli_args.dispatch {
            let handle = match job_type.as_str() {
                job_types::OBJEKT_NO_RETRY => objekt.queue_no_retry_job(&queue),
                job_types::OBJEKT_RETRY => objekt.queue_retry_job(&queue),
                job_types::OBJEKT_STANDARD_ERROR => objekt.queue_standard_error_job(&queue),
                other => {
                    error!("Unknown job type '{}', skipping", other);
                    continue;
                }
            };
            match handle {
                Ok(handle) => info!("Submitted {} as {}", handle.job_type, handle.id),
                Err(e) => error!("Failed to submit {}: {}", job_type, e),
            }
        }
    }

    // Drop the local handle so the runner stops once the queue drains.
    drop(queue);

    tokio::select! {
        _ = runner.run() => {
            info!("Runner stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
        }
    }

    Ok(())
}

fn resolve_objekt(store: &dyn ObjektStore, objekt_id: Option<i64>) -> Result<Objekt> {
    match objekt_id {
        Some(id) => store
            .get_objekt(id)?
            .ok_or_else(|| anyhow::anyhow!("No objekt with id {}", id)),
        None => {
            let objekt = store.create_objekt()?;
            info!("Created objekt {}", objekt.id);
            Ok(objekt)
        }
    }
}
