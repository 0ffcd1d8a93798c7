#![forbid(unsafe_code)]

//! `dropclerk` binary.
//!
//! Bootstraps configuration and runs one of the two long-running
//! processes: the arrival detector (`watch`) or the orchestrator
//! (`orchestrate`). The two communicate only through the shared vault
//! folder hierarchy.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dropclerk::activity::JsonlActivityWriter;
use dropclerk::classify::RuleSet;
use dropclerk::config::GlobalConfig;
use dropclerk::orchestrator::Orchestrator;
use dropclerk::store::TaskStore;
use dropclerk::watcher::ArrivalDetector;
use dropclerk::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Watch the drop folder and create tasks for arriving files.
    Watch,
    /// Scan pending tasks, classify, route to skills, and archive.
    Orchestrate,
}

#[derive(Debug, Parser)]
#[command(name = "dropclerk", about = "Folder-driven clerical task automation", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the vault root from the config file.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Force dry-run mode regardless of the config file.
    #[arg(long)]
    dry_run: bool,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    // A malformed config is never fatal; defaults take over with a warning.
    let mut config = GlobalConfig::load_or_default(&args.config);
    if let Some(root) = args.root {
        config.root = root;
    }
    if args.dry_run {
        config.dry_run = true;
    }
    info!(
        root = %config.root.display(),
        dry_run = config.dry_run,
        "configuration loaded"
    );
    if config.dry_run {
        warn!("dry run: task-state mutations are logged, not performed");
    }

    // ── Build the shared context ────────────────────────
    // Required folders that cannot be created are the one fatal startup error.
    let store = TaskStore::new(config.root.clone(), config.dry_run);
    store.ensure_folders()?;
    let activity = Arc::new(JsonlActivityWriter::new(store.logs_dir())?);

    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    match args.command {
        Command::Watch => {
            let detector = Arc::new(ArrivalDetector::new(
                store,
                activity,
                config.watcher.clone(),
            ));
            detector.run(ct).await?;
            info!("arrival detector stopped");
        }
        Command::Orchestrate => {
            let orchestrator =
                Orchestrator::new(store, activity, RuleSet::new()?, config.orchestrator.clone());
            let scans = orchestrator.run(ct).await;
            info!(scans, "orchestrator stopped");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
