//! EduVerify daemon: entry point for running the credential registry API.

mod config;

use anyhow::Context;
use clap::Parser;
use config::DaemonConfig;
use eduverify_governance::GovernanceEngine;
use eduverify_ledger::{ContentStore, MemoryContentStore};
use eduverify_rpc::{AppState, RpcServer};
use eduverify_store_lmdb::{LmdbEnvironment, LmdbGovernanceStore, DEFAULT_MAP_SIZE};
use eduverify_types::Identity;
use eduverify_utils::{init_logging, LogFormat};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "eduverify-daemon", about = "EduVerify credential registry daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "EDUVERIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the governance database.
    #[arg(long, global = true, env = "EDUVERIFY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API listens on.
    #[arg(long, global = true, env = "EDUVERIFY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "EDUVERIFY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "EDUVERIFY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Genesis governor identity. Repeat, or comma-separate, for several.
    /// Replaces the file's `genesis_governors` when given.
    #[arg(
        long = "governor",
        global = true,
        env = "EDUVERIFY_GOVERNORS",
        value_delimiter = ','
    )]
    governors: Vec<Identity>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted.
    Run,
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// Layer CLI and env values over the config file over defaults.
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DaemonConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if !self.governors.is_empty() {
            config.genesis_governors = self.governors.clone();
        }
        Ok(config)
    }
}

/// Open the governance database under `data_dir`. A fresh database is seeded
/// from genesis; an existing one is recovered and genesis is ignored.
fn open_engine(config: &DaemonConfig) -> anyhow::Result<GovernanceEngine> {
    let env = LmdbEnvironment::open(&config.data_dir, DEFAULT_MAP_SIZE)
        .with_context(|| format!("opening store in {}", config.data_dir.display()))?;
    let store = Arc::new(LmdbGovernanceStore::new(Arc::new(env)));
    let engine = GovernanceEngine::with_store(
        store,
        config.genesis_governors.iter().copied(),
        config.genesis_institutions.iter().copied(),
    )
    .context("loading governance state")?;
    Ok(engine)
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    let engine = open_engine(&config)?;
    let documents: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new(
        config.gateway_url.clone(),
        config.max_document_bytes,
    ));
    let state = AppState::new(Arc::new(engine), documents);

    tracing::info!(
        listen = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        governors = state.engine.governor_count(),
        institutions = state.engine.institution_count(),
        gateway = %config.gateway_url,
        "starting EduVerify daemon"
    );

    let server = RpcServer::new(config.listen_addr, config.max_document_bytes, state);
    server.start(shutdown_signal()).await?;

    tracing::info!("EduVerify daemon exited cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, stopping");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        Command::Run => {
            init_logging(config.log_format, &config.log_level);
            if let Some(path) = &cli.config {
                tracing::info!(path = %path.display(), "loaded config file");
            }
            run(config).await
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
