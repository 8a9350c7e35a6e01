//! kplan server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite item store, starts the enrichment queue, and serves the JSON API
//! over HTTP. On Ctrl-C it stops accepting requests and drains the queue.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use kplan_api::ApiState;
use kplan_llm::{Analyzer, OpenAiClient};
use kplan_queue::{EnrichmentHandler, JobQueue};
use kplan_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "kplan item enrichment server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  // Completion client and queue.
  let client = OpenAiClient::new(server_cfg.completion.clone())
    .context("failed to build completion client")?;
  let handler = EnrichmentHandler::new(Analyzer::new(client), store.clone());
  let queue = JobQueue::start(&server_cfg.queue, handler);
  tracing::info!(
    concurrency = server_cfg.queue.concurrency,
    model = %server_cfg.completion.model,
    "enrichment queue started",
  );

  let app = kplan_api::api_router(ApiState::new(store, queue.clone()))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!(pending = queue.size(), "draining enrichment queue");
  queue.drain().await;
  tracing::info!("shutdown complete");

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
  }
}
