//! cohort server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! roster store, optionally imports a JSON seed file, and serves the question
//! API over HTTP.
//!
//! ```text
//! cohort --config cohort.toml --seed roster.json
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use cohort_api::{AppState, api_router};
use cohort_core::record::Roster;
use cohort_server::{ChatCompletions, ServerConfig};
use cohort_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Answer roster questions with generated queries")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// JSON roster (`{"people": [...], "notes": [...], "interactions": [...]}`)
  /// to import before serving.
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = ServerConfig::load(&cli.config)?;

  let store_path = config.store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(seed) = &cli.seed {
    let text = std::fs::read_to_string(seed)
      .with_context(|| format!("failed to read seed file {seed:?}"))?;
    let roster: Roster = serde_json::from_str(&text)
      .with_context(|| format!("failed to parse seed file {seed:?}"))?;
    store.import(&roster).await.context("failed to import seed data")?;
  }

  let source = ChatCompletions::new(&config).context("failed to build HTTP client")?;
  let state = AppState::new(store, source).with_timeout(config.query_timeout());
  let app = api_router(state).layer(TraceLayer::new_for_http());

  let address = config.address();
  tracing::info!(model = %config.llm_model, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
