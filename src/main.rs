mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod guards;
mod logging;
mod query;
mod session;
mod storage;
mod ui;

#[cfg(test)]
mod testutil;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::api::transport::ReqwestTransport;
use crate::api::{CachedHrApi, HrApi, HttpClient};
use crate::cache::QueryCache;
use crate::session::SessionStore;
use crate::storage::{LocalStorage, MemoryStorage, SqliteStorage};
use crate::ui::context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "hrdesk")]
#[command(about = "A terminal client for the HR administration backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./hrdesk.yaml or $XDG_CONFIG_HOME/hrdesk/config.yaml)
  #[arg(short, long, env = "HRDESK_CONFIG")]
  config: Option<PathBuf>,

  /// Backend base URL, overriding the config file and HRDESK_API_URL
  #[arg(long)]
  api_url: Option<String>,

  /// Keep the session in memory only; nothing is written to disk
  #[arg(long)]
  ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log_directory()?)?;

  let base_url = config.api_url(args.api_url.as_deref())?;
  info!(%base_url, ephemeral = args.ephemeral, "starting hrdesk");

  let storage: Arc<dyn LocalStorage> = if args.ephemeral {
    Arc::new(MemoryStorage::new())
  } else {
    match &config.storage.path {
      Some(path) => Arc::new(SqliteStorage::open(path)?),
      None => Arc::new(SqliteStorage::open_default()?),
    }
  };
  let session = Arc::new(SessionStore::restore(storage)?);

  let http = HttpClient::new(
    base_url.clone(),
    Arc::new(ReqwestTransport::new()),
    session.clone(),
  );
  let api = CachedHrApi::new(HrApi::new(http), QueryCache::new());
  let (ctx, toasts) = AppContext::new(api, session);

  let mut app = app::App::new(ctx, toasts, config.title(), base_url.as_str());
  app.run().await?;

  info!("bye");
  Ok(())
}
