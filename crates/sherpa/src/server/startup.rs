//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ServerConfig, StoreBackend};
use crate::server::routing::create_app;
use crate::server::services::generation::{GeminiClient, GenerationProvider};
use crate::server::services::insights::InsightService;
use crate::server::state::AppState;
use crate::server::store::{InsightStore, MemoryStore, SupabaseStore};

/// Wire the generation client and store named by the configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
  let client = GeminiClient::new(config.gemini.client_config());
  if !client.is_configured() {
    warn!("GEMINI_API_KEY is not set; insight generation requests will fail until it is");
  }
  let model = client.model().to_string();

  let store: Arc<dyn InsightStore> = match config.store.backend {
    StoreBackend::Memory => Arc::new(MemoryStore::new()),
    StoreBackend::Supabase => {
      let supabase = config.store.supabase_config()?;
      Arc::new(SupabaseStore::new(supabase).context("Failed to create Supabase client")?)
    }
  };

  info!(model = %model, store = store.backend(), "insight pipeline ready");
  Ok(AppState::new(InsightService::new(Arc::new(client)), store, config.clone()))
}

/// Start the REST server and run until ctrl-c or SIGTERM
pub async fn start_server(config: ServerConfig) -> Result<()> {
  config.validate()?;

  let addr = config.bind_addr();
  info!(
    environment = config.environment.as_str(),
    "Starting MyBizSherpa API v{} on {addr}",
    env!("CARGO_PKG_VERSION")
  );

  let state = build_state(&config)?;
  let app = create_app(state);

  let listener = TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;
  info!("Server listening on {addr}");
  info!("Health check: http://localhost:{}/api/health", config.port);

  serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

  info!("Server shutdown gracefully");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!("Failed to listen for ctrl-c: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(e) => {
        warn!("Failed to listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn test_memory_backend_builds_without_credentials() {
    let config = ServerConfig::try_parse_from(["sherpa_server", "--store", "memory"]).unwrap();
    let state = build_state(&config).unwrap();
    assert_eq!(state.store.backend(), "memory");
  }

  #[test]
  fn test_supabase_backend_without_credentials_fails() {
    let config = ServerConfig::try_parse_from([
      "sherpa_server",
      "--store",
      "supabase",
      "--supabase-url",
      "",
      "--supabase-key",
      "",
    ])
    .unwrap();
    assert!(build_state(&config).is_err());
  }
}
