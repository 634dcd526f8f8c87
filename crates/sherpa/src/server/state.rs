use std::sync::Arc;

use crate::config::ServerConfig;
use crate::server::services::insights::InsightService;
use crate::server::store::InsightStore;

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
  pub insights: Arc<InsightService>,
  pub store: Arc<dyn InsightStore>,
  pub config: Arc<ServerConfig>,
}

impl AppState {
  pub fn new(insights: InsightService, store: Arc<dyn InsightStore>, config: ServerConfig) -> Self {
    Self { insights: Arc::new(insights), store, config: Arc::new(config) }
  }
}
