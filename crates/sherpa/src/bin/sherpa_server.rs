//! MyBizSherpa API Server
//!
//! HTTP server that turns call transcripts and LinkedIn profiles into
//! AI-written sales insights and keeps a history of them.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use sherpa::config::ServerConfig;
use sherpa::server::startup::start_server;

#[tokio::main]
async fn main() {
  // Values from .env never override variables already set in the environment
  dotenvy::dotenv().ok();

  let config = ServerConfig::parse();

  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) if config.verbose => EnvFilter::new("info"),
    Err(_) => EnvFilter::new("sherpa=info,tower_http=warn,warn"),
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  if let Err(e) = start_server(config).await {
    error!("{e:#}");
    std::process::exit(1);
  }
}
