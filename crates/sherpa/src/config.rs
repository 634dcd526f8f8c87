//! Server configuration
//!
//! Read from command-line flags with environment fallbacks. The binary loads a
//! `.env` file first, so the same names work in both places.

use clap::{Args, Parser, ValueEnum};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

use crate::server::services::generation::{
  GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
use crate::server::store::SupabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("SUPABASE_URL and SUPABASE_KEY must be set for the supabase store (or use --store memory)")]
  MissingStoreCredentials,

  #[error("temperature must be between 0.0 and 2.0, got {0}")]
  InvalidTemperature(f32),
}

/// Deployment mode. Anything other than "production" is treated as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
  Development,
  Production,
}

impl Environment {
  pub fn is_production(&self) -> bool {
    matches!(self, Environment::Production)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Environment::Development => "development",
      Environment::Production => "production",
    }
  }
}

impl FromStr for Environment {
  type Err = Infallible;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "production" | "prod" => Ok(Environment::Production),
      _ => Ok(Environment::Development),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
  /// Hosted Supabase table over PostgREST
  Supabase,
  /// Process-local store, lost on restart
  Memory,
}

#[derive(Clone, Parser)]
#[command(name = "sherpa_server")]
#[command(about = "MyBizSherpa insight API server")]
#[command(version)]
pub struct ServerConfig {
  /// Address to bind
  #[arg(long, env = "HOST", default_value = "0.0.0.0")]
  pub host: IpAddr,

  /// Port to listen on
  #[arg(long, env = "PORT", default_value_t = 8000)]
  pub port: u16,

  /// Deployment environment; error details are hidden in production
  #[arg(long, env = "NODE_ENV", default_value = "development")]
  pub environment: Environment,

  #[command(flatten)]
  pub gemini: GeminiSettings,

  #[command(flatten)]
  pub store: StoreSettings,

  /// Allowed CORS origins, comma separated. Empty allows any origin.
  #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
  pub cors_origins: Vec<String>,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

#[derive(Clone, Args)]
pub struct GeminiSettings {
  /// API key for the Gemini generative language API
  #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
  pub model: String,

  #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
  pub temperature: f32,

  #[arg(long = "gemini-base-url", env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
  pub base_url: String,
}

#[derive(Clone, Args)]
pub struct StoreSettings {
  /// Where insights are persisted
  #[arg(long = "store", env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Supabase)]
  pub backend: StoreBackend,

  #[arg(long = "supabase-url", env = "SUPABASE_URL")]
  pub supabase_url: Option<String>,

  #[arg(long = "supabase-key", env = "SUPABASE_KEY", hide_env_values = true)]
  pub supabase_key: Option<String>,

  #[arg(long = "table", env = "INSIGHTS_TABLE", default_value = "insights")]
  pub table: String,
}

fn non_blank(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl ServerConfig {
  pub fn bind_addr(&self) -> SocketAddr {
    SocketAddr::new(self.host, self.port)
  }

  /// Checks that must pass before the server starts
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&self.gemini.temperature) {
      return Err(ConfigError::InvalidTemperature(self.gemini.temperature));
    }
    if self.store.backend == StoreBackend::Supabase {
      self.store.supabase_config()?;
    }
    Ok(())
  }

  /// Explicit origin list, blanks removed
  pub fn allowed_origins(&self) -> Vec<String> {
    self
      .cors_origins
      .iter()
      .map(|origin| origin.trim().trim_end_matches('/').to_string())
      .filter(|origin| !origin.is_empty())
      .collect()
  }
}

impl GeminiSettings {
  pub fn client_config(&self) -> GeminiConfig {
    GeminiConfig {
      api_key: non_blank(&self.api_key),
      model: self.model.clone(),
      temperature: self.temperature,
      base_url: self.base_url.clone(),
    }
  }
}

impl StoreSettings {
  pub fn supabase_config(&self) -> Result<SupabaseConfig, ConfigError> {
    match (non_blank(&self.supabase_url), non_blank(&self.supabase_key)) {
      (Some(url), Some(key)) => Ok(SupabaseConfig { url, key, table: self.table.clone() }),
      _ => Err(ConfigError::MissingStoreCredentials),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> ServerConfig {
    let mut argv = vec!["sherpa_server"];
    argv.extend_from_slice(args);
    ServerConfig::try_parse_from(argv).unwrap()
  }

  #[test]
  fn test_environment_parsing_is_lenient() {
    assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
    assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
    assert_eq!("test".parse::<Environment>().unwrap(), Environment::Development);
    assert!(!Environment::Development.is_production());
  }

  #[test]
  fn test_flags_override_defaults() {
    let config = parse(&[
      "--port",
      "7000",
      "--environment",
      "production",
      "--store",
      "memory",
      "--gemini-api-key",
      "abc",
      "--cors-origins",
      "https://app.example.com/, http://localhost:3000",
    ]);

    assert_eq!(config.port, 7000);
    assert!(config.environment.is_production());
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.gemini.client_config().api_key.as_deref(), Some("abc"));
    assert_eq!(config.allowed_origins(), vec!["https://app.example.com", "http://localhost:3000"]);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_blank_api_key_means_unconfigured() {
    let config = parse(&["--store", "memory", "--gemini-api-key", "  "]);
    assert!(config.gemini.client_config().api_key.is_none());
  }

  #[test]
  fn test_supabase_backend_requires_credentials() {
    let config = parse(&["--store", "supabase", "--supabase-url", "https://abc.supabase.co", "--supabase-key", ""]);
    assert!(matches!(config.validate(), Err(ConfigError::MissingStoreCredentials)));

    let config = parse(&[
      "--store",
      "supabase",
      "--supabase-url",
      "https://abc.supabase.co",
      "--supabase-key",
      "key",
    ]);
    assert!(config.validate().is_ok());
    assert_eq!(config.store.supabase_config().unwrap().table, "insights");
  }

  #[test]
  fn test_out_of_range_temperature_is_rejected() {
    let config = parse(&["--store", "memory", "--temperature", "3.5"]);
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTemperature(_))));
  }
}
