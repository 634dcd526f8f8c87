//! HTTP-facing error taxonomy
//!
//! Every failure a handler can produce maps onto one of these variants, and
//! every variant renders as `{"error": "..."}` with a JSON content type.

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::server::services::generation::GenerationError;
use crate::server::store::StoreError;
use crate::server::types::ErrorBody;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed request fields
  #[error("{0}")]
  Validation(String),

  /// Provider credentials are absent
  #[error("{0}")]
  Configuration(String),

  #[error("{0}")]
  Generation(String),

  #[error("{0}")]
  Persistence(String),

  #[error("Insight not found")]
  NotFound,

  #[error("Route not found")]
  RouteNotFound,

  /// Catch-all. `detail` is only filled outside production.
  #[error("Internal server error")]
  Unhandled { detail: Option<String> },
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
      ApiError::Configuration(_)
      | ApiError::Generation(_)
      | ApiError::Persistence(_)
      | ApiError::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Stable key for log correlation
  pub fn key(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "validation_error",
      ApiError::Configuration(_) => "configuration_error",
      ApiError::Generation(_) => "generation_failure",
      ApiError::Persistence(_) => "persistence_failure",
      ApiError::NotFound => "not_found",
      ApiError::RouteNotFound => "route_not_found",
      ApiError::Unhandled { .. } => "unhandled_error",
    }
  }
}

impl From<GenerationError> for ApiError {
  fn from(error: GenerationError) -> Self {
    match error {
      GenerationError::NotConfigured => ApiError::Configuration(error.to_string()),
      other => ApiError::Generation(other.to_string()),
    }
  }
}

impl From<StoreError> for ApiError {
  fn from(error: StoreError) -> Self {
    match error {
      StoreError::NotFound => ApiError::NotFound,
      other => ApiError::Persistence(other.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let detail = match &self {
      ApiError::Unhandled { detail } => detail.clone(),
      _ => None,
    };
    let body = ErrorBody { error: self.to_string(), detail };
    (self.status(), Json(body)).into_response()
  }
}
