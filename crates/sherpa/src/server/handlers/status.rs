//! Health and connectivity endpoint handlers

use axum::{
  extract::{rejection::JsonRejection, Extension, State},
  response::Json,
};
use chrono::{SecondsFormat, Utc};

use crate::server::middleware::RequestContext;
use crate::server::state::AppState;
use crate::server::types::{ConnectionTestResponse, EchoResponse, HealthResponse};

pub const FRONTEND_URL: &str = "http://localhost:3000";

fn timestamp() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /api/health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse {
    status: "healthy".to_string(),
    message: "MyBizSherpa API is running".to_string(),
    timestamp: timestamp(),
  })
}

/// GET /api/test - Connectivity check for the UI
pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionTestResponse> {
  Json(ConnectionTestResponse {
    message: "Frontend-Backend connection successful!".to_string(),
    timestamp: timestamp(),
    frontend_url: FRONTEND_URL.to_string(),
    backend_url: format!("http://localhost:{}", state.config.port),
  })
}

/// POST /api/test-post - Echo the request body back
pub async fn test_post(
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Json<EchoResponse> {
  let received_data = match payload {
    Ok(Json(value)) => value,
    Err(rejection) => {
      context.log_info(&format!("test POST body was not JSON: {}", rejection.body_text()));
      serde_json::Value::Null
    }
  };

  context.log_info(&format!("test POST received: {received_data}"));
  Json(EchoResponse {
    message: "Test POST successful!".to_string(),
    received_data,
    timestamp: timestamp(),
  })
}
