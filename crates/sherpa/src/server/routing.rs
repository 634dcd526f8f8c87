//! Axum router configuration for all endpoints

use axum::{
  http::{HeaderValue, Method},
  middleware,
  response::{IntoResponse, Response},
  routing::{get, post},
  Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing::{error, warn};

use crate::config::ServerConfig;
use crate::server::error::ApiError;
use crate::server::handlers::{fallback, insights, status, ui};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Route table without cross-cutting layers
pub fn create_router(state: AppState) -> Router {
  Router::new()
    .route("/", get(ui::index))
    // Status endpoints
    .route("/api/health", get(status::health))
    .route("/api/test", get(status::test_connection))
    .route("/api/test-post", post(status::test_post))
    // Insight endpoints
    .route("/api/transcript-insight", post(insights::create_transcript_insight))
    .route("/api/linkedin-insight", post(insights::create_linkedin_insight))
    .route("/api/insights", get(insights::list_insights))
    .route("/api/insights/{id}", get(insights::get_insight))
    .fallback(fallback::route_not_found)
    .method_not_allowed_fallback(fallback::route_not_found)
    // Added after the routes so it wraps the fallbacks too
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}

/// Full application: routes plus tracing, CORS and panic recovery
pub fn create_app(state: AppState) -> Router {
  let expose_details = !state.config.environment.is_production();
  let cors = cors_layer(&state.config);

  create_router(state).layer(
    ServiceBuilder::new()
      .layer(TraceLayer::new_for_http())
      .layer(cors)
      .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
        panic_response(panic, expose_details)
      })),
  )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
  let origins: Vec<HeaderValue> = config
    .allowed_origins()
    .into_iter()
    .filter_map(|origin| match HeaderValue::from_str(&origin) {
      Ok(value) => Some(value),
      Err(_) => {
        warn!(origin = %origin, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  if origins.is_empty() {
    return CorsLayer::permissive();
  }

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([axum::http::header::CONTENT_TYPE])
    .allow_credentials(true)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else if let Some(message) = panic.downcast_ref::<&str>() {
    message.to_string()
  } else {
    "unknown panic".to_string()
  }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
  let message = panic_message(&*panic);
  error!(panic = %message, "handler panicked");

  let detail = expose_details.then_some(message);
  ApiError::Unhandled { detail }.into_response()
}
