//! Request context middleware
//!
//! Every request gets an id and a `RequestContext` extension that handlers use
//! to log with the same correlation data the access log carries.

use axum::{
  extract::Request,
  http::{HeaderMap, HeaderValue, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::server::error::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request metadata shared with handlers
#[derive(Clone, Debug)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  pub user_agent: String,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: &HeaderMap) -> Self {
    let user_agent = headers
      .get("user-agent")
      .and_then(|v| v.to_str().ok())
      .unwrap_or("none")
      .to_string();

    Self { request_id: Uuid::new_v4(), method, uri, user_agent }
  }

  pub fn log_info(&self, message: &str) {
    info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      "{message}"
    );
  }

  /// 5xx at error level, everything else at warn
  pub fn log_failure(&self, err: &ApiError) {
    let status = err.status().as_u16();
    if err.status().is_server_error() {
      error!(
        request_id = %self.request_id,
        method = %self.method,
        path = self.uri.path(),
        status,
        key = err.key(),
        "{err}"
      );
    } else {
      warn!(
        request_id = %self.request_id,
        method = %self.method,
        path = self.uri.path(),
        status,
        key = err.key(),
        "{err}"
      );
    }
  }

  fn log_request_start(&self) {
    info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      user_agent = %self.user_agent,
      "request started"
    );
  }

  fn log_request_complete(&self, status: u16, duration_ms: f64) {
    info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      status,
      duration_ms,
      "request completed"
    );
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context =
    RequestContext::new(request.method().clone(), request.uri().clone(), request.headers());

  let start_time = Instant::now();
  context.log_request_start();

  request.extensions_mut().insert(context.clone());
  let mut response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms);

  if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
  }

  response
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_context_reads_user_agent() {
    let mut headers = HeaderMap::new();
    headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));
    let context = RequestContext::new(Method::GET, Uri::from_static("/api/health"), &headers);
    assert_eq!(context.user_agent, "curl/8.0");
  }

  #[test]
  fn test_missing_user_agent_is_none() {
    let context = RequestContext::new(Method::GET, Uri::from_static("/"), &HeaderMap::new());
    assert_eq!(context.user_agent, "none");
  }
}
