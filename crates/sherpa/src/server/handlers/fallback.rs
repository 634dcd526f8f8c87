use axum::extract::Extension;

use crate::server::error::ApiError;
use crate::server::middleware::RequestContext;

/// Any path or method the router does not know
pub async fn route_not_found(Extension(context): Extension<RequestContext>) -> ApiError {
  let error = ApiError::RouteNotFound;
  context.log_failure(&error);
  error
}
