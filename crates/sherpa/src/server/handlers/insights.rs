//! Insights endpoint handlers

use axum::{
  extract::{
    rejection::{JsonRejection, PathRejection},
    Extension, Path, State,
  },
  response::Json,
};
use uuid::Uuid;

use crate::server::error::ApiError;
use crate::server::middleware::RequestContext;
use crate::server::models::insight::Insight;
use crate::server::state::AppState;
use crate::server::types::{LinkedinInsightRequest, TranscriptInsightRequest};

/// POST /api/transcript-insight - Generate and store a transcript review
pub async fn create_transcript_insight(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<TranscriptInsightRequest>, JsonRejection>,
) -> Result<Json<Insight>, ApiError> {
  let outcome = async {
    let Json(request) = payload?;
    let submission = request.into_submission()?;
    let insight = state.insights.transcript_insight(submission).await?;
    Ok::<_, ApiError>(state.store.create(insight).await?)
  }
  .await;

  respond(&context, outcome)
}

/// POST /api/linkedin-insight - Generate and store an outreach icebreaker
pub async fn create_linkedin_insight(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<LinkedinInsightRequest>, JsonRejection>,
) -> Result<Json<Insight>, ApiError> {
  let outcome = async {
    let Json(request) = payload?;
    let submission = request.into_submission()?;
    let insight = state.insights.linkedin_insight(submission).await?;
    Ok::<_, ApiError>(state.store.create(insight).await?)
  }
  .await;

  respond(&context, outcome)
}

/// GET /api/insights - All insights, newest first
pub async fn list_insights(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> Result<Json<Vec<Insight>>, ApiError> {
  match state.store.find_all().await {
    Ok(insights) => Ok(Json(insights)),
    Err(e) => {
      let error = ApiError::from(e);
      context.log_failure(&error);
      Err(error)
    }
  }
}

/// GET /api/insights/{id} - A single insight
pub async fn get_insight(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<Insight>, ApiError> {
  // Ids that are not UUIDs (or not even UTF-8) cannot exist in the store
  let id = path.ok().and_then(|Path(id)| Uuid::parse_str(&id).ok());
  let outcome = match id {
    Some(id) => state.store.find_by_id(id).await.map_err(ApiError::from),
    None => Err(ApiError::NotFound),
  };

  match outcome {
    Ok(insight) => Ok(Json(insight)),
    Err(error) => {
      context.log_failure(&error);
      Err(error)
    }
  }
}

fn respond(context: &RequestContext, outcome: Result<Insight, ApiError>) -> Result<Json<Insight>, ApiError> {
  match outcome {
    Ok(insight) => {
      context.log_info(&format!("Stored {} insight {}", insight.kind, insight.id));
      Ok(Json(insight))
    }
    Err(error) => {
      context.log_failure(&error);
      Err(error)
    }
  }
}
