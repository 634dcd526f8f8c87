//! REST API request and response types
//!
//! Request bodies are decoded leniently (every field optional) and then checked
//! in one place so a missing field always yields the same 400 message.

use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::services::insights::{LinkedinSubmission, TranscriptSubmission};

pub const TRANSCRIPT_FIELDS_MESSAGE: &str =
  "Missing required fields: transcript, company_name, attendees, date";
pub const LINKEDIN_FIELDS_MESSAGE: &str =
  "Missing required fields: linkedin_bio, pitch_deck, company_name, role";

// Status Endpoints
// ================

/// Response for GET /api/health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status: String,
  pub message: String,
  pub timestamp: String,
}

/// Response for GET /api/test
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionTestResponse {
  pub message: String,
  pub timestamp: String,
  pub frontend_url: String,
  pub backend_url: String,
}

/// Response for POST /api/test-post
#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
  pub message: String,
  pub received_data: serde_json::Value,
  pub timestamp: String,
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub detail: Option<String>,
}

// Insight Endpoints
// =================

/// Attendees arrive either as "Jo, Sam" or as ["Jo", "Sam"]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Attendees {
  List(Vec<String>),
  Joined(String),
}

impl Attendees {
  /// Split, trim and drop blank entries, keeping order
  pub fn normalize(self) -> Vec<String> {
    let names: Vec<String> = match self {
      Attendees::List(names) => names,
      Attendees::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    names.into_iter().map(|name| name.trim().to_string()).filter(|name| !name.is_empty()).collect()
  }
}

/// Request for POST /api/transcript-insight
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptInsightRequest {
  #[serde(default)]
  pub transcript: Option<String>,
  #[serde(default)]
  pub company_name: Option<String>,
  #[serde(default)]
  pub attendees: Option<Attendees>,
  #[serde(default)]
  pub date: Option<String>,
}

/// Request for POST /api/linkedin-insight
#[derive(Debug, Default, Deserialize)]
pub struct LinkedinInsightRequest {
  #[serde(default)]
  pub linkedin_bio: Option<String>,
  #[serde(default)]
  pub pitch_deck: Option<String>,
  #[serde(default)]
  pub company_name: Option<String>,
  #[serde(default)]
  pub role: Option<String>,
}

/// Present and not just whitespace. The value itself is kept verbatim.
fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

impl TranscriptInsightRequest {
  pub fn into_submission(self) -> Result<TranscriptSubmission, ApiError> {
    let attendees = self.attendees.map(Attendees::normalize).filter(|names| !names.is_empty());

    match (present(self.transcript), present(self.company_name), attendees, present(self.date)) {
      (Some(transcript), Some(company_name), Some(attendees), Some(date)) => {
        Ok(TranscriptSubmission { transcript, company_name, attendees, date })
      }
      _ => Err(ApiError::Validation(TRANSCRIPT_FIELDS_MESSAGE.to_string())),
    }
  }
}

impl LinkedinInsightRequest {
  pub fn into_submission(self) -> Result<LinkedinSubmission, ApiError> {
    match (
      present(self.linkedin_bio),
      present(self.pitch_deck),
      present(self.company_name),
      present(self.role),
    ) {
      (Some(linkedin_bio), Some(pitch_deck), Some(company_name), Some(role)) => {
        Ok(LinkedinSubmission { linkedin_bio, pitch_deck, company_name, role })
      }
      _ => Err(ApiError::Validation(LINKEDIN_FIELDS_MESSAGE.to_string())),
    }
  }
}
