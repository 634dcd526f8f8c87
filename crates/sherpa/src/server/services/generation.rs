//! Generation Provider
//!
//! A single-prompt text completion call against Google's Gemini
//! `generateContent` endpoint. No history, no streaming, no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("Gemini API key not configured. Please set GEMINI_API_KEY in your environment variables.")]
  NotConfigured,

  #[error("AI processing failed: {0}")]
  Request(String),

  #[error("AI processing failed: the model returned no text")]
  EmptyCompletion,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
  /// False when credentials are missing; nothing should be sent in that case
  fn is_configured(&self) -> bool;

  /// Send one prompt and return the plain-text completion
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Settings for the Gemini client
#[derive(Clone)]
pub struct GeminiConfig {
  pub api_key: Option<String>,
  pub model: String,
  pub temperature: f32,
  pub base_url: String,
}

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      model: DEFAULT_MODEL.to_string(),
      temperature: DEFAULT_TEMPERATURE,
      base_url: DEFAULT_BASE_URL.to_string(),
    }
  }
}

pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

// Wire types
// ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
  contents: Vec<Content<'a>>,
  generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  role: &'static str,
  parts: Vec<OutgoingPart<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingPart<'a> {
  text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
  temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<IncomingPart>,
}

#[derive(Debug, Deserialize)]
struct IncomingPart {
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
  error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
  message: String,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Self {
    Self { client: Client::new(), config }
  }

  pub fn model(&self) -> &str {
    &self.config.model
  }

  fn api_key(&self) -> Option<&str> {
    self.config.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.config.base_url.trim_end_matches('/'), self.config.model)
  }

  fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
      contents: vec![Content { role: "user", parts: vec![OutgoingPart { text: prompt }] }],
      generation_config: GenerationConfig { temperature: self.config.temperature },
    }
  }
}

/// Join the text parts of the first candidate
fn completion_text(response: GenerateContentResponse) -> Option<String> {
  let content = response.candidates.into_iter().next()?.content?;
  let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
  if text.trim().is_empty() {
    None
  } else {
    Some(text)
  }
}

fn provider_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
  let reason = serde_json::from_str::<ErrorEnvelope>(body)
    .map(|envelope| envelope.error.message)
    .unwrap_or_else(|_| format!("provider responded with HTTP {status}"));
  GenerationError::Request(reason)
}

#[async_trait]
impl GenerationProvider for GeminiClient {
  fn is_configured(&self) -> bool {
    self.api_key().is_some()
  }

  async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
    let api_key = self.api_key().ok_or(GenerationError::NotConfigured)?;

    debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending generation request");
    let response = self
      .client
      .post(self.endpoint())
      .header("x-goog-api-key", api_key)
      .json(&self.request_body(prompt))
      .send()
      .await
      .map_err(|e| GenerationError::Request(e.to_string()))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| GenerationError::Request(e.to_string()))?;
    if !status.is_success() {
      return Err(provider_error(status, &body));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&body)
      .map_err(|e| GenerationError::Request(format!("unreadable provider response: {e}")))?;
    completion_text(parsed).ok_or(GenerationError::EmptyCompletion)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server, ServerGuard};
  use serde_json::json;

  fn client(api_key: Option<&str>) -> GeminiClient {
    GeminiClient::new(GeminiConfig { api_key: api_key.map(str::to_string), ..GeminiConfig::default() })
  }

  #[test]
  fn test_blank_key_is_not_configured() {
    assert!(!client(None).is_configured());
    assert!(!client(Some("  ")).is_configured());
    assert!(client(Some("key")).is_configured());
  }

  #[tokio::test]
  async fn test_generate_without_key_fails_before_sending() {
    let result = client(None).generate("hello").await;
    assert!(matches!(result, Err(GenerationError::NotConfigured)));
  }

  #[test]
  fn test_request_body_carries_prompt_and_temperature() {
    let client = client(Some("key"));
    let body = serde_json::to_value(client.request_body("Review this")).unwrap();
    assert_eq!(
      body,
      json!({
        "contents": [{"role": "user", "parts": [{"text": "Review this"}]}],
        "generationConfig": {"temperature": 0.7f32}
      })
    );
  }

  #[test]
  fn test_endpoint_includes_model() {
    assert_eq!(
      client(Some("key")).endpoint(),
      "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
    );
  }

  #[test]
  fn test_completion_joins_parts_of_first_candidate() {
    let response: GenerateContentResponse = serde_json::from_value(json!({
      "candidates": [
        {"content": {"role": "model", "parts": [{"text": "Went well. "}, {"text": "Try more questions."}]}},
        {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
      ]
    }))
    .unwrap();

    assert_eq!(completion_text(response).as_deref(), Some("Went well. Try more questions."));
  }

  #[test]
  fn test_blocked_prompt_has_no_completion() {
    let response: GenerateContentResponse =
      serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
    assert!(completion_text(response).is_none());
  }

  #[test]
  fn test_provider_error_surfaces_message() {
    let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
    let error = provider_error(reqwest::StatusCode::BAD_REQUEST, body);
    assert_eq!(error.to_string(), "AI processing failed: API key not valid");

    let error = provider_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "");
    assert_eq!(error.to_string(), "AI processing failed: provider responded with HTTP 503 Service Unavailable");
  }

  fn client_for(server: &ServerGuard) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
      api_key: Some("test-key".to_string()),
      base_url: server.url(),
      ..GeminiConfig::default()
    })
  }

  const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

  #[tokio::test]
  async fn test_generate_sends_key_and_prompt() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", GENERATE_PATH)
      .match_header("x-goog-api-key", "test-key")
      .match_header("content-type", "application/json")
      .match_body(Matcher::PartialJson(json!({
        "contents": [{"role": "user", "parts": [{"text": "Review this call"}]}]
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hi "},{"text":"there"}]}}]}"#)
      .create_async()
      .await;

    let result = client_for(&server).generate("Review this call").await;

    mock.assert_async().await;
    assert_eq!(result.unwrap(), "hi there");
  }

  #[tokio::test]
  async fn test_generate_surfaces_provider_error_message() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", GENERATE_PATH)
      .with_status(429)
      .with_header("content-type", "application/json")
      .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
      .create_async()
      .await;

    let error = client_for(&server).generate("hello").await.unwrap_err();
    assert_eq!(error.to_string(), "AI processing failed: Quota exceeded");
  }

  #[tokio::test]
  async fn test_generate_without_candidates_is_empty_completion() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", GENERATE_PATH)
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
      .create_async()
      .await;

    let result = client_for(&server).generate("hello").await;
    assert!(matches!(result, Err(GenerationError::EmptyCompletion)));
  }

  #[tokio::test]
  async fn test_generate_with_unreadable_body_is_request_error() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("POST", GENERATE_PATH).with_status(200).with_body("not json").create_async().await;

    let result = client_for(&server).generate("hello").await;
    assert!(matches!(result, Err(GenerationError::Request(_))));
  }
}
