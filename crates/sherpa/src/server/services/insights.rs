//! Insight Service: build prompt, call the provider, shape the record

use std::sync::Arc;
use tracing::info;

use crate::server::models::insight::{Insight, InsightMetadata, LinkedinMetadata, TranscriptMetadata};
use crate::server::services::generation::{GenerationError, GenerationProvider};
use crate::server::services::prompts;

/// A validated transcript submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSubmission {
  pub transcript: String,
  pub company_name: String,
  pub attendees: Vec<String>,
  pub date: String,
}

/// A validated LinkedIn submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedinSubmission {
  pub linkedin_bio: String,
  pub pitch_deck: String,
  pub company_name: String,
  pub role: String,
}

pub struct InsightService {
  provider: Arc<dyn GenerationProvider>,
}

impl InsightService {
  pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
    Self { provider }
  }

  pub fn is_configured(&self) -> bool {
    self.provider.is_configured()
  }

  /// Generate coaching feedback for a transcript. The returned insight is not
  /// yet persisted.
  pub async fn transcript_insight(
    &self,
    submission: TranscriptSubmission,
  ) -> Result<Insight, GenerationError> {
    self.ensure_configured()?;

    let prompt = prompts::build_transcript_prompt(
      &submission.transcript,
      &submission.company_name,
      &submission.attendees,
      &submission.date,
    );
    let content = self.complete(&prompt).await?;

    let metadata = InsightMetadata::Transcript(TranscriptMetadata {
      company_name: submission.company_name,
      attendees: submission.attendees,
      date: submission.date,
    });
    Ok(Insight::new(content, metadata))
  }

  /// Generate an outreach icebreaker. Bio and deck feed the prompt only.
  pub async fn linkedin_insight(
    &self,
    submission: LinkedinSubmission,
  ) -> Result<Insight, GenerationError> {
    self.ensure_configured()?;

    let prompt = prompts::build_linkedin_prompt(
      &submission.linkedin_bio,
      &submission.pitch_deck,
      &submission.company_name,
      &submission.role,
    );
    let content = self.complete(&prompt).await?;

    let metadata = InsightMetadata::Linkedin(LinkedinMetadata {
      company_name: submission.company_name,
      role: submission.role,
    });
    Ok(Insight::new(content, metadata))
  }

  fn ensure_configured(&self) -> Result<(), GenerationError> {
    if self.provider.is_configured() {
      Ok(())
    } else {
      Err(GenerationError::NotConfigured)
    }
  }

  async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
    let started = std::time::Instant::now();
    let text = self.provider.generate(prompt).await?;
    if text.trim().is_empty() {
      return Err(GenerationError::EmptyCompletion);
    }

    info!(
      prompt_chars = prompt.len(),
      completion_chars = text.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "generation completed"
    );
    Ok(text)
  }
}
