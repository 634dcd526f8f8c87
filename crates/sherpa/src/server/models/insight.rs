//! Insight records as stored in the `insights` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The two kinds of insight the service produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
  Transcript,
  Linkedin,
}

impl InsightKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      InsightKind::Transcript => "transcript",
      InsightKind::Linkedin => "linkedin",
    }
  }
}

impl fmt::Display for InsightKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Metadata kept for a transcript review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
  pub company_name: String,
  pub attendees: Vec<String>,
  pub date: String,
}

/// Metadata kept for a LinkedIn icebreaker. Bio and deck text are only
/// used for generation and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedinMetadata {
  pub company_name: String,
  pub role: String,
}

/// Structured metadata; the shape is tied to the insight kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsightMetadata {
  Transcript(TranscriptMetadata),
  Linkedin(LinkedinMetadata),
}

impl InsightMetadata {
  pub fn kind(&self) -> InsightKind {
    match self {
      InsightMetadata::Transcript(_) => InsightKind::Transcript,
      InsightMetadata::Linkedin(_) => InsightKind::Linkedin,
    }
  }
}

/// A persisted insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
  pub id: Uuid,

  #[serde(rename = "type")]
  pub kind: InsightKind,

  /// Generated text, display only
  pub content: String,

  pub metadata: InsightMetadata,

  pub created_at: DateTime<Utc>,
}

impl Insight {
  /// Create a fresh insight with a new id and creation timestamp. The kind
  /// is derived from the metadata so the two can never disagree.
  pub fn new(content: String, metadata: InsightMetadata) -> Self {
    Self { id: Uuid::new_v4(), kind: metadata.kind(), content, metadata, created_at: Utc::now() }
  }

  /// Whether the stored type tag matches the metadata shape
  pub fn is_consistent(&self) -> bool {
    self.kind == self.metadata.kind()
  }
}

/// Partial update for an insight. `id`, `type` and `created_at` are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub metadata: Option<InsightMetadata>,
}

impl InsightPatch {
  pub fn is_empty(&self) -> bool {
    self.content.is_none() && self.metadata.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn transcript_metadata() -> InsightMetadata {
    InsightMetadata::Transcript(TranscriptMetadata {
      company_name: "Acme".to_string(),
      attendees: vec!["Jo".to_string(), "Sam".to_string()],
      date: "2024-01-01".to_string(),
    })
  }

  #[test]
  fn test_new_insight_takes_kind_from_metadata() {
    let insight = Insight::new("text".to_string(), transcript_metadata());
    assert_eq!(insight.kind, InsightKind::Transcript);
    assert!(insight.is_consistent());
  }

  #[test]
  fn test_serializes_with_type_tag_and_flat_metadata() {
    let insight = Insight::new("generated".to_string(), transcript_metadata());
    let value = serde_json::to_value(&insight).unwrap();

    assert_eq!(value["type"], "transcript");
    assert_eq!(value["content"], "generated");
    assert_eq!(
      value["metadata"],
      json!({"company_name": "Acme", "attendees": ["Jo", "Sam"], "date": "2024-01-01"})
    );
    assert!(value["created_at"].as_str().unwrap().ends_with('Z'));
  }

  #[test]
  fn test_linkedin_row_deserializes_to_linkedin_metadata() {
    let row = json!({
      "id": "3f1f6b8e-4f4e-4c38-9a64-0a3a4bb0e5f1",
      "type": "linkedin",
      "content": "icebreaker",
      "metadata": {"company_name": "Acme", "role": "CTO"},
      "created_at": "2024-01-01T10:00:00+00:00"
    });

    let insight: Insight = serde_json::from_value(row).unwrap();
    assert_eq!(
      insight.metadata,
      InsightMetadata::Linkedin(LinkedinMetadata {
        company_name: "Acme".to_string(),
        role: "CTO".to_string()
      })
    );
    assert!(insight.is_consistent());
  }

  #[test]
  fn test_mismatched_row_is_flagged_inconsistent() {
    let row = json!({
      "id": "3f1f6b8e-4f4e-4c38-9a64-0a3a4bb0e5f1",
      "type": "transcript",
      "content": "x",
      "metadata": {"company_name": "Acme", "role": "CTO"},
      "created_at": "2024-01-01T10:00:00Z"
    });

    let insight: Insight = serde_json::from_value(row).unwrap();
    assert!(!insight.is_consistent());
  }

  #[test]
  fn test_patch_skips_absent_fields() {
    let patch = InsightPatch { content: Some("new".to_string()), metadata: None };
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"content": "new"}));
    assert!(InsightPatch::default().is_empty());
  }
}
