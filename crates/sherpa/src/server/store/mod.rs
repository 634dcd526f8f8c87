//! Insight Store
//!
//! CRUD contract over the `insights` table. `SupabaseStore` talks to the hosted
//! PostgREST endpoint; `MemoryStore` keeps rows in process for local runs and
//! tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::server::models::insight::{Insight, InsightPatch};

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::{SupabaseConfig, SupabaseStore};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Insight not found")]
  NotFound,

  #[error("Database error: {0}")]
  Persistence(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightStore: Send + Sync {
  /// Insert exactly the given record and return it as stored
  async fn create(&self, insight: Insight) -> Result<Insight, StoreError>;

  /// All records, newest first
  async fn find_all(&self) -> Result<Vec<Insight>, StoreError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Insight, StoreError>;

  async fn update(&self, id: Uuid, patch: InsightPatch) -> Result<Insight, StoreError>;

  async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

  /// Short backend name for logs
  fn backend(&self) -> &'static str;
}

/// Apply a patch in place, refusing metadata of the wrong shape
pub(crate) fn apply_patch(insight: &mut Insight, patch: InsightPatch) -> Result<(), StoreError> {
  if let Some(metadata) = patch.metadata {
    if metadata.kind() != insight.kind {
      return Err(StoreError::Persistence(format!(
        "metadata shape does not match insight type '{}'",
        insight.kind
      )));
    }
    insight.metadata = metadata;
  }

  if let Some(content) = patch.content {
    insight.content = content;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::server::models::insight::{InsightMetadata, LinkedinMetadata, TranscriptMetadata};

  fn linkedin() -> Insight {
    Insight::new(
      "before".to_string(),
      InsightMetadata::Linkedin(LinkedinMetadata {
        company_name: "Acme".to_string(),
        role: "CTO".to_string(),
      }),
    )
  }

  #[test]
  fn test_apply_patch_updates_content() {
    let mut insight = linkedin();
    apply_patch(&mut insight, InsightPatch { content: Some("after".to_string()), metadata: None })
      .unwrap();
    assert_eq!(insight.content, "after");
  }

  #[test]
  fn test_apply_patch_rejects_other_metadata_shape() {
    let mut insight = linkedin();
    let patch = InsightPatch {
      content: Some("after".to_string()),
      metadata: Some(InsightMetadata::Transcript(TranscriptMetadata {
        company_name: "Acme".to_string(),
        attendees: vec![],
        date: "2024-01-01".to_string(),
      })),
    };

    let err = apply_patch(&mut insight, patch).unwrap_err();
    assert!(err.to_string().starts_with("Database error: metadata shape"));
    assert_eq!(insight.content, "before");
  }
}
