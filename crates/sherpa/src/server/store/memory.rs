use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{apply_patch, InsightStore, StoreError};
use crate::server::models::insight::{Insight, InsightPatch};

/// In-process store. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
  rows: RwLock<Vec<Insight>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn len(&self) -> usize {
    self.rows.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.rows.read().await.is_empty()
  }
}

#[async_trait]
impl InsightStore for MemoryStore {
  async fn create(&self, insight: Insight) -> Result<Insight, StoreError> {
    let mut rows = self.rows.write().await;
    if rows.iter().any(|row| row.id == insight.id) {
      return Err(StoreError::Persistence(format!("duplicate key value for id {}", insight.id)));
    }
    rows.push(insight.clone());
    Ok(insight)
  }

  async fn find_all(&self) -> Result<Vec<Insight>, StoreError> {
    let rows = self.rows.read().await;
    // Reverse first so equal timestamps keep newest-inserted first after the stable sort
    let mut ordered: Vec<Insight> = rows.iter().rev().cloned().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ordered)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Insight, StoreError> {
    let rows = self.rows.read().await;
    rows.iter().find(|row| row.id == id).cloned().ok_or(StoreError::NotFound)
  }

  async fn update(&self, id: Uuid, patch: InsightPatch) -> Result<Insight, StoreError> {
    let mut rows = self.rows.write().await;
    let row = rows.iter_mut().find(|row| row.id == id).ok_or(StoreError::NotFound)?;

    let mut updated = row.clone();
    apply_patch(&mut updated, patch)?;
    *row = updated.clone();
    Ok(updated)
  }

  async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
    let mut rows = self.rows.write().await;
    let before = rows.len();
    rows.retain(|row| row.id != id);
    if rows.len() == before {
      return Err(StoreError::NotFound);
    }
    Ok(())
  }

  fn backend(&self) -> &'static str {
    "memory"
  }
}
