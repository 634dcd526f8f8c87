//! PostgREST-backed store for a hosted Supabase project

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::{apply_patch, InsightStore, StoreError};
use crate::server::models::insight::{Insight, InsightPatch};

/// Connection settings for the Supabase REST endpoint
#[derive(Clone)]
pub struct SupabaseConfig {
  /// Project URL, e.g. "https://abc.supabase.co"
  pub url: String,
  /// Service or anon key, sent both as `apikey` and bearer token
  pub key: String,
  pub table: String,
}

pub struct SupabaseStore {
  client: Client,
  endpoint: Url,
  key: String,
}

/// Error body returned by PostgREST
#[derive(Deserialize)]
struct PostgrestError {
  message: String,
}

impl SupabaseStore {
  pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
    let endpoint = table_endpoint(&config.url, &config.table)?;
    Ok(Self { client: Client::new(), endpoint, key: config.key })
  }

  fn url(&self, query: &[(&str, &str)]) -> Url {
    let mut url = self.endpoint.clone();
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    url
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    self.client.request(method, url).header("apikey", &self.key).bearer_auth(&self.key)
  }

  /// Raw PostgREST rows, after the status check
  async fn send_raw(&self, builder: RequestBuilder) -> Result<Vec<Value>, StoreError> {
    let response = builder.send().await.map_err(|e| StoreError::Persistence(e.to_string()))?;
    rows(response).await
  }

  /// Rows decoded as insights; any bad row fails the call
  async fn send(&self, builder: RequestBuilder) -> Result<Vec<Insight>, StoreError> {
    self.send_raw(builder).await?.into_iter().map(decode_row).collect()
  }
}

/// Build `{project}/rest/v1/{table}` from the project URL
fn table_endpoint(project_url: &str, table: &str) -> Result<Url, StoreError> {
  let base = format!("{}/", project_url.trim_end_matches('/'));
  Url::parse(&base)
    .and_then(|base| base.join(&format!("rest/v1/{table}")))
    .map_err(|e| StoreError::Persistence(format!("invalid Supabase URL '{project_url}': {e}")))
}

fn id_filter(id: Uuid) -> String {
  format!("eq.{id}")
}

fn error_message(status: StatusCode, body: &str) -> String {
  serde_json::from_str::<PostgrestError>(body)
    .map(|error| error.message)
    .unwrap_or_else(|_| format!("HTTP {status}"))
}

async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(StoreError::Persistence(error_message(status, &body)));
  }

  response
    .json()
    .await
    .map_err(|e| StoreError::Persistence(format!("unexpected response body: {e}")))
}

fn decode_row(row: Value) -> Result<Insight, StoreError> {
  let insight: Insight = serde_json::from_value(row)
    .map_err(|e| StoreError::Persistence(format!("unreadable insight row: {e}")))?;

  if !insight.is_consistent() {
    return Err(StoreError::Persistence(format!(
      "row {} has metadata that does not match type '{}'",
      insight.id, insight.kind
    )));
  }
  Ok(insight)
}

#[async_trait]
impl InsightStore for SupabaseStore {
  async fn create(&self, insight: Insight) -> Result<Insight, StoreError> {
    debug!(id = %insight.id, kind = %insight.kind, "inserting insight");
    let builder = self
      .request(Method::POST, self.url(&[]))
      .header("Prefer", "return=representation")
      .json(&insight);

    self
      .send(builder)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| StoreError::Persistence("insert returned no row".to_string()))
  }

  async fn find_all(&self) -> Result<Vec<Insight>, StoreError> {
    let url = self.url(&[("select", "*"), ("order", "created_at.desc")]);
    let rows = self.send_raw(self.request(Method::GET, url)).await?;

    // One damaged row must not hide the rest of the history
    Ok(
      rows
        .into_iter()
        .filter_map(|row| match decode_row(row) {
          Ok(insight) => Some(insight),
          Err(e) => {
            warn!("skipping insight row: {e}");
            None
          }
        })
        .collect(),
    )
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Insight, StoreError> {
    let filter = id_filter(id);
    let url = self.url(&[("select", "*"), ("id", filter.as_str())]);
    self.send(self.request(Method::GET, url)).await?.into_iter().next().ok_or(StoreError::NotFound)
  }

  async fn update(&self, id: Uuid, patch: InsightPatch) -> Result<Insight, StoreError> {
    // Check the metadata shape against the stored type before writing
    let mut current = self.find_by_id(id).await?;
    apply_patch(&mut current, patch.clone())?;
    if patch.is_empty() {
      return Ok(current);
    }

    let filter = id_filter(id);
    let builder = self
      .request(Method::PATCH, self.url(&[("id", filter.as_str())]))
      .header("Prefer", "return=representation")
      .json(&patch);

    self.send(builder).await?.into_iter().next().ok_or(StoreError::NotFound)
  }

  async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
    let filter = id_filter(id);
    let builder = self
      .request(Method::DELETE, self.url(&[("id", filter.as_str())]))
      .header("Prefer", "return=representation");

    if self.send_raw(builder).await?.is_empty() {
      return Err(StoreError::NotFound);
    }
    Ok(())
  }

  fn backend(&self) -> &'static str {
    "supabase"
  }
}
