use axum::response::Html;

const INDEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));

/// GET / - The single-page insight UI
pub async fn index() -> Html<&'static str> {
  Html(INDEX)
}
