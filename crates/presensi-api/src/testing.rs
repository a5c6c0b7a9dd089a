//! Request helpers shared by the handler tests.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, header},
  response::Response,
};
use presensi_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt as _;

use crate::{AppState, api_router};

pub async fn make_state() -> AppState<SqliteStore> {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let changes = store.changes();
  AppState::new(store, changes, "SMP Negeri 1")
}

pub async fn send(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  api_router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

pub async fn read_json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// POST `body` to `uri` and return the created resource.
pub async fn create(
  state: &AppState<SqliteStore>,
  uri: &str,
  body: Value,
) -> Value {
  let resp = send(state, "POST", uri, Some(body)).await;
  assert!(resp.status().is_success(), "POST {uri}: {}", resp.status());
  read_json(resp).await
}
