//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use presensi_core::store::{FailureKind, StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend failure onto the matching response class.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.kind() {
      FailureKind::NotFound => ApiError::NotFound(e.to_string()),
      FailureKind::Conflict => ApiError::Conflict(e.to_string()),
      FailureKind::Invalid => ApiError::BadRequest(e.to_string()),
      FailureKind::Internal => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<presensi_core::Error> for ApiError {
  fn from(e: presensi_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<presensi_report::Error> for ApiError {
  fn from(e: presensi_report::Error) -> Self {
    match e {
      presensi_report::Error::Core(e) => e.into(),
      presensi_report::Error::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
