//! Handlers for `/journals` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/journals` | `?from=&to=` required, optional `kelas`, `subject` |
//! | `POST` | `/journals` | Session plus per-student marks, written atomically |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use presensi_core::{
  DateRange,
  attendance::SubjectLog,
  journal::{JournalEntry, NewJournal},
  store::{AttendanceStore, JournalQuery},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kelas:   Option<String>,
  pub subject: Option<String>,
  pub from:    Option<String>,
  pub to:      Option<String>,
}

/// `GET /journals?from=YYYY-MM-DD&to=YYYY-MM-DD[&kelas=..][&subject=..]`
pub async fn list<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
  let query = JournalQuery {
    range:   DateRange::parse(params.from.as_deref(), params.to.as_deref())?,
    kelas:   params.kelas.filter(|k| !k.trim().is_empty()),
    subject: params.subject.filter(|s| !s.trim().is_empty()),
  };
  let journals = state
    .store
    .list_journals(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(journals))
}

#[derive(Debug, Serialize)]
pub struct RecordedJournal {
  pub journal:    JournalEntry,
  pub attendance: Vec<SubjectLog>,
}

/// `POST /journals`
pub async fn create<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewJournal>,
) -> Result<impl IntoResponse, ApiError> {
  if body.kelas.trim().is_empty() || body.subject.trim().is_empty() {
    return Err(ApiError::BadRequest("kelas and subject are required".into()));
  }
  let (journal, attendance) = state
    .store
    .record_journal(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(RecordedJournal { journal, attendance })))
}
