//! `POST /discipline`: record a behavioural note.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use presensi_core::{discipline::NewDisciplineNote, store::AttendanceStore};

use crate::{AppState, error::ApiError};

pub async fn create<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewDisciplineNote>,
) -> Result<impl IntoResponse, ApiError> {
  if body.category.trim().is_empty() {
    return Err(ApiError::BadRequest("category is required".into()));
  }
  let note = state
    .store
    .record_discipline(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(note)))
}
