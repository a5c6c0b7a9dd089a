//! `POST /attendance/homeroom`: record or correct a homeroom status.
//!
//! Body: `{"student_id":"<uuid>","date":"2024-01-20","status":"S"}`. A second
//! write for the same student and date replaces the first.

use axum::{Json, extract::State};
use presensi_core::{
  attendance::{HomeroomRecord, NewHomeroomRecord},
  store::AttendanceStore,
};

use crate::{AppState, error::ApiError};

pub async fn upsert<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewHomeroomRecord>,
) -> Result<Json<HomeroomRecord>, ApiError> {
  let record = state
    .store
    .upsert_homeroom(body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}
