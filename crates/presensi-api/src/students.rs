//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Optional `?kelas=7A` |
//! | `POST`   | `/students` | Body: `{"nisn":"..","name":"..","kelas":".."}` |
//! | `GET`    | `/students/{id}` | 404 if not found |
//! | `DELETE` | `/students/{id}` | Also removes the student's records |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use presensi_core::{
  roster::{NewStudent, Student},
  store::AttendanceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kelas: Option<String>,
}

/// `GET /students[?kelas=<class>]`
pub async fn list<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError> {
  let students = state
    .store
    .list_students(params.kelas.filter(|k| !k.trim().is_empty()))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /students`
pub async fn create<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError> {
  for (field, value) in [("nisn", &body.nisn), ("name", &body.name), ("kelas", &body.kelas)] {
    if value.trim().is_empty() {
      return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
  }
  let student = state.store.add_student(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError> {
  let student = state
    .store
    .get_student(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(student))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /students/{id}`
pub async fn remove<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if state.store.remove_student(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("student {id} not found")))
  }
}
