//! Handlers for `/teachers` endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use presensi_core::{
  roster::{NewTeacher, Teacher},
  store::AttendanceStore,
};

use crate::{AppState, error::ApiError};

/// `GET /teachers`
pub async fn list<S: AttendanceStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Teacher>>, ApiError> {
  let teachers = state.store.list_teachers().await.map_err(ApiError::store)?;
  Ok(Json(teachers))
}

/// `POST /teachers`, body: `{"nip":"..","name":"..","homeroom_of":"7A"}`
pub async fn create<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError> {
  if body.nip.trim().is_empty() || body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("nip and name are required".into()));
  }
  let teacher = state.store.add_teacher(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(teacher)))
}
