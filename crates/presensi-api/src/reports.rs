//! Report endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/report-card` | `?kelas=&from=&to=` |
//! | `GET`  | `/reports/discipline` | `?from=&to=` |
//! | `GET`  | `/reports/subject` | `?kelas=&subject=&from=&to=` |
//! | `GET`  | `/reports/daily` | `?date=`, defaults to today |
//! | `GET`  | `/monitor` | Latest live snapshot for today |
//! | `GET`  | `/stats` | Public figures, numbers only |
//!
//! Dates are `YYYY-MM-DD`. Bad dates are rejected before any store access.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use presensi_core::{
  DateRange,
  date::{parse_date, today},
  store::AttendanceStore,
};
use presensi_report::assemble::{
  DailyStats, DisciplineRow, PublicStats, ReportCardRow, SubjectRecapRow,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub kelas:   Option<String>,
  pub subject: Option<String>,
  pub from:    Option<String>,
  pub to:      Option<String>,
}

impl RangeParams {
  fn range(&self) -> Result<DateRange, ApiError> {
    Ok(DateRange::parse(self.from.as_deref(), self.to.as_deref())?)
  }
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, ApiError> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

/// `GET /reports/report-card?kelas=7A&from=..&to=..`
pub async fn report_card<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<ReportCardRow>>, ApiError> {
  let kelas = required("kelas", &params.kelas)?;
  let range = params.range()?;
  Ok(Json(state.reports.report_card(kelas, range).await?))
}

/// `GET /reports/discipline?from=..&to=..`
pub async fn discipline<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<DisciplineRow>>, ApiError> {
  let range = params.range()?;
  Ok(Json(state.reports.discipline(range).await?))
}

/// `GET /reports/subject?kelas=7A&subject=IPA&from=..&to=..`
pub async fn subject<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SubjectRecapRow>>, ApiError> {
  let kelas = required("kelas", &params.kelas)?;
  let subject = required("subject", &params.subject)?;
  let range = params.range()?;
  Ok(Json(state.reports.subject_recap(kelas, subject, range).await?))
}

#[derive(Debug, Deserialize)]
pub struct DayParams {
  pub date: Option<String>,
}

/// `GET /reports/daily[?date=YYYY-MM-DD]`
pub async fn daily<S: AttendanceStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<DayParams>,
) -> Result<Json<DailyStats>, ApiError> {
  let date = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
    Some(raw) => parse_date(raw)?,
    None => today(),
  };
  Ok(Json(state.reports.daily(date).await?))
}

/// Today's snapshot from the monitor, or a fresh one if the monitor has not
/// published for today yet.
async fn current<S: AttendanceStore>(
  state: &AppState<S>,
) -> Result<DailyStats, ApiError> {
  let date = today();
  match state.monitor.latest() {
    Some(stats) if stats.date == date => Ok(Arc::unwrap_or_clone(stats)),
    _ => Ok(state.reports.daily(date).await?),
  }
}

/// `GET /monitor`
pub async fn monitor<S: AttendanceStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<DailyStats>, ApiError> {
  Ok(Json(current(&state).await?))
}

#[derive(Debug, Serialize)]
pub struct SchoolStats {
  pub school: String,
  #[serde(flatten)]
  pub stats:  PublicStats,
}

/// `GET /stats`
pub async fn stats<S: AttendanceStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<SchoolStats>, ApiError> {
  let stats = current(&state).await?.public();
  Ok(Json(SchoolStats { school: state.school_name.to_string(), stats }))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::StatusCode;
  use chrono::NaiveDate;
  use presensi_core::date::today;
  use presensi_store_sqlite::SqliteStore;
  use serde_json::{Value, json};

  use crate::{
    AppState,
    testing::{create, make_state, read_json, send},
  };

  /// Two students in 7A, one teacher, one IPA session on 2024-01-20 where
  /// Budi was marked `A` and Ani `I`, and a homeroom `S` for Budi that day.
  async fn seeded() -> (AppState<SqliteStore>, Value, Value) {
    let state = make_state().await;
    let t = create(&state, "/teachers", json!({"nip": "1", "name": "Bu Sari"})).await;
    let budi =
      create(&state, "/students", json!({"nisn": "1", "name": "Budi", "kelas": "7A"})).await;
    let ani =
      create(&state, "/students", json!({"nisn": "2", "name": "Ani", "kelas": "7A"})).await;
    let recorded = create(
      &state,
      "/journals",
      json!({
        "teacher_id": t["teacher_id"],
        "kelas": "7A",
        "subject": "IPA",
        "hours": "1-2",
        "created_at": "2024-01-20T02:00:00Z",
        "attendance": [
          {"student_id": budi["student_id"], "status": "A"},
          {"student_id": ani["student_id"], "status": "I"},
        ],
      }),
    )
    .await;
    create(
      &state,
      "/discipline",
      json!({
        "student_id": ani["student_id"],
        "category": "phone",
        "note": "phone in class",
        "journal_id": recorded["journal"]["journal_id"],
        "created_at": "2024-01-20T03:00:00Z",
      }),
    )
    .await;
    create(
      &state,
      "/attendance/homeroom",
      json!({"student_id": budi["student_id"], "date": "2024-01-20", "status": "S"}),
    )
    .await;
    (state, budi, ani)
  }

  #[tokio::test]
  async fn report_card_uses_reconciled_statuses() {
    let (state, _, _) = seeded().await;
    let resp = send(
      &state,
      "GET",
      "/reports/report-card?kelas=7A&from=2024-01-01&to=2024-01-31",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = read_json(resp).await;
    assert_eq!(rows[0]["student"]["name"], "Ani");
    assert_eq!(rows[0]["I"], 1);
    assert_eq!(rows[1]["student"]["name"], "Budi");
    assert_eq!(rows[1]["S"], 1);
    assert_eq!(rows[1]["A"], 0);
    assert_eq!(rows[1]["total_absence"], 1);
  }

  #[tokio::test]
  async fn discipline_lists_noted_students_with_reporter() {
    let (state, _, _) = seeded().await;
    let rows = read_json(
      send(&state, "GET", "/reports/discipline?from=2024-01-01&to=2024-01-31", None).await,
    )
    .await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["student"]["name"], "Ani");
    assert_eq!(rows[0]["notes"][0]["reporter"], "Bu Sari");
  }

  #[tokio::test]
  async fn subject_recap_reports_percentages() {
    let (state, _, _) = seeded().await;
    let rows = read_json(
      send(
        &state,
        "GET",
        "/reports/subject?kelas=7A&subject=IPA&from=2024-01-01&to=2024-01-31",
        None,
      )
      .await,
    )
    .await;
    assert_eq!(rows[0]["meetings"], 1);
    assert_eq!(rows[0]["percentage"], 0.0);
  }

  #[tokio::test]
  async fn daily_for_a_given_date() {
    let (state, _, _) = seeded().await;
    let stats =
      read_json(send(&state, "GET", "/reports/daily?date=2024-01-20", None).await).await;
    assert_eq!(stats["total_students"], 2);
    assert_eq!(stats["present_students"], 0);
    assert_eq!(stats["journal_count"], 1);
  }

  #[tokio::test]
  async fn report_parameters_are_validated() {
    let state = make_state().await;
    for uri in [
      "/reports/report-card?from=2024-01-01&to=2024-01-31",
      "/reports/report-card?kelas=7A&from=2024-01-31&to=2024-01-01",
      "/reports/discipline?from=2024-01-01",
      "/reports/subject?kelas=7A&from=2024-01-01&to=2024-01-31",
      "/reports/daily?date=tomorrow",
    ] {
      let resp = send(&state, "GET", uri, None).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
  }

  #[tokio::test]
  async fn stats_expose_numbers_only() {
    let state = make_state().await;
    create(&state, "/students", json!({"nisn": "1", "name": "Budi", "kelas": "7A"})).await;

    let resp = send(&state, "GET", "/stats", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["school"], "SMP Negeri 1");
    assert_eq!(body["date"], today().to_string());
    assert!(!body.to_string().contains("Budi"));
  }

  #[tokio::test]
  async fn snapshot_from_an_earlier_day_is_not_served() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let changes = store.changes();
    let state = AppState::with_clock(store, changes, "SMP Negeri 1", || {
      NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    });
    let mut rx = state.monitor.subscribe();
    rx.wait_for(Option::is_some).await.unwrap();
    assert_eq!(state.monitor.latest().unwrap().date.to_string(), "2024-01-20");

    let monitor = read_json(send(&state, "GET", "/monitor", None).await).await;
    assert_eq!(monitor["date"], today().to_string());
    let stats = read_json(send(&state, "GET", "/stats", None).await).await;
    assert_eq!(stats["date"], today().to_string());
  }

  #[tokio::test]
  async fn monitor_returns_todays_snapshot() {
    let state = make_state().await;
    let body = read_json(send(&state, "GET", "/monitor", None).await).await;
    assert_eq!(body["date"], today().to_string());
    assert!(body["classes"].is_array());
  }
}
