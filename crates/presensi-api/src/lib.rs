//! JSON REST API for Presensi.
//!
//! Exposes an axum [`Router`] backed by any
//! [`presensi_core::store::AttendanceStore`]. Authentication and TLS are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", presensi_api::api_router(state))
//! ```

pub mod attendance;
pub mod discipline;
pub mod error;
pub mod journals;
pub mod reports;
pub mod students;
pub mod teachers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::NaiveDate;
use presensi_core::{date::today, event::ChangeEvent, store::AttendanceStore};
use presensi_report::{LiveMonitor, ReportService};
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:       Arc<S>,
  pub reports:     ReportService<S>,
  pub monitor:     Arc<LiveMonitor>,
  pub school_name: Arc<str>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       self.store.clone(),
      reports:     self.reports.clone(),
      monitor:     self.monitor.clone(),
      school_name: self.school_name.clone(),
    }
  }
}

impl<S: AttendanceStore + 'static> AppState<S> {
  /// Build the state and start the live monitor on `changes`. Must be called
  /// from within a tokio runtime.
  pub fn new(
    store: Arc<S>,
    changes: broadcast::Receiver<ChangeEvent>,
    school_name: impl Into<Arc<str>>,
  ) -> Self {
    Self::with_clock(store, changes, school_name, today)
  }

  /// Like [`AppState::new`], with the monitor reading the date from `today`.
  pub fn with_clock<F>(
    store: Arc<S>,
    changes: broadcast::Receiver<ChangeEvent>,
    school_name: impl Into<Arc<str>>,
    today: F,
  ) -> Self
  where
    F: Fn() -> NaiveDate + Send + 'static,
  {
    let reports = ReportService::new(store.clone());
    let monitor = LiveMonitor::spawn(reports.clone(), changes, today);
    Self {
      store,
      reports,
      monitor: Arc::new(monitor),
      school_name: school_name.into(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AttendanceStore + 'static,
{
  Router::new()
    // Master data
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>).delete(students::remove::<S>),
    )
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    // Attendance
    .route("/attendance/homeroom", post(attendance::upsert::<S>))
    .route("/journals", get(journals::list::<S>).post(journals::create::<S>))
    .route("/discipline", post(discipline::create::<S>))
    // Reports
    .route("/reports/report-card", get(reports::report_card::<S>))
    .route("/reports/discipline", get(reports::discipline::<S>))
    .route("/reports/subject", get(reports::subject::<S>))
    .route("/reports/daily", get(reports::daily::<S>))
    .route("/monitor", get(reports::monitor::<S>))
    .route("/stats", get(reports::stats::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod testing;
