//! Raw attendance observations.
//!
//! Two independent sources exist. Homeroom records are the official daily
//! entry, one per student per date. Subject logs are written by whichever
//! teacher taught a period and may disagree with each other; they are only
//! consulted when no homeroom record exists. See [`crate::reconcile`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{date::local_date, status::AttendanceCode};

// ─── Homeroom ────────────────────────────────────────────────────────────────

/// The homeroom teacher's daily record. Keyed by `(student_id, date)`;
/// a later write for the same key replaces the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeroomRecord {
  pub student_id:  Uuid,
  pub date:        NaiveDate,
  pub status:      AttendanceCode,
  /// Server-assigned; refreshed on every upsert.
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::AttendanceStore::upsert_homeroom`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewHomeroomRecord {
  pub student_id: Uuid,
  pub date:       NaiveDate,
  pub status:     AttendanceCode,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// One period's observation by a subject teacher.
///
/// `status` is kept exactly as written. Codes outside `S/I/A/D` (including
/// plain presence marks) are informational and never produce an absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectLog {
  pub log_id:     Uuid,
  pub student_id: Uuid,
  /// The class session this observation was recorded under.
  pub journal_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub status:     String,
}

impl SubjectLog {
  /// The school-local calendar date this observation belongs to.
  pub fn local_date(&self) -> NaiveDate { local_date(self.created_at) }

  /// The recognised exception code, or `None` for anything else.
  pub fn code(&self) -> Option<AttendanceCode> {
    AttendanceCode::from_code(&self.status)
  }
}

/// One student's mark on a journal submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectMark {
  pub student_id: Uuid,
  pub status:     String,
}
