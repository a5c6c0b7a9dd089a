//! Behavioural infraction notes.
//!
//! Independent of attendance: notes are filtered by date range and listed,
//! never reconciled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineNote {
  pub note_id:    Uuid,
  pub student_id: Uuid,
  /// Infraction category, e.g. "late", "uniform".
  pub category:   String,
  pub follow_up:  Option<String>,
  pub note:       String,
  pub created_at: DateTime<Utc>,
  /// The class session during which the note was written, if any.
  pub journal_id: Option<Uuid>,
}

/// Input to [`crate::store::AttendanceStore::record_discipline`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewDisciplineNote {
  pub student_id: Uuid,
  pub category:   String,
  #[serde(default)]
  pub follow_up:  Option<String>,
  pub note:       String,
  #[serde(default)]
  pub journal_id: Option<Uuid>,
  /// Defaults to now.
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}
