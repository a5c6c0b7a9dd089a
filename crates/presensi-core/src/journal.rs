//! Journal entries, one per taught class session.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{attendance::SubjectMark, date::local_date};

/// A record of one taught class session. Subject logs written alongside it
/// carry its `journal_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
  pub journal_id:  Uuid,
  pub teacher_id:  Uuid,
  pub kelas:       String,
  pub subject:     String,
  /// Lesson periods covered, e.g. `"1-2"`.
  pub hours:       String,
  pub created_at:  DateTime<Utc>,
  /// Classroom cleanliness as noted by the teacher.
  pub cleanliness: Option<String>,
  /// Validation state set by the curriculum office.
  pub validation:  Option<String>,
}

impl JournalEntry {
  /// The school-local date the session took place on.
  pub fn local_date(&self) -> NaiveDate { local_date(self.created_at) }
}

/// Input to [`crate::store::AttendanceStore::record_journal`].
///
/// The journal and its attendance marks are written together; marks become
/// immutable subject logs once submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJournal {
  pub teacher_id:  Uuid,
  pub kelas:       String,
  pub subject:     String,
  pub hours:       String,
  #[serde(default)]
  pub cleanliness: Option<String>,
  #[serde(default)]
  pub validation:  Option<String>,
  /// Session time; defaults to now. Set when importing past sessions.
  #[serde(default)]
  pub created_at:  Option<DateTime<Utc>>,
  #[serde(default)]
  pub attendance:  Vec<SubjectMark>,
}

impl NewJournal {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(
    teacher_id: Uuid,
    kelas: impl Into<String>,
    subject: impl Into<String>,
    hours: impl Into<String>,
  ) -> Self {
    Self {
      teacher_id,
      kelas: kelas.into(),
      subject: subject.into(),
      hours: hours.into(),
      cleanliness: None,
      validation: None,
      created_at: None,
      attendance: Vec::new(),
    }
  }
}
