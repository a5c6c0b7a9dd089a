//! Change notifications emitted by stores after successful writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Student,
  Teacher,
  HomeroomAttendance,
  Journal,
  Discipline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub kind:  ChangeKind,
  /// The class affected, when the store knows it.
  pub kelas: Option<String>,
  pub at:    DateTime<Utc>,
}

impl ChangeEvent {
  pub fn now(kind: ChangeKind, kelas: Option<String>) -> Self {
    Self { kind, kelas, at: Utc::now() }
  }

  /// Whether this change can alter attendance figures.
  pub fn affects_attendance(&self) -> bool {
    !matches!(self.kind, ChangeKind::Teacher | ChangeKind::Discipline)
  }
}
