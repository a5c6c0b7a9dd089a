//! The attendance status taxonomy.
//!
//! Only exceptions are recorded: a raw log carries one of the four single-letter
//! codes, and the absence of any log means the student was present. The same
//! letters are used verbatim by every importer and exporter.

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── Raw codes ───────────────────────────────────────────────────────────────

/// A recorded attendance exception.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum AttendanceCode {
  /// Sick.
  #[serde(rename = "S", alias = "s")]
  #[strum(serialize = "S")]
  Sick,
  /// Permitted absence (izin).
  #[serde(rename = "I", alias = "i")]
  #[strum(serialize = "I")]
  Permitted,
  /// Absent without excuse (alpa).
  #[serde(rename = "A", alias = "a")]
  #[strum(serialize = "A")]
  Unexcused,
  /// School-approved leave, e.g. representing the school at an event.
  #[serde(rename = "D", alias = "d")]
  #[strum(serialize = "D")]
  Dispensation,
}

impl AttendanceCode {
  /// Parse a raw code as written by a teacher. Surrounding whitespace and case
  /// are ignored; anything else yields `None`.
  pub fn from_code(raw: &str) -> Option<Self> {
    Self::from_str(raw.trim()).ok()
  }

  /// Rank used when subject logs disagree: `S > I > D > A`.
  pub fn precedence(self) -> u8 {
    match self {
      Self::Sick => 4,
      Self::Permitted => 3,
      Self::Dispensation => 2,
      Self::Unexcused => 1,
    }
  }

  /// Whether this code counts toward the report-card absence total.
  /// Dispensation is approved leave and is tracked separately.
  pub fn is_report_card_absence(self) -> bool {
    !matches!(self, Self::Dispensation)
  }
}

// ─── Resolved status ─────────────────────────────────────────────────────────

/// The single status a student ends up with for one calendar date.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
pub enum DailyStatus {
  Present,
  #[serde(rename = "S")]
  #[strum(serialize = "S")]
  Sick,
  #[serde(rename = "I")]
  #[strum(serialize = "I")]
  Permitted,
  #[serde(rename = "A")]
  #[strum(serialize = "A")]
  Unexcused,
  #[serde(rename = "D")]
  #[strum(serialize = "D")]
  Dispensation,
}

impl From<AttendanceCode> for DailyStatus {
  fn from(code: AttendanceCode) -> Self {
    match code {
      AttendanceCode::Sick => Self::Sick,
      AttendanceCode::Permitted => Self::Permitted,
      AttendanceCode::Unexcused => Self::Unexcused,
      AttendanceCode::Dispensation => Self::Dispensation,
    }
  }
}
