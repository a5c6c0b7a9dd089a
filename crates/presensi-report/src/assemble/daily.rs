//! Single-day statistics for the operator monitor and the public dashboard.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  journal::JournalEntry,
  reconcile::{sort_classes, AttendanceCounts, ClassSummary},
  roster::Student,
  DateRange, Reconciler,
};
use serde::Serialize;
use uuid::Uuid;

/// One class session held on the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
  pub journal_id: Uuid,
  pub teacher_id: Uuid,
  pub kelas:      String,
  pub subject:    String,
  pub hours:      String,
  pub created_at: DateTime<Utc>,
}

impl From<&JournalEntry> for SessionSummary {
  fn from(j: &JournalEntry) -> Self {
    Self {
      journal_id: j.journal_id,
      teacher_id: j.teacher_id,
      kelas:      j.kelas.clone(),
      subject:    j.subject.clone(),
      hours:      j.hours.clone(),
      created_at: j.created_at,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStats {
  pub date:                    NaiveDate,
  pub classes:                 Vec<ClassSummary>,
  /// School-wide resolved statuses for the day.
  pub totals:                  AttendanceCounts,
  pub total_students:          u32,
  pub present_students:        u32,
  pub journal_count:           u32,
  pub sessions:                Vec<SessionSummary>,
  pub classes_without_journal: Vec<String>,
  /// Students resolved as unexcused today.
  pub flagged:                 Vec<Uuid>,
}

/// The subset of [`DailyStats`] safe to show without logging in. Only
/// numbers, no names or ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicStats {
  pub date:                    NaiveDate,
  pub total_students:          u32,
  pub present_students:        u32,
  #[serde(flatten)]
  pub totals:                  AttendanceCounts,
  pub class_count:             u32,
  pub journal_count:           u32,
  pub classes_without_journal: u32,
}

impl DailyStats {
  pub fn public(&self) -> PublicStats {
    PublicStats {
      date:                    self.date,
      total_students:          self.total_students,
      present_students:        self.present_students,
      totals:                  self.totals,
      class_count:             self.classes.len() as u32,
      journal_count:           self.journal_count,
      classes_without_journal: self.classes_without_journal.len() as u32,
    }
  }
}

pub fn daily_stats(
  students: &[Student],
  date: NaiveDate,
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
  journals: &[JournalEntry],
) -> DailyStats {
  let reconciler = Reconciler::new(DateRange::single(date), homeroom, subject_logs);
  let breakdowns = reconciler.by_class(students);

  let mut totals = AttendanceCounts::default();
  let mut flagged = Vec::new();
  for class in &breakdowns {
    totals.merge(&class.totals);
    flagged.extend(class.flagged.iter().copied());
  }
  let classes: Vec<ClassSummary> =
    breakdowns.into_iter().map(|b| b.summary).collect();

  let mut sessions: Vec<SessionSummary> = journals
    .iter()
    .filter(|j| j.local_date() == date)
    .map(SessionSummary::from)
    .collect();
  sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));

  let held: BTreeSet<&str> = sessions.iter().map(|s| s.kelas.as_str()).collect();
  let mut classes_without_journal: Vec<String> = classes
    .iter()
    .filter(|c| !held.contains(c.kelas.as_str()))
    .map(|c| c.kelas.clone())
    .collect();
  sort_classes(&mut classes_without_journal);

  DailyStats {
    date,
    total_students: classes.iter().map(|c| c.total_students).sum(),
    present_students: classes.iter().map(|c| c.present_count).sum(),
    journal_count: sessions.len() as u32,
    classes,
    totals,
    sessions,
    classes_without_journal,
    flagged,
  }
}
