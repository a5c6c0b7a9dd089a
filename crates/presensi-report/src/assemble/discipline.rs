//! Discipline / violation dashboard.
//!
//! Lists students with unexcused absences or behavioural notes in the range,
//! most absences first.

use std::collections::{HashMap, HashSet};

use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  discipline::DisciplineNote,
  reconcile::{discipline_order, AttendanceCounts},
  roster::Student,
  DateRange, Reconciler,
};
use serde::Serialize;
use uuid::Uuid;

/// A discipline note with the name of the teacher who wrote it, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisciplineEntry {
  #[serde(flatten)]
  pub note:     DisciplineNote,
  pub reporter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisciplineRow {
  pub student:     Student,
  #[serde(flatten)]
  pub counts:      AttendanceCounts,
  /// `S + I + A`, the figure rows are ranked by.
  pub days_absent: u32,
  pub notes:       Vec<DisciplineEntry>,
}

/// Students touched by any homeroom record, subject log or note.
pub fn students_in_scope(
  students: &[Student],
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
  notes: &[DisciplineNote],
) -> Vec<Student> {
  let touched: HashSet<Uuid> = homeroom
    .iter()
    .map(|r| r.student_id)
    .chain(subject_logs.iter().map(|l| l.student_id))
    .chain(notes.iter().map(|n| n.student_id))
    .collect();
  students
    .iter()
    .filter(|s| touched.contains(&s.student_id))
    .cloned()
    .collect()
}

/// Build the dashboard.
///
/// `reporters` maps a journal id to the name of the teacher who ran that
/// session; notes written outside a session have no reporter.
pub fn discipline(
  students: &[Student],
  range: DateRange,
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
  notes: &[DisciplineNote],
  reporters: &HashMap<Uuid, String>,
) -> Vec<DisciplineRow> {
  let scope = students_in_scope(students, homeroom, subject_logs, notes);
  let reconciler = Reconciler::new(range, homeroom, subject_logs);

  let mut by_student: HashMap<Uuid, Vec<DisciplineEntry>> = HashMap::new();
  for note in notes {
    if !range.contains(presensi_core::date::local_date(note.created_at)) {
      continue;
    }
    let reporter = note.journal_id.and_then(|j| reporters.get(&j)).cloned();
    by_student
      .entry(note.student_id)
      .or_default()
      .push(DisciplineEntry { note: note.clone(), reporter });
  }

  let mut rows: Vec<DisciplineRow> = reconciler
    .student_counts(&scope)
    .into_iter()
    .filter_map(|row| {
      let notes = by_student.remove(&row.student.student_id).unwrap_or_default();
      (row.counts.unexcused > 0 || !notes.is_empty()).then(|| DisciplineRow {
        days_absent: row.counts.report_card_total(),
        student: row.student,
        counts: row.counts,
        notes,
      })
    })
    .collect();

  rows.sort_by(|a, b| {
    discipline_order((&a.student, a.days_absent), (&b.student, b.days_absent))
  });
  rows
}
