//! Report-card absence recap for one class.

use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  reconcile::AttendanceCounts,
  roster::Student,
  DateRange, Reconciler,
};
use serde::Serialize;

/// One student's line on the report card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCardRow {
  pub student:       Student,
  #[serde(flatten)]
  pub counts:        AttendanceCounts,
  /// `S + I + A`. Dispensation is listed but never totalled.
  pub total_absence: u32,
}

/// Build report-card rows for `students`, sorted by name.
pub fn report_card(
  students: &[Student],
  range: DateRange,
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
) -> Vec<ReportCardRow> {
  let reconciler = Reconciler::new(range, homeroom, subject_logs);

  let mut rows: Vec<ReportCardRow> = reconciler
    .student_counts(students)
    .into_iter()
    .map(|row| ReportCardRow {
      total_absence: row.counts.report_card_total(),
      student:       row.student,
      counts:        row.counts,
    })
    .collect();

  rows.sort_by(|a, b| {
    a.student
      .name
      .cmp(&b.student.name)
      .then_with(|| a.student.nisn.cmp(&b.student.nisn))
  });
  rows
}
