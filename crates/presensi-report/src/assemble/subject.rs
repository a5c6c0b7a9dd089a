//! Subject attendance recap: how many of a subject's meetings each student
//! attended.

use std::collections::HashMap;

use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  journal::JournalEntry,
  reconcile::{resolve_observations, AttendanceCounts},
  roster::Student,
  DateRange, Reconciler,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRecapRow {
  pub student:          Student,
  /// Resolved status of every meeting, tallied.
  #[serde(flatten)]
  pub counts:           AttendanceCounts,
  pub meetings:         u32,
  pub present_meetings: u32,
  pub percentage:       f64,
}

/// Build the recap for one class and subject.
///
/// `journals` are the class's sessions of the subject; sessions dated
/// outside `range` are not counted as meetings. A student's status at a
/// meeting resolves from the homeroom record of that day and the logs
/// written under that session.
pub fn subject_recap(
  students: &[Student],
  range: DateRange,
  journals: &[JournalEntry],
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
) -> Vec<SubjectRecapRow> {
  let official = Reconciler::new(range, homeroom, &[]);
  let meetings: Vec<&JournalEntry> = journals
    .iter()
    .filter(|j| range.contains(j.local_date()))
    .collect();

  let mut marks: HashMap<(Uuid, Uuid), Vec<&str>> = HashMap::new();
  for log in subject_logs {
    if let Some(journal_id) = log.journal_id {
      marks
        .entry((journal_id, log.student_id))
        .or_default()
        .push(log.status.as_str());
    }
  }

  let mut rows: Vec<SubjectRecapRow> = students
    .iter()
    .map(|student| {
      let mut counts = AttendanceCounts::default();
      for meeting in &meetings {
        let codes = marks
          .get(&(meeting.journal_id, student.student_id))
          .map(Vec::as_slice)
          .unwrap_or_default();
        counts.record(resolve_observations(
          official.homeroom_status(student.student_id, meeting.local_date()),
          codes.iter().copied(),
        ));
      }

      let total = meetings.len() as u32;
      let percentage = if total == 0 {
        100.0
      } else {
        f64::from(counts.present) / f64::from(total) * 100.0
      };
      SubjectRecapRow {
        student: student.clone(),
        meetings: total,
        present_meetings: counts.present,
        counts,
        percentage,
      }
    })
    .collect();

  rows.sort_by(|a, b| a.student.name.cmp(&b.student.name));
  rows
}
