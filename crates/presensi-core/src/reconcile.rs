//! The attendance reconciler.
//!
//! Homeroom records and subject logs are written independently and may
//! disagree. Every report resolves them through this module so the priority
//! rule exists in exactly one place:
//!
//! 1. A homeroom record for the (student, date) wins outright.
//! 2. Otherwise the subject logs of that date are consulted, and the highest
//!    ranked recognised code wins (`S > I > D > A`), regardless of how many
//!    periods reported it.
//! 3. No recognised observation at all means the student was present.
//!
//! The reconciler is a pure function over already-fetched rows. It never
//! fails: missing data means "no evidence", and unrecognised codes are
//! skipped rather than aborting the aggregation.

use std::{
  cmp::Ordering,
  collections::{BTreeMap, BTreeSet, HashMap},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use uuid::Uuid;

use crate::{
  attendance::{HomeroomRecord, SubjectLog},
  date::DateRange,
  roster::Student,
  status::{AttendanceCode, DailyStatus},
};

// ─── Single-date resolution ──────────────────────────────────────────────────

/// Resolve one (student, date) from its raw observations.
///
/// `homeroom` is the official record for the date, if one exists.
/// `subject_codes` are the raw status strings of every subject log for the
/// same student and date.
pub fn resolve_observations<'a>(
  homeroom: Option<AttendanceCode>,
  subject_codes: impl IntoIterator<Item = &'a str>,
) -> DailyStatus {
  if let Some(code) = homeroom {
    return code.into();
  }
  subject_codes
    .into_iter()
    .filter_map(AttendanceCode::from_code)
    .max_by_key(|code| code.precedence())
    .map_or(DailyStatus::Present, DailyStatus::from)
}

/// Resolve a single student's status on `date` by scanning raw rows.
///
/// Callers that resolve many dates should build a [`Reconciler`] instead;
/// both produce identical answers.
pub fn resolve_daily_status(
  student_id: Uuid,
  date: NaiveDate,
  homeroom: &[HomeroomRecord],
  subject_logs: &[SubjectLog],
) -> DailyStatus {
  let official = homeroom
    .iter()
    .rev()
    .find(|r| r.student_id == student_id && r.date == date)
    .map(|r| r.status);

  resolve_observations(
    official,
    subject_logs
      .iter()
      .filter(|log| log.student_id == student_id && log.local_date() == date)
      .map(|log| log.status.as_str()),
  )
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Resolved statuses tallied over the tracked dates of a range.
///
/// Only dates with at least one raw observation are tracked, so `present`
/// counts days where evidence existed but resolved to presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
  #[serde(rename = "S")]
  pub sick:         u32,
  #[serde(rename = "I")]
  pub permitted:    u32,
  #[serde(rename = "A")]
  pub unexcused:    u32,
  #[serde(rename = "D")]
  pub dispensation: u32,
  pub present:      u32,
}

impl AttendanceCounts {
  pub fn record(&mut self, status: DailyStatus) {
    match status {
      DailyStatus::Present => self.present += 1,
      DailyStatus::Sick => self.sick += 1,
      DailyStatus::Permitted => self.permitted += 1,
      DailyStatus::Unexcused => self.unexcused += 1,
      DailyStatus::Dispensation => self.dispensation += 1,
    }
  }

  pub fn get(&self, code: AttendanceCode) -> u32 {
    match code {
      AttendanceCode::Sick => self.sick,
      AttendanceCode::Permitted => self.permitted,
      AttendanceCode::Unexcused => self.unexcused,
      AttendanceCode::Dispensation => self.dispensation,
    }
  }

  /// Absence total as printed on report cards: `S + I + A`.
  /// Dispensation is never part of it.
  pub fn report_card_total(&self) -> u32 {
    AttendanceCode::iter()
      .filter(|c| c.is_report_card_absence())
      .map(|c| self.get(c))
      .sum()
  }

  /// Days resolved to any exception, dispensation included.
  pub fn exception_days(&self) -> u32 {
    self.report_card_total() + self.dispensation
  }

  /// Every date that carried at least one observation.
  pub fn tracked_days(&self) -> u32 { self.exception_days() + self.present }

  pub fn is_clean(&self) -> bool { self.exception_days() == 0 }

  pub fn merge(&mut self, other: &Self) {
    self.sick += other.sick;
    self.permitted += other.permitted;
    self.unexcused += other.unexcused;
    self.dispensation += other.dispensation;
    self.present += other.present;
  }
}

/// A student together with their tallied statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCounts {
  pub student: Student,
  #[serde(flatten)]
  pub counts:  AttendanceCounts,
}

// ─── Class summaries ─────────────────────────────────────────────────────────

/// Per-class headline numbers. A student counts as absent when any tracked
/// date in the range resolved to an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
  pub kelas:          String,
  pub total_students: u32,
  pub present_count:  u32,
  pub absent_count:   u32,
}

/// A class with its members' counts and the students flagged for
/// violation-style reports (unexcused absences above zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBreakdown {
  pub summary:  ClassSummary,
  /// Per-status totals across every member.
  pub totals:   AttendanceCounts,
  pub students: Vec<StudentCounts>,
  pub flagged:  Vec<Uuid>,
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Class display order: ascending lexical order of the class name.
pub fn class_order(a: &str, b: &str) -> Ordering { a.cmp(b) }

/// Sort class names for display.
pub fn sort_classes<S: AsRef<str>>(classes: &mut [S]) {
  classes.sort_by(|a, b| class_order(a.as_ref(), b.as_ref()));
}

/// Discipline report order: more absences first, then class ascending, then
/// student name ascending.
pub fn discipline_order(
  (a, a_absences): (&Student, u32),
  (b, b_absences): (&Student, u32),
) -> Ordering {
  b_absences
    .cmp(&a_absences)
    .then_with(|| class_order(&a.kelas, &b.kelas))
    .then_with(|| a.name.cmp(&b.name))
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// An index over one snapshot of raw rows, scoped to a date range.
///
/// Rows dated outside the range are ignored. Building the index is linear in
/// the number of rows; each lookup afterwards is constant time.
pub struct Reconciler<'a> {
  range:    DateRange,
  homeroom: HashMap<(Uuid, NaiveDate), AttendanceCode>,
  subject:  HashMap<(Uuid, NaiveDate), Vec<&'a str>>,
  tracked:  HashMap<Uuid, BTreeSet<NaiveDate>>,
}

impl<'a> Reconciler<'a> {
  pub fn new(
    range: DateRange,
    homeroom: &'a [HomeroomRecord],
    subject_logs: &'a [SubjectLog],
  ) -> Self {
    let mut index = Self {
      range,
      homeroom: HashMap::new(),
      subject: HashMap::new(),
      tracked: HashMap::new(),
    };

    for record in homeroom.iter().filter(|r| range.contains(r.date)) {
      index.homeroom.insert((record.student_id, record.date), record.status);
      index.track(record.student_id, record.date);
    }

    for log in subject_logs {
      let date = log.local_date();
      if !range.contains(date) {
        continue;
      }
      index
        .subject
        .entry((log.student_id, date))
        .or_default()
        .push(log.status.as_str());
      index.track(log.student_id, date);
    }

    index
  }

  fn track(&mut self, student_id: Uuid, date: NaiveDate) {
    self.tracked.entry(student_id).or_default().insert(date);
  }

  pub fn range(&self) -> DateRange { self.range }

  /// The homeroom record for `(student_id, date)`, if any.
  pub fn homeroom_status(
    &self,
    student_id: Uuid,
    date: NaiveDate,
  ) -> Option<AttendanceCode> {
    self.homeroom.get(&(student_id, date)).copied()
  }

  /// Resolve one student's status on one date.
  pub fn resolve(&self, student_id: Uuid, date: NaiveDate) -> DailyStatus {
    let subject = self
      .subject
      .get(&(student_id, date))
      .map(Vec::as_slice)
      .unwrap_or_default();
    resolve_observations(
      self.homeroom_status(student_id, date),
      subject.iter().copied(),
    )
  }

  /// Dates in range with at least one observation for the student, in order.
  pub fn tracked_dates(
    &self,
    student_id: Uuid,
  ) -> impl Iterator<Item = NaiveDate> + '_ {
    self.tracked.get(&student_id).into_iter().flatten().copied()
  }

  /// Students with at least one observation in range.
  pub fn tracked_students(&self) -> impl Iterator<Item = Uuid> + '_ {
    self.tracked.keys().copied()
  }

  /// The resolved status of every tracked date for the student.
  pub fn daily_statuses(
    &self,
    student_id: Uuid,
  ) -> BTreeMap<NaiveDate, DailyStatus> {
    self
      .tracked_dates(student_id)
      .map(|date| (date, self.resolve(student_id, date)))
      .collect()
  }

  /// Tally resolved statuses over the student's tracked dates.
  pub fn counts(&self, student_id: Uuid) -> AttendanceCounts {
    let mut counts = AttendanceCounts::default();
    for date in self.tracked_dates(student_id) {
      counts.record(self.resolve(student_id, date));
    }
    counts
  }

  /// Counts for every given student, in input order.
  pub fn student_counts(&self, students: &[Student]) -> Vec<StudentCounts> {
    students
      .iter()
      .map(|student| StudentCounts {
        student: student.clone(),
        counts:  self.counts(student.student_id),
      })
      .collect()
  }

  /// Group students by class and summarise each class. Classes come out in
  /// display order; members keep their input order.
  pub fn by_class(&self, students: &[Student]) -> Vec<ClassBreakdown> {
    let mut classes: BTreeMap<String, Vec<StudentCounts>> = BTreeMap::new();
    for row in self.student_counts(students) {
      classes.entry(row.student.kelas.clone()).or_default().push(row);
    }

    let mut breakdowns: Vec<ClassBreakdown> = classes
      .into_iter()
      .map(|(kelas, members)| {
        let absent = members.iter().filter(|m| !m.counts.is_clean()).count();
        let mut totals = AttendanceCounts::default();
        for member in &members {
          totals.merge(&member.counts);
        }
        let flagged = members
          .iter()
          .filter(|m| m.counts.unexcused > 0)
          .map(|m| m.student.student_id)
          .collect();
        ClassBreakdown {
          summary: ClassSummary {
            kelas,
            total_students: members.len() as u32,
            present_count:  (members.len() - absent) as u32,
            absent_count:   absent as u32,
          },
          totals,
          students: members,
          flagged,
        }
      })
      .collect();

    breakdowns.sort_by(|a, b| class_order(&a.summary.kelas, &b.summary.kelas));
    breakdowns
  }
}
