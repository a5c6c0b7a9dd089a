//! Row builders shared by the assembler tests.

use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};
use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  date::{day_start_utc, parse_date},
  discipline::DisciplineNote,
  journal::JournalEntry,
  roster::Student,
  status::AttendanceCode,
  DateRange,
};
use uuid::Uuid;

pub fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

pub fn range(from: &str, to: &str) -> DateRange {
  DateRange::new(d(from), d(to)).unwrap()
}

pub fn id(n: u128) -> Uuid { Uuid::from_u128(n) }

/// `hour` o'clock school time on `date`.
pub fn at(date: &str, hour: i64) -> DateTime<Utc> {
  day_start_utc(d(date)) + chrono::TimeDelta::hours(hour)
}

pub fn student(n: u128, name: &str, kelas: &str) -> Student {
  Student {
    student_id: id(n),
    nisn:       format!("99{n:08}"),
    nis:        None,
    name:       name.into(),
    kelas:      kelas.into(),
  }
}

pub fn homeroom(n: u128, date: &str, status: AttendanceCode) -> HomeroomRecord {
  HomeroomRecord {
    student_id: id(n),
    date: d(date),
    status,
    recorded_at: Utc.timestamp_opt(0, 0).unwrap(),
  }
}

pub fn log(n: u128, when: DateTime<Utc>, status: &str) -> SubjectLog {
  SubjectLog {
    log_id:     Uuid::new_v4(),
    student_id: id(n),
    journal_id: None,
    created_at: when,
    status:     status.into(),
  }
}

pub fn mark(n: u128, journal: &JournalEntry, status: &str) -> SubjectLog {
  SubjectLog {
    journal_id: Some(journal.journal_id),
    ..log(n, journal.created_at, status)
  }
}

pub fn journal(
  n: u128,
  teacher: u128,
  kelas: &str,
  subject: &str,
  when: DateTime<Utc>,
) -> JournalEntry {
  JournalEntry {
    journal_id:  id(n),
    teacher_id:  id(teacher),
    kelas:       kelas.into(),
    subject:     subject.into(),
    hours:       "1-2".into(),
    created_at:  when,
    cleanliness: None,
    validation:  None,
  }
}

pub fn note(n: u128, when: DateTime<Utc>, category: &str) -> DisciplineNote {
  DisciplineNote {
    note_id:    Uuid::new_v4(),
    student_id: id(n),
    category:   category.into(),
    follow_up:  None,
    note:       format!("{category} noted"),
    created_at: when,
    journal_id: None,
  }
}
