//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision so that lexical comparison matches chronological order. Calendar
//! dates are stored as `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use presensi_core::{
  attendance::{HomeroomRecord, SubjectLog},
  discipline::DisciplineNote,
  journal::JournalEntry,
  roster::{Student, Teacher},
  status::AttendanceCode,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── AttendanceCode ──────────────────────────────────────────────────────────

pub fn encode_code(code: AttendanceCode) -> String { code.to_string() }

pub fn decode_code(s: &str) -> Result<AttendanceCode> {
  AttendanceCode::from_code(s).ok_or_else(|| Error::InvalidCode(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id: String,
  pub nisn:       String,
  pub nis:        Option<String>,
  pub name:       String,
  pub kelas:      String,
}

impl RawStudent {
  pub const COLUMNS: &'static str = "student_id, nisn, nis, name, kelas";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id: row.get(0)?,
      nisn:       row.get(1)?,
      nis:        row.get(2)?,
      name:       row.get(3)?,
      kelas:      row.get(4)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id: decode_uuid(&self.student_id)?,
      nisn:       self.nisn,
      nis:        self.nis,
      name:       self.name,
      kelas:      self.kelas,
    })
  }
}

/// Raw strings read directly from a `teachers` row.
pub struct RawTeacher {
  pub teacher_id:  String,
  pub nip:         String,
  pub name:        String,
  pub homeroom_of: Option<String>,
}

impl RawTeacher {
  pub const COLUMNS: &'static str = "teacher_id, nip, name, homeroom_of";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      teacher_id:  row.get(0)?,
      nip:         row.get(1)?,
      name:        row.get(2)?,
      homeroom_of: row.get(3)?,
    })
  }

  pub fn into_teacher(self) -> Result<Teacher> {
    Ok(Teacher {
      teacher_id:  decode_uuid(&self.teacher_id)?,
      nip:         self.nip,
      name:        self.name,
      homeroom_of: self.homeroom_of,
    })
  }
}

/// Raw strings read directly from a `homeroom_attendance` row.
pub struct RawHomeroom {
  pub student_id:  String,
  pub date:        String,
  pub status:      String,
  pub recorded_at: String,
}

impl RawHomeroom {
  pub const COLUMNS: &'static str = "student_id, date, status, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:  row.get(0)?,
      date:        row.get(1)?,
      status:      row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<HomeroomRecord> {
    Ok(HomeroomRecord {
      student_id:  decode_uuid(&self.student_id)?,
      date:        decode_date(&self.date)?,
      status:      decode_code(&self.status)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `subject_attendance` row.
pub struct RawSubjectLog {
  pub log_id:     String,
  pub journal_id: Option<String>,
  pub student_id: String,
  pub created_at: String,
  pub status:     String,
}

impl RawSubjectLog {
  pub const COLUMNS: &'static str =
    "log_id, journal_id, student_id, created_at, status";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id:     row.get(0)?,
      journal_id: row.get(1)?,
      student_id: row.get(2)?,
      created_at: row.get(3)?,
      status:     row.get(4)?,
    })
  }

  pub fn into_log(self) -> Result<SubjectLog> {
    Ok(SubjectLog {
      log_id:     decode_uuid(&self.log_id)?,
      student_id: decode_uuid(&self.student_id)?,
      journal_id: self.journal_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      status:     self.status,
    })
  }
}

/// Raw strings read directly from a `journals` row.
pub struct RawJournal {
  pub journal_id:  String,
  pub teacher_id:  String,
  pub kelas:       String,
  pub subject:     String,
  pub hours:       String,
  pub created_at:  String,
  pub cleanliness: Option<String>,
  pub validation:  Option<String>,
}

impl RawJournal {
  pub const COLUMNS: &'static str = "journal_id, teacher_id, kelas, subject, \
                                     hours, created_at, cleanliness, validation";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      journal_id:  row.get(0)?,
      teacher_id:  row.get(1)?,
      kelas:       row.get(2)?,
      subject:     row.get(3)?,
      hours:       row.get(4)?,
      created_at:  row.get(5)?,
      cleanliness: row.get(6)?,
      validation:  row.get(7)?,
    })
  }

  pub fn into_journal(self) -> Result<JournalEntry> {
    Ok(JournalEntry {
      journal_id:  decode_uuid(&self.journal_id)?,
      teacher_id:  decode_uuid(&self.teacher_id)?,
      kelas:       self.kelas,
      subject:     self.subject,
      hours:       self.hours,
      created_at:  decode_dt(&self.created_at)?,
      cleanliness: self.cleanliness,
      validation:  self.validation,
    })
  }
}

/// Raw strings read directly from a `discipline_notes` row.
pub struct RawDiscipline {
  pub note_id:    String,
  pub student_id: String,
  pub category:   String,
  pub follow_up:  Option<String>,
  pub note:       String,
  pub created_at: String,
  pub journal_id: Option<String>,
}

impl RawDiscipline {
  pub const COLUMNS: &'static str =
    "note_id, student_id, category, follow_up, note, created_at, journal_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:    row.get(0)?,
      student_id: row.get(1)?,
      category:   row.get(2)?,
      follow_up:  row.get(3)?,
      note:       row.get(4)?,
      created_at: row.get(5)?,
      journal_id: row.get(6)?,
    })
  }

  pub fn into_note(self) -> Result<DisciplineNote> {
    Ok(DisciplineNote {
      note_id:    decode_uuid(&self.note_id)?,
      student_id: decode_uuid(&self.student_id)?,
      category:   self.category,
      follow_up:  self.follow_up,
      note:       self.note,
      created_at: decode_dt(&self.created_at)?,
      journal_id: self.journal_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}
