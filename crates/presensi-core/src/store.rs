//! The `AttendanceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `presensi-store-sqlite`).
//! Higher layers (`presensi-report`, `presensi-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  attendance::{HomeroomRecord, NewHomeroomRecord, SubjectLog},
  date::DateRange,
  discipline::{DisciplineNote, NewDisciplineNote},
  journal::{JournalEntry, NewJournal},
  roster::{NewStudent, NewTeacher, Student, Teacher},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Scope for attendance and discipline reads.
///
/// Timestamped rows are matched against the school-local calendar range, see
/// [`DateRange::utc_bounds`].
#[derive(Debug, Clone)]
pub struct AttendanceQuery {
  /// Restrict to these students; `None` means every student.
  pub student_ids: Option<Vec<Uuid>>,
  pub range:       DateRange,
}

impl AttendanceQuery {
  pub fn all(range: DateRange) -> Self { Self { student_ids: None, range } }

  pub fn for_students(student_ids: Vec<Uuid>, range: DateRange) -> Self {
    Self { student_ids: Some(student_ids), range }
  }

  /// Whether `student_id` is within scope.
  pub fn includes(&self, student_id: Uuid) -> bool {
    self
      .student_ids
      .as_ref()
      .is_none_or(|ids| ids.contains(&student_id))
  }
}

/// Parameters for [`AttendanceStore::list_journals`].
#[derive(Debug, Clone)]
pub struct JournalQuery {
  pub kelas:   Option<String>,
  pub subject: Option<String>,
  pub range:   DateRange,
}

impl JournalQuery {
  pub fn in_range(range: DateRange) -> Self {
    Self { kelas: None, subject: None, range }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Coarse classification of a backend failure, for callers that need to tell
/// a client what went wrong without knowing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// A referenced record does not exist.
  NotFound,
  /// The write collides with an existing record.
  Conflict,
  /// The input was rejected before reaching storage.
  Invalid,
  Internal,
}

pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> FailureKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Presensi record store backend.
///
/// Subject logs are append-only and written only together with their journal.
/// Homeroom records are upserted on `(student_id, date)`. Nothing is deleted
/// except through [`AttendanceStore::remove_student`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AttendanceStore: Send + Sync {
  type Error: StoreError;

  // ── Students ──────────────────────────────────────────────────────────

  /// Enrol a student. Fails if the NISN is already taken.
  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Retrieve a student by UUID. Returns `None` if not found.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Retrieve a student by national student number.
  fn find_student_by_nisn<'a>(
    &'a self,
    nisn: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  /// List students, optionally restricted to one class, ordered by class then
  /// name.
  fn list_students(
    &self,
    kelas: Option<String>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Remove a student together with all of their attendance and discipline
  /// rows. Returns `false` if the student did not exist.
  fn remove_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Teachers ──────────────────────────────────────────────────────────

  /// Register a teacher. Fails if the NIP is already taken.
  fn add_teacher(
    &self,
    input: NewTeacher,
  ) -> impl Future<Output = Result<Teacher, Self::Error>> + Send + '_;

  fn get_teacher(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Teacher>, Self::Error>> + Send + '_;

  fn list_teachers(
    &self,
  ) -> impl Future<Output = Result<Vec<Teacher>, Self::Error>> + Send + '_;

  // ── Homeroom attendance ───────────────────────────────────────────────

  /// Insert or replace the homeroom record for `(student_id, date)`.
  /// The `recorded_at` timestamp is set by the store.
  fn upsert_homeroom(
    &self,
    input: NewHomeroomRecord,
  ) -> impl Future<Output = Result<HomeroomRecord, Self::Error>> + Send + '_;

  fn list_homeroom<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<HomeroomRecord>, Self::Error>> + Send + 'a;

  // ── Journals and subject attendance ───────────────────────────────────

  /// Record a class session and its attendance marks in one transaction.
  fn record_journal(
    &self,
    input: NewJournal,
  ) -> impl Future<Output = Result<(JournalEntry, Vec<SubjectLog>), Self::Error>>
  + Send
  + '_;

  fn get_journal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<JournalEntry>, Self::Error>> + Send + '_;

  /// Journals in range, oldest first.
  fn list_journals<'a>(
    &'a self,
    query: &'a JournalQuery,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + 'a;

  fn list_subject_attendance<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<SubjectLog>, Self::Error>> + Send + 'a;

  // ── Discipline ────────────────────────────────────────────────────────

  fn record_discipline(
    &self,
    input: NewDisciplineNote,
  ) -> impl Future<Output = Result<DisciplineNote, Self::Error>> + Send + '_;

  /// Notes in range, oldest first.
  fn list_discipline<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<DisciplineNote>, Self::Error>> + Send + 'a;
}
