//! [`SqliteStore`]: the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use presensi_core::{
  attendance::{HomeroomRecord, NewHomeroomRecord, SubjectLog},
  discipline::{DisciplineNote, NewDisciplineNote},
  event::{ChangeEvent, ChangeKind},
  journal::{JournalEntry, NewJournal},
  roster::{NewStudent, NewTeacher, Student, Teacher},
  store::{AttendanceQuery, AttendanceStore, JournalQuery},
};

use crate::{
  encode::{
    encode_code, encode_date, encode_dt, encode_uuid, RawDiscipline,
    RawHomeroom, RawJournal, RawStudent, RawSubjectLog, RawTeacher,
  },
  schema::SCHEMA,
  Error, Result,
};

/// How many change events a slow subscriber may fall behind before it starts
/// missing them.
const CHANGE_FEED_CAPACITY: usize = 64;

/// Whether an insert lost a race against a UNIQUE index.
fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Presensi record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and change feed are shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
    let store = Self { conn, changes };
    store
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(store)
  }

  /// Subscribe to change notifications. Each successful write produces one
  /// event; subscribers that fall behind receive `RecvError::Lagged`.
  pub fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
    self.changes.subscribe()
  }

  fn notify(&self, kind: ChangeKind, kelas: Option<String>) {
    // No subscribers is not an error.
    let _ = self.changes.send(ChangeEvent::now(kind, kelas));
  }

  /// Fail with `StudentNotFound` for the first id that has no student row.
  async fn ensure_students(&self, ids: Vec<Uuid>) -> Result<()> {
    let encoded: Vec<(Uuid, String)> =
      ids.into_iter().map(|id| (id, encode_uuid(id))).collect();

    let missing: Option<Uuid> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT 1 FROM students WHERE student_id = ?1")?;
        for (id, id_str) in &encoded {
          if !stmt.exists(rusqlite::params![id_str])? {
            return Ok(Some(*id));
          }
        }
        Ok(None)
      })
      .await?;

    match missing {
      Some(id) => Err(Error::StudentNotFound(id)),
      None => Ok(()),
    }
  }

  /// The class of a student, for change notifications.
  async fn kelas_of(&self, student_id: Uuid) -> Result<Option<String>> {
    Ok(self.get_student(student_id).await?.map(|s| s.kelas))
  }

  async fn query_students(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Student>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
    if self.find_student_by_nisn(&input.nisn).await?.is_some() {
      return Err(Error::DuplicateNisn(input.nisn));
    }

    let student = Student {
      student_id: Uuid::new_v4(),
      nisn:       input.nisn,
      nis:        input.nis,
      name:       input.name,
      kelas:      input.kelas,
    };

    let id_str = encode_uuid(student.student_id);
    let row = student.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (student_id, nisn, nis, name, kelas)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, row.nisn, row.nis, row.name, row.kelas],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::DuplicateNisn(student.nisn.clone())
        } else {
          e.into()
        }
      })?;

    tracing::debug!(student_id = %student.student_id, kelas = %student.kelas, "student added");
    self.notify(ChangeKind::Student, Some(student.kelas.clone()));
    Ok(student)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    let sql = format!(
      "SELECT {} FROM students WHERE student_id = ?1",
      RawStudent::COLUMNS
    );
    Ok(
      self
        .query_students(sql, vec![encode_uuid(id)])
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn find_student_by_nisn(&self, nisn: &str) -> Result<Option<Student>> {
    let sql = format!("SELECT {} FROM students WHERE nisn = ?1", RawStudent::COLUMNS);
    Ok(
      self
        .query_students(sql, vec![nisn.to_owned()])
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn list_students(&self, kelas: Option<String>) -> Result<Vec<Student>> {
    let (sql, params) = match kelas {
      Some(k) => (
        format!(
          "SELECT {} FROM students WHERE kelas = ?1 ORDER BY kelas, name",
          RawStudent::COLUMNS
        ),
        vec![k],
      ),
      None => (
        format!("SELECT {} FROM students ORDER BY kelas, name", RawStudent::COLUMNS),
        vec![],
      ),
    };
    self.query_students(sql, params).await
  }

  async fn remove_student(&self, id: Uuid) -> Result<bool> {
    let kelas = self.kelas_of(id).await?;
    let id_str = encode_uuid(id);

    let removed: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM subject_attendance WHERE student_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM homeroom_attendance WHERE student_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM discipline_notes WHERE student_id = ?1",
          rusqlite::params![id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM students WHERE student_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    if removed {
      tracing::info!(student_id = %id, "student removed with attendance history");
      self.notify(ChangeKind::Student, kelas);
    }
    Ok(removed)
  }

  // ── Teachers ──────────────────────────────────────────────────────────────

  async fn add_teacher(&self, input: NewTeacher) -> Result<Teacher> {
    let nip = input.nip.clone();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .prepare("SELECT 1 FROM teachers WHERE nip = ?1")?
            .exists(rusqlite::params![nip])?,
        )
      })
      .await?;
    if taken {
      return Err(Error::DuplicateNip(input.nip));
    }

    let teacher = Teacher {
      teacher_id:  Uuid::new_v4(),
      nip:         input.nip,
      name:        input.name,
      homeroom_of: input.homeroom_of,
    };

    let id_str = encode_uuid(teacher.teacher_id);
    let row = teacher.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO teachers (teacher_id, nip, name, homeroom_of)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, row.nip, row.name, row.homeroom_of],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::DuplicateNip(teacher.nip.clone())
        } else {
          e.into()
        }
      })?;

    tracing::debug!(teacher_id = %teacher.teacher_id, "teacher added");
    self.notify(ChangeKind::Teacher, None);
    Ok(teacher)
  }

  async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTeacher> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM teachers WHERE teacher_id = ?1",
                RawTeacher::COLUMNS
              ),
              rusqlite::params![id_str],
              RawTeacher::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTeacher::into_teacher).transpose()
  }

  async fn list_teachers(&self) -> Result<Vec<Teacher>> {
    let raws: Vec<RawTeacher> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM teachers ORDER BY name",
          RawTeacher::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawTeacher::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTeacher::into_teacher).collect()
  }

  // ── Homeroom attendance ───────────────────────────────────────────────────

  async fn upsert_homeroom(
    &self,
    input: NewHomeroomRecord,
  ) -> Result<HomeroomRecord> {
    let kelas = self
      .kelas_of(input.student_id)
      .await?
      .ok_or(Error::StudentNotFound(input.student_id))?;

    let record = HomeroomRecord {
      student_id:  input.student_id,
      date:        input.date,
      status:      input.status,
      recorded_at: Utc::now(),
    };

    let student_str = encode_uuid(record.student_id);
    let date_str    = encode_date(record.date);
    let status_str  = encode_code(record.status);
    let at_str      = encode_dt(record.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO homeroom_attendance (student_id, date, status, recorded_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (student_id, date)
           DO UPDATE SET status = excluded.status, recorded_at = excluded.recorded_at",
          rusqlite::params![student_str, date_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      student_id = %record.student_id,
      date = %record.date,
      status = %record.status,
      "homeroom attendance upserted"
    );
    self.notify(ChangeKind::HomeroomAttendance, Some(kelas));
    Ok(record)
  }

  async fn list_homeroom(
    &self,
    query: &AttendanceQuery,
  ) -> Result<Vec<HomeroomRecord>> {
    let from_str = encode_date(query.range.from());
    let to_str   = encode_date(query.range.to());

    let raws: Vec<RawHomeroom> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM homeroom_attendance
           WHERE date >= ?1 AND date <= ?2
           ORDER BY date",
          RawHomeroom::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], RawHomeroom::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records: Vec<HomeroomRecord> = raws
      .into_iter()
      .map(RawHomeroom::into_record)
      .collect::<Result<_>>()?;
    records.retain(|r| query.includes(r.student_id));
    Ok(records)
  }

  // ── Journals and subject attendance ───────────────────────────────────────

  async fn record_journal(
    &self,
    input: NewJournal,
  ) -> Result<(JournalEntry, Vec<SubjectLog>)> {
    if self.get_teacher(input.teacher_id).await?.is_none() {
      return Err(Error::TeacherNotFound(input.teacher_id));
    }
    self
      .ensure_students(input.attendance.iter().map(|m| m.student_id).collect())
      .await?;

    let journal = JournalEntry {
      journal_id:  Uuid::new_v4(),
      teacher_id:  input.teacher_id,
      kelas:       input.kelas,
      subject:     input.subject,
      hours:       input.hours,
      created_at:  input.created_at.unwrap_or_else(Utc::now),
      cleanliness: input.cleanliness,
      validation:  input.validation,
    };

    let logs: Vec<SubjectLog> = input
      .attendance
      .into_iter()
      .map(|mark| SubjectLog {
        log_id:     Uuid::new_v4(),
        student_id: mark.student_id,
        journal_id: Some(journal.journal_id),
        created_at: journal.created_at,
        status:     mark.status,
      })
      .collect();

    let journal_row = (
      encode_uuid(journal.journal_id),
      encode_uuid(journal.teacher_id),
      journal.kelas.clone(),
      journal.subject.clone(),
      journal.hours.clone(),
      encode_dt(journal.created_at),
      journal.cleanliness.clone(),
      journal.validation.clone(),
    );
    let log_rows: Vec<(String, String, String)> = logs
      .iter()
      .map(|log| {
        (encode_uuid(log.log_id), encode_uuid(log.student_id), log.status.clone())
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let (journal_id, teacher_id, kelas, subject, hours, created_at, cleanliness, validation) =
          journal_row;
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO journals (
             journal_id, teacher_id, kelas, subject, hours,
             created_at, cleanliness, validation
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            journal_id,
            teacher_id,
            kelas,
            subject,
            hours,
            created_at,
            cleanliness,
            validation,
          ],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO subject_attendance (log_id, journal_id, student_id, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (log_id, student_id, status) in &log_rows {
            stmt.execute(rusqlite::params![
              log_id, journal_id, student_id, created_at, status
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      journal_id = %journal.journal_id,
      kelas = %journal.kelas,
      subject = %journal.subject,
      marks = logs.len(),
      "journal recorded"
    );
    self.notify(ChangeKind::Journal, Some(journal.kelas.clone()));
    Ok((journal, logs))
  }

  async fn get_journal(&self, id: Uuid) -> Result<Option<JournalEntry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawJournal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM journals WHERE journal_id = ?1",
                RawJournal::COLUMNS
              ),
              rusqlite::params![id_str],
              RawJournal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawJournal::into_journal).transpose()
  }

  async fn list_journals(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>> {
    let (start, end) = query.range.utc_bounds();
    let start_str = encode_dt(start);
    let end_str   = encode_dt(end);
    let kelas     = query.kelas.clone();
    let subject   = query.subject.clone();

    let raws: Vec<RawJournal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM journals
           WHERE created_at >= ?1 AND created_at < ?2
             AND (?3 IS NULL OR kelas = ?3)
             AND (?4 IS NULL OR subject = ?4)
           ORDER BY created_at",
          RawJournal::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![start_str, end_str, kelas.as_deref(), subject.as_deref()],
            RawJournal::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJournal::into_journal).collect()
  }

  async fn list_subject_attendance(
    &self,
    query: &AttendanceQuery,
  ) -> Result<Vec<SubjectLog>> {
    let (start, end) = query.range.utc_bounds();
    let start_str = encode_dt(start);
    let end_str   = encode_dt(end);

    let raws: Vec<RawSubjectLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM subject_attendance
           WHERE created_at >= ?1 AND created_at < ?2
           ORDER BY created_at",
          RawSubjectLog::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![start_str, end_str], RawSubjectLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut logs: Vec<SubjectLog> = raws
      .into_iter()
      .map(RawSubjectLog::into_log)
      .collect::<Result<_>>()?;
    logs.retain(|log| query.includes(log.student_id));
    Ok(logs)
  }

  // ── Discipline ────────────────────────────────────────────────────────────

  async fn record_discipline(
    &self,
    input: NewDisciplineNote,
  ) -> Result<DisciplineNote> {
    let kelas = self
      .kelas_of(input.student_id)
      .await?
      .ok_or(Error::StudentNotFound(input.student_id))?;
    if let Some(journal_id) = input.journal_id
      && self.get_journal(journal_id).await?.is_none()
    {
      return Err(Error::JournalNotFound(journal_id));
    }

    let note = DisciplineNote {
      note_id:    Uuid::new_v4(),
      student_id: input.student_id,
      category:   input.category,
      follow_up:  input.follow_up,
      note:       input.note,
      created_at: input.created_at.unwrap_or_else(Utc::now),
      journal_id: input.journal_id,
    };

    let note_id_str    = encode_uuid(note.note_id);
    let student_id_str = encode_uuid(note.student_id);
    let at_str         = encode_dt(note.created_at);
    let journal_id_str = note.journal_id.map(encode_uuid);
    let row            = note.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO discipline_notes (
             note_id, student_id, category, follow_up, note, created_at, journal_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            note_id_str,
            student_id_str,
            row.category,
            row.follow_up,
            row.note,
            at_str,
            journal_id_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(note_id = %note.note_id, student_id = %note.student_id, "discipline note recorded");
    self.notify(ChangeKind::Discipline, Some(kelas));
    Ok(note)
  }

  async fn list_discipline(
    &self,
    query: &AttendanceQuery,
  ) -> Result<Vec<DisciplineNote>> {
    let (start, end) = query.range.utc_bounds();
    let start_str = encode_dt(start);
    let end_str   = encode_dt(end);

    let raws: Vec<RawDiscipline> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM discipline_notes
           WHERE created_at >= ?1 AND created_at < ?2
           ORDER BY created_at",
          RawDiscipline::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![start_str, end_str], RawDiscipline::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut notes: Vec<DisciplineNote> = raws
      .into_iter()
      .map(RawDiscipline::into_note)
      .collect::<Result<_>>()?;
    notes.retain(|n| query.includes(n.student_id));
    Ok(notes)
  }
}
