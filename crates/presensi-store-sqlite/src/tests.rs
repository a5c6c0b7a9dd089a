//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};
use presensi_core::{
  attendance::{NewHomeroomRecord, SubjectMark},
  discipline::NewDisciplineNote,
  event::ChangeKind,
  journal::NewJournal,
  roster::{NewStudent, NewTeacher, Student, Teacher},
  status::AttendanceCode,
  store::{
    AttendanceQuery, AttendanceStore, FailureKind, JournalQuery, StoreError as _,
  },
  DateRange,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

fn range(from: &str, to: &str) -> DateRange {
  DateRange::new(d(from), d(to)).unwrap()
}

async fn enrol(s: &SqliteStore, nisn: &str, name: &str, kelas: &str) -> Student {
  s.add_student(NewStudent {
    nisn:  nisn.into(),
    nis:   None,
    name:  name.into(),
    kelas: kelas.into(),
  })
  .await
  .unwrap()
}

async fn hire(s: &SqliteStore, nip: &str) -> Teacher {
  s.add_teacher(NewTeacher {
    nip:         nip.into(),
    name:        format!("Guru {nip}"),
    homeroom_of: None,
  })
  .await
  .unwrap()
}

fn journal_at(
  teacher: &Teacher,
  kelas: &str,
  at: DateTime<Utc>,
  marks: &[(Uuid, &str)],
) -> NewJournal {
  let mut input = NewJournal::new(teacher.teacher_id, kelas, "Matematika", "1-2");
  input.created_at = Some(at);
  input.attendance = marks
    .iter()
    .map(|(student_id, status)| SubjectMark {
      student_id: *student_id,
      status:     (*status).into(),
    })
    .collect();
  input
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_student() {
  let s = store().await;
  let student = enrol(&s, "0012345678", "Ani", "7A").await;

  let fetched = s.get_student(student.student_id).await.unwrap();
  assert_eq!(fetched, Some(student.clone()));

  let by_nisn = s.find_student_by_nisn("0012345678").await.unwrap();
  assert_eq!(by_nisn.map(|s| s.student_id), Some(student.student_id));
}

#[tokio::test]
async fn get_student_missing_returns_none() {
  let s = store().await;
  assert!(s.get_student(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_nisn_is_rejected() {
  let s = store().await;
  enrol(&s, "001", "Ani", "7A").await;
  let err = s
    .add_student(NewStudent {
      nisn:  "001".into(),
      nis:   None,
      name:  "Budi".into(),
      kelas: "7B".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateNisn(ref n) if n == "001"));
  assert_eq!(err.kind(), FailureKind::Conflict);
}

#[tokio::test]
async fn concurrent_enrolment_with_same_nisn_yields_one_conflict() {
  let s = store().await;
  let enrol_as = |name: &str| {
    s.add_student(NewStudent {
      nisn:  "007".into(),
      nis:   None,
      name:  name.into(),
      kelas: "7A".into(),
    })
  };
  let (a, b) = tokio::join!(enrol_as("Ani"), enrol_as("Budi"));

  let errors: Vec<crate::Error> = [a, b].into_iter().filter_map(Result::err).collect();
  assert_eq!(errors.len(), 1);
  assert!(matches!(errors[0], crate::Error::DuplicateNisn(ref n) if n == "007"));
  assert_eq!(errors[0].kind(), FailureKind::Conflict);
  assert_eq!(s.list_students(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_hiring_with_same_nip_yields_one_conflict() {
  let s = store().await;
  let hire_as = |name: &str| {
    s.add_teacher(NewTeacher {
      nip:         "1985".into(),
      name:        name.into(),
      homeroom_of: None,
    })
  };
  let (a, b) = tokio::join!(hire_as("Bu Sari"), hire_as("Pak Joko"));

  let errors: Vec<crate::Error> = [a, b].into_iter().filter_map(Result::err).collect();
  assert_eq!(errors.len(), 1);
  assert!(matches!(errors[0], crate::Error::DuplicateNip(_)));
  assert_eq!(errors[0].kind(), FailureKind::Conflict);
}

#[tokio::test]
async fn list_students_orders_by_class_then_name() {
  let s = store().await;
  enrol(&s, "1", "Citra", "8A").await;
  enrol(&s, "2", "Budi", "7A").await;
  enrol(&s, "3", "Ani", "7A").await;

  let all: Vec<String> = s
    .list_students(None)
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.name)
    .collect();
  assert_eq!(all, ["Ani", "Budi", "Citra"]);

  let seven_a = s.list_students(Some("7A".into())).await.unwrap();
  assert_eq!(seven_a.len(), 2);
  assert!(seven_a.iter().all(|s| s.kelas == "7A"));
}

#[tokio::test]
async fn duplicate_nip_is_rejected() {
  let s = store().await;
  hire(&s, "1985").await;
  let err = s
    .add_teacher(NewTeacher {
      nip:         "1985".into(),
      name:        "Other".into(),
      homeroom_of: Some("7A".into()),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateNip(_)));
  assert_eq!(s.list_teachers().await.unwrap().len(), 1);
}

// ─── Homeroom attendance ─────────────────────────────────────────────────────

#[tokio::test]
async fn homeroom_upsert_replaces_status_for_same_day() {
  let s = store().await;
  let ani = enrol(&s, "1", "Ani", "7A").await;

  for status in [AttendanceCode::Unexcused, AttendanceCode::Sick] {
    s.upsert_homeroom(NewHomeroomRecord {
      student_id: ani.student_id,
      date: d("2024-01-20"),
      status,
    })
    .await
    .unwrap();
  }

  let rows = s
    .list_homeroom(&AttendanceQuery::all(range("2024-01-01", "2024-01-31")))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].status, AttendanceCode::Sick);
}

#[tokio::test]
async fn homeroom_for_unknown_student_errors() {
  let s = store().await;
  let err = s
    .upsert_homeroom(NewHomeroomRecord {
      student_id: Uuid::new_v4(),
      date:       d("2024-01-20"),
      status:     AttendanceCode::Sick,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::StudentNotFound(_)));
  assert_eq!(err.kind(), FailureKind::NotFound);
}

#[tokio::test]
async fn homeroom_listing_respects_range_and_students() {
  let s = store().await;
  let ani = enrol(&s, "1", "Ani", "7A").await;
  let budi = enrol(&s, "2", "Budi", "7A").await;

  for (student, date) in [
    (&ani, "2024-01-19"),
    (&ani, "2024-01-20"),
    (&budi, "2024-01-20"),
    (&ani, "2024-01-22"),
  ] {
    s.upsert_homeroom(NewHomeroomRecord {
      student_id: student.student_id,
      date:       d(date),
      status:     AttendanceCode::Permitted,
    })
    .await
    .unwrap();
  }

  let query = AttendanceQuery::for_students(
    vec![ani.student_id],
    range("2024-01-20", "2024-01-21"),
  );
  let rows = s.list_homeroom(&query).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].student_id, ani.student_id);
  assert_eq!(rows[0].date, d("2024-01-20"));
}

// ─── Journals ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_journal_writes_logs_with_provenance() {
  let s = store().await;
  let teacher = hire(&s, "1985").await;
  let ani = enrol(&s, "1", "Ani", "7A").await;
  let budi = enrol(&s, "2", "Budi", "7A").await;
  let at = Utc.with_ymd_and_hms(2024, 1, 20, 2, 0, 0).unwrap();

  let (journal, logs) = s
    .record_journal(journal_at(
      &teacher,
      "7A",
      at,
      &[(ani.student_id, "S"), (budi.student_id, "H")],
    ))
    .await
    .unwrap();

  assert_eq!(logs.len(), 2);
  assert!(logs.iter().all(|l| l.journal_id == Some(journal.journal_id)));

  let fetched = s.get_journal(journal.journal_id).await.unwrap().unwrap();
  assert_eq!(fetched, journal);

  let stored = s
    .list_subject_attendance(&AttendanceQuery::all(range("2024-01-20", "2024-01-20")))
    .await
    .unwrap();
  assert_eq!(stored.len(), 2);
  let budi_log = stored.iter().find(|l| l.student_id == budi.student_id).unwrap();
  assert_eq!(budi_log.status, "H");
  assert_eq!(budi_log.code(), None);
}

#[tokio::test]
async fn record_journal_requires_known_teacher_and_students() {
  let s = store().await;
  let teacher = hire(&s, "1985").await;
  let at = Utc.with_ymd_and_hms(2024, 1, 20, 2, 0, 0).unwrap();

  let ghost = Teacher {
    teacher_id:  Uuid::new_v4(),
    nip:         "x".into(),
    name:        "x".into(),
    homeroom_of: None,
  };
  let err = s.record_journal(journal_at(&ghost, "7A", at, &[])).await.unwrap_err();
  assert!(matches!(err, crate::Error::TeacherNotFound(_)));

  let missing = Uuid::new_v4();
  let err = s
    .record_journal(journal_at(&teacher, "7A", at, &[(missing, "A")]))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::StudentNotFound(id) if id == missing));

  let journals = s
    .list_journals(&JournalQuery::in_range(range("2024-01-20", "2024-01-20")))
    .await
    .unwrap();
  assert!(journals.is_empty());
}

#[tokio::test]
async fn subject_logs_are_bucketed_by_school_local_day() {
  let s = store().await;
  let teacher = hire(&s, "1985").await;
  let ani = enrol(&s, "1", "Ani", "7A").await;

  // 17:30 UTC on the 19th is 00:30 on the 20th in school time.
  let just_after_midnight = Utc.with_ymd_and_hms(2024, 1, 19, 17, 30, 0).unwrap();
  // 16:30 UTC on the 20th is 23:30 on the 20th in school time.
  let late_evening = Utc.with_ymd_and_hms(2024, 1, 20, 16, 30, 0).unwrap();
  // 17:00 UTC on the 20th is already the 21st.
  let next_day = Utc.with_ymd_and_hms(2024, 1, 20, 17, 0, 0).unwrap();

  for at in [just_after_midnight, late_evening, next_day] {
    s.record_journal(journal_at(&teacher, "7A", at, &[(ani.student_id, "I")]))
      .await
      .unwrap();
  }

  let day = AttendanceQuery::all(range("2024-01-20", "2024-01-20"));
  let logs = s.list_subject_attendance(&day).await.unwrap();
  assert_eq!(logs.len(), 2);
  assert!(logs.iter().all(|l| l.local_date() == d("2024-01-20")));
}

#[tokio::test]
async fn list_journals_filters_by_class_and_subject() {
  let s = store().await;
  let teacher = hire(&s, "1985").await;
  let at = Utc.with_ymd_and_hms(2024, 1, 20, 2, 0, 0).unwrap();

  s.record_journal(journal_at(&teacher, "7A", at, &[])).await.unwrap();
  s.record_journal(journal_at(&teacher, "7B", at, &[])).await.unwrap();
  let mut other = journal_at(&teacher, "7A", at, &[]);
  other.subject = "IPA".into();
  s.record_journal(other).await.unwrap();

  let mut query = JournalQuery::in_range(range("2024-01-20", "2024-01-20"));
  assert_eq!(s.list_journals(&query).await.unwrap().len(), 3);

  query.kelas = Some("7A".into());
  assert_eq!(s.list_journals(&query).await.unwrap().len(), 2);

  query.subject = Some("Matematika".into());
  let only = s.list_journals(&query).await.unwrap();
  assert_eq!(only.len(), 1);
  assert_eq!(only[0].kelas, "7A");
  assert_eq!(only[0].subject, "Matematika");
}

// ─── Discipline ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn discipline_notes_are_listed_by_range() {
  let s = store().await;
  let ani = enrol(&s, "1", "Ani", "7A").await;

  for (day, category) in [(19, "late"), (20, "uniform")] {
    s.record_discipline(NewDisciplineNote {
      student_id: ani.student_id,
      category:   category.into(),
      follow_up:  Some("warning".into()),
      note:       "noted in class".into(),
      journal_id: None,
      created_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 3, 0, 0).unwrap()),
    })
    .await
    .unwrap();
  }

  let notes = s
    .list_discipline(&AttendanceQuery::all(range("2024-01-20", "2024-01-31")))
    .await
    .unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].category, "uniform");
  assert_eq!(notes[0].follow_up.as_deref(), Some("warning"));
}

#[tokio::test]
async fn discipline_note_with_unknown_journal_errors() {
  let s = store().await;
  let ani = enrol(&s, "1", "Ani", "7A").await;
  let err = s
    .record_discipline(NewDisciplineNote {
      student_id: ani.student_id,
      category:   "late".into(),
      follow_up:  None,
      note:       "".into(),
      journal_id: Some(Uuid::new_v4()),
      created_at: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::JournalNotFound(_)));
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_student_drops_their_history() {
  let s = store().await;
  let teacher = hire(&s, "1985").await;
  let ani = enrol(&s, "1", "Ani", "7A").await;
  let budi = enrol(&s, "2", "Budi", "7A").await;
  let at = Utc.with_ymd_and_hms(2024, 1, 20, 2, 0, 0).unwrap();

  s.record_journal(journal_at(
    &teacher,
    "7A",
    at,
    &[(ani.student_id, "A"), (budi.student_id, "S")],
  ))
  .await
  .unwrap();
  s.upsert_homeroom(NewHomeroomRecord {
    student_id: ani.student_id,
    date:       d("2024-01-20"),
    status:     AttendanceCode::Unexcused,
  })
  .await
  .unwrap();

  assert!(s.remove_student(ani.student_id).await.unwrap());
  assert!(!s.remove_student(ani.student_id).await.unwrap());

  let q = AttendanceQuery::all(range("2024-01-20", "2024-01-20"));
  assert!(s.list_homeroom(&q).await.unwrap().is_empty());
  let logs = s.list_subject_attendance(&q).await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].student_id, budi.student_id);
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_are_announced_on_the_change_feed() {
  let s = store().await;
  let mut rx = s.changes();

  let ani = enrol(&s, "1", "Ani", "7A").await;
  s.upsert_homeroom(NewHomeroomRecord {
    student_id: ani.student_id,
    date:       d("2024-01-20"),
    status:     AttendanceCode::Sick,
  })
  .await
  .unwrap();

  let first = rx.recv().await.unwrap();
  assert_eq!(first.kind, ChangeKind::Student);
  let second = rx.recv().await.unwrap();
  assert_eq!(second.kind, ChangeKind::HomeroomAttendance);
  assert_eq!(second.kelas.as_deref(), Some("7A"));
  assert!(second.affects_attendance());
}

#[tokio::test]
async fn failed_writes_are_not_announced() {
  let s = store().await;
  enrol(&s, "1", "Ani", "7A").await;
  let mut rx = s.changes();

  let _ = s
    .add_student(NewStudent {
      nisn:  "1".into(),
      nis:   None,
      name:  "Again".into(),
      kelas: "7A".into(),
    })
    .await
    .unwrap_err();

  assert!(matches!(
    rx.try_recv(),
    Err(tokio::sync::broadcast::error::TryRecvError::Empty)
  ));
}
