//! SQL schema for the Presensi SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    student_id  TEXT PRIMARY KEY,
    nisn        TEXT NOT NULL UNIQUE,
    nis         TEXT,
    name        TEXT NOT NULL,
    kelas       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teachers (
    teacher_id  TEXT PRIMARY KEY,
    nip         TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    homeroom_of TEXT
);

-- The official daily record. One row per (student, date); corrections
-- overwrite the status in place.
CREATE TABLE IF NOT EXISTS homeroom_attendance (
    student_id  TEXT NOT NULL REFERENCES students(student_id),
    date        TEXT NOT NULL,   -- YYYY-MM-DD, school-local
    status      TEXT NOT NULL CHECK (status IN ('S', 'I', 'A', 'D')),
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (student_id, date)
);

CREATE TABLE IF NOT EXISTS journals (
    journal_id  TEXT PRIMARY KEY,
    teacher_id  TEXT NOT NULL REFERENCES teachers(teacher_id),
    kelas       TEXT NOT NULL,
    subject     TEXT NOT NULL,
    hours       TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, microsecond precision
    cleanliness TEXT,
    validation  TEXT
);

-- Per-period marks. Written only together with their journal and never
-- updated. The status is stored as entered; unknown codes are tolerated.
CREATE TABLE IF NOT EXISTS subject_attendance (
    log_id      TEXT PRIMARY KEY,
    journal_id  TEXT REFERENCES journals(journal_id),
    student_id  TEXT NOT NULL REFERENCES students(student_id),
    created_at  TEXT NOT NULL,
    status      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS discipline_notes (
    note_id     TEXT PRIMARY KEY,
    student_id  TEXT NOT NULL REFERENCES students(student_id),
    category    TEXT NOT NULL,
    follow_up   TEXT,
    note        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    journal_id  TEXT REFERENCES journals(journal_id)
);

CREATE INDEX IF NOT EXISTS students_kelas_idx      ON students(kelas);
CREATE INDEX IF NOT EXISTS homeroom_date_idx       ON homeroom_attendance(date);
CREATE INDEX IF NOT EXISTS journals_created_idx    ON journals(created_at);
CREATE INDEX IF NOT EXISTS subject_created_idx     ON subject_attendance(created_at);
CREATE INDEX IF NOT EXISTS subject_journal_idx     ON subject_attendance(journal_id);
CREATE INDEX IF NOT EXISTS discipline_created_idx  ON discipline_notes(created_at);

PRAGMA user_version = 1;
";
