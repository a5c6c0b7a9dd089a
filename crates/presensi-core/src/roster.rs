//! Master data: students and teachers.
//!
//! Both are owned by administrators and treated as immutable for the duration
//! of a reporting run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student enrolled in one class section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub student_id: Uuid,
  /// National student number; unique across the school.
  pub nisn:       String,
  /// Local school number, if assigned.
  pub nis:        Option<String>,
  pub name:       String,
  /// Class section, e.g. `"7A"`.
  pub kelas:      String,
}

/// Input to [`crate::store::AttendanceStore::add_student`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub nisn:  String,
  #[serde(default)]
  pub nis:   Option<String>,
  pub name:  String,
  pub kelas: String,
}

/// A member of teaching staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
  pub teacher_id:  Uuid,
  /// Civil-service staff number; unique across the school.
  pub nip:         String,
  pub name:        String,
  /// The class this teacher is homeroom teacher of, if any.
  pub homeroom_of: Option<String>,
}

/// Input to [`crate::store::AttendanceStore::add_teacher`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeacher {
  pub nip:         String,
  pub name:        String,
  #[serde(default)]
  pub homeroom_of: Option<String>,
}
