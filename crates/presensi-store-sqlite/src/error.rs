//! Error type for `presensi-store-sqlite`.

use presensi_core::store::{FailureKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] presensi_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored homeroom status is not one of `S`, `I`, `A`, `D`.
  #[error("invalid stored attendance code: {0:?}")]
  InvalidCode(String),

  #[error("student not found: {0}")]
  StudentNotFound(uuid::Uuid),

  #[error("teacher not found: {0}")]
  TeacherNotFound(uuid::Uuid),

  #[error("journal not found: {0}")]
  JournalNotFound(uuid::Uuid),

  #[error("a student with NISN {0:?} already exists")]
  DuplicateNisn(String),

  #[error("a teacher with NIP {0:?} already exists")]
  DuplicateNip(String),
}

impl StoreError for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Error::StudentNotFound(_)
      | Error::TeacherNotFound(_)
      | Error::JournalNotFound(_) => FailureKind::NotFound,
      Error::DuplicateNisn(_) | Error::DuplicateNip(_) => FailureKind::Conflict,
      Error::Core(_) => FailureKind::Invalid,
      Error::Database(_)
      | Error::Uuid(_)
      | Error::DateParse(_)
      | Error::InvalidCode(_) => FailureKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
