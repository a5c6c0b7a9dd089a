//! Error types for `presensi-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("date range is missing a bound")]
  MissingDateRange,

  #[error("date range is inverted: {from} is after {to}")]
  InvertedDateRange { from: NaiveDate, to: NaiveDate },

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
