//! Calendar-date normalisation.
//!
//! The school runs on a fixed UTC+7 offset. Every timestamp that needs to be
//! matched against a calendar date goes through [`local_date`], and every
//! calendar range that needs to be turned into a timestamp interval goes
//! through [`DateRange::utc_bounds`]. Nothing else does offset arithmetic.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Serialize;

use crate::{Error, Result};

/// Offset of the school's reporting timezone from UTC, in hours.
pub const SCHOOL_UTC_OFFSET_HOURS: i64 = 7;

fn school_offset() -> TimeDelta { TimeDelta::hours(SCHOOL_UTC_OFFSET_HOURS) }

/// The calendar date a timestamp falls on in the school's timezone.
pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
  (ts.naive_utc() + school_offset()).date()
}

/// The UTC instant at which `date` begins in the school's timezone.
pub fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
  (date.and_time(NaiveTime::MIN) - school_offset()).and_utc()
}

/// Today's date at the school.
pub fn today() -> NaiveDate { local_date(Utc::now()) }

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

// ─── DateRange ───────────────────────────────────────────────────────────────

/// An inclusive range of calendar dates. Always non-empty: `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
  from: NaiveDate,
  to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
    if from > to {
      return Err(Error::InvertedDateRange { from, to });
    }
    Ok(Self { from, to })
  }

  /// A range covering exactly one day.
  pub fn single(date: NaiveDate) -> Self { Self { from: date, to: date } }

  /// Build a range from optional query-string bounds. Both bounds are
  /// required; blank strings count as missing.
  pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
    let (Some(from), Some(to)) = (
      from.filter(|s| !s.trim().is_empty()),
      to.filter(|s| !s.trim().is_empty()),
    ) else {
      return Err(Error::MissingDateRange);
    };
    Self::new(parse_date(from)?, parse_date(to)?)
  }

  pub fn from(&self) -> NaiveDate { self.from }

  pub fn to(&self) -> NaiveDate { self.to }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.from <= date && date <= self.to
  }

  /// Number of calendar days covered, inclusive of both ends.
  pub fn len_days(&self) -> i64 { (self.to - self.from).num_days() + 1 }

  /// Every date in the range, in order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
    self.from.iter_days().take_while(|d| *d <= self.to)
  }

  /// The half-open UTC interval `[start, end)` covering the whole range in
  /// the school's timezone.
  pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day_start_utc(self.from);
    let end = day_start_utc(self.to) + TimeDelta::days(1);
    (start, end)
  }
}
