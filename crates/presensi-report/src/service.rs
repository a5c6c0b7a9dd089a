//! [`ReportService`]: fetch, then reconcile.
//!
//! Each report issues its reads concurrently, waits for all of them, and only
//! then runs the pure assembler over the materialised rows.

use std::{collections::BTreeSet, sync::Arc};

use chrono::NaiveDate;
use presensi_core::{
  store::{AttendanceQuery, AttendanceStore, JournalQuery},
  DateRange,
};
use tracing::debug;

use crate::{
  assemble::{
    self, DailyStats, DisciplineRow, ReportCardRow, SubjectRecapRow,
  },
  Directory, Error, Result,
};

pub struct ReportService<S> {
  store: Arc<S>,
}

impl<S> Clone for ReportService<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: AttendanceStore> ReportService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Absence recap for one class, one row per enrolled student.
  pub async fn report_card(
    &self,
    kelas: &str,
    range: DateRange,
  ) -> Result<Vec<ReportCardRow>> {
    let query = AttendanceQuery::all(range);
    let (students, homeroom, subject) = tokio::try_join!(
      async {
        self
          .store
          .list_students(Some(kelas.to_owned()))
          .await
          .map_err(Error::store)
      },
      async { self.store.list_homeroom(&query).await.map_err(Error::store) },
      async {
        self
          .store
          .list_subject_attendance(&query)
          .await
          .map_err(Error::store)
      },
    )?;

    debug!(
      kelas,
      students = students.len(),
      homeroom = homeroom.len(),
      subject = subject.len(),
      "assembling report card"
    );
    Ok(assemble::report_card(&students, range, &homeroom, &subject))
  }

  /// School-wide discipline dashboard.
  pub async fn discipline(&self, range: DateRange) -> Result<Vec<DisciplineRow>> {
    let query = AttendanceQuery::all(range);
    let (students, homeroom, subject, notes) = tokio::try_join!(
      async { self.store.list_students(None).await.map_err(Error::store) },
      async { self.store.list_homeroom(&query).await.map_err(Error::store) },
      async {
        self
          .store
          .list_subject_attendance(&query)
          .await
          .map_err(Error::store)
      },
      async { self.store.list_discipline(&query).await.map_err(Error::store) },
    )?;

    let sessions: BTreeSet<_> = notes.iter().filter_map(|n| n.journal_id).collect();
    let reporters = Directory::new(self.store.as_ref())
      .with_students(&students)
      .reporters(sessions)
      .await?;

    debug!(
      students = students.len(),
      homeroom = homeroom.len(),
      subject = subject.len(),
      notes = notes.len(),
      reporters = reporters.len(),
      "assembling discipline report"
    );
    Ok(assemble::discipline(
      &students, range, &homeroom, &subject, &notes, &reporters,
    ))
  }

  /// Meetings attended per student for one class and subject.
  pub async fn subject_recap(
    &self,
    kelas: &str,
    subject: &str,
    range: DateRange,
  ) -> Result<Vec<SubjectRecapRow>> {
    let query = AttendanceQuery::all(range);
    let journal_query = JournalQuery {
      kelas: Some(kelas.to_owned()),
      subject: Some(subject.to_owned()),
      range,
    };
    let (students, journals, homeroom, logs) = tokio::try_join!(
      async {
        self
          .store
          .list_students(Some(kelas.to_owned()))
          .await
          .map_err(Error::store)
      },
      async {
        self.store.list_journals(&journal_query).await.map_err(Error::store)
      },
      async { self.store.list_homeroom(&query).await.map_err(Error::store) },
      async {
        self
          .store
          .list_subject_attendance(&query)
          .await
          .map_err(Error::store)
      },
    )?;

    debug!(
      kelas,
      subject,
      students = students.len(),
      meetings = journals.len(),
      "assembling subject recap"
    );
    Ok(assemble::subject_recap(
      &students, range, &journals, &homeroom, &logs,
    ))
  }

  /// Figures for a single day across every class.
  pub async fn daily(&self, date: NaiveDate) -> Result<DailyStats> {
    let range = DateRange::single(date);
    let query = AttendanceQuery::all(range);
    let journal_query = JournalQuery::in_range(range);
    let (students, homeroom, subject, journals) = tokio::try_join!(
      async { self.store.list_students(None).await.map_err(Error::store) },
      async { self.store.list_homeroom(&query).await.map_err(Error::store) },
      async {
        self
          .store
          .list_subject_attendance(&query)
          .await
          .map_err(Error::store)
      },
      async {
        self.store.list_journals(&journal_query).await.map_err(Error::store)
      },
    )?;

    debug!(
      %date,
      students = students.len(),
      journals = journals.len(),
      "assembling daily stats"
    );
    Ok(assemble::daily_stats(
      &students, date, &homeroom, &subject, &journals,
    ))
  }
}
