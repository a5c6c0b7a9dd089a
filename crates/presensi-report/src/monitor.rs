//! [`LiveMonitor`]: today's figures, kept current from the change feed.
//!
//! One background task owns the refresh loop. Every attendance-affecting
//! change triggers a re-fetch; if another change lands while a refresh is in
//! flight, that refresh is dropped and a new one started, so the published
//! snapshot is always the result of the newest complete fetch. After
//! [`MAX_RESTARTS`] drops in a row the in-flight refresh is let through, and
//! the changes that arrived meanwhile are picked up by the next one.
//!
//! While idle the task also wakes at the next school-local midnight, and at
//! least every `check_every`, so a quiet day still rolls over to a fresh
//! snapshot.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use presensi_core::{date::day_start_utc, event::ChangeEvent, store::AttendanceStore};
use tokio::{
  sync::{broadcast, broadcast::error::RecvError, watch},
  task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{assemble::DailyStats, ReportService};

pub type Snapshot = Option<Arc<DailyStats>>;

/// Consecutive restarts after which an in-flight refresh is allowed to finish.
pub const MAX_RESTARTS: u32 = 8;

/// Default upper bound on how long the idle monitor goes without re-reading
/// the date.
pub const ROLLOVER_CHECK: Duration = Duration::from_secs(60);

pub struct LiveMonitor {
  latest: watch::Receiver<Snapshot>,
  task:   JoinHandle<()>,
}

impl LiveMonitor {
  /// Start monitoring. `today` is asked for the date on every refresh and on
  /// every idle wake-up; a new date forces a refresh.
  pub fn spawn<S, F>(
    service: ReportService<S>,
    changes: broadcast::Receiver<ChangeEvent>,
    today: F,
  ) -> Self
  where
    S: AttendanceStore + 'static,
    F: Fn() -> NaiveDate + Send + 'static,
  {
    Self::spawn_with_check(service, changes, today, ROLLOVER_CHECK)
  }

  /// Like [`LiveMonitor::spawn`], re-reading the date at least every
  /// `check_every` while idle.
  pub fn spawn_with_check<S, F>(
    service: ReportService<S>,
    changes: broadcast::Receiver<ChangeEvent>,
    today: F,
    check_every: Duration,
  ) -> Self
  where
    S: AttendanceStore + 'static,
    F: Fn() -> NaiveDate + Send + 'static,
  {
    let (tx, latest) = watch::channel(None);
    let task = tokio::spawn(run(service, changes, today, check_every, tx));
    Self { latest, task }
  }

  /// The newest complete snapshot, `None` until the first refresh finishes.
  pub fn latest(&self) -> Snapshot { self.latest.borrow().clone() }

  /// A receiver that is notified whenever a new snapshot is published.
  pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.latest.clone() }
}

impl Drop for LiveMonitor {
  fn drop(&mut self) { self.task.abort(); }
}

/// Time until `date` ends at the school, capped at `check_every`. A date that
/// has already ended waits the full `check_every`.
fn until_rollover(date: NaiveDate, check_every: Duration) -> Duration {
  date
    .succ_opt()
    .and_then(|next| (day_start_utc(next) - Utc::now()).to_std().ok())
    .map_or(check_every, |left| left.min(check_every))
}

async fn run<S, F>(
  service: ReportService<S>,
  mut changes: broadcast::Receiver<ChangeEvent>,
  today: F,
  check_every: Duration,
  tx: watch::Sender<Snapshot>,
) where
  S: AttendanceStore,
  F: Fn() -> NaiveDate,
{
  let mut stale = true;
  let mut feed_open = true;
  let mut restarts = 0u32;
  let mut date = today();

  'refresh: loop {
    if !stale {
      tokio::select! {
        event = changes.recv() => match event {
          Ok(event) if event.affects_attendance() => {}
          Ok(_) => continue,
          Err(RecvError::Lagged(missed)) => {
            warn!(missed, "change feed lagged; refreshing");
          }
          Err(RecvError::Closed) => {
            debug!("change feed closed; monitor stopping");
            return;
          }
        },
        _ = tokio::time::sleep(until_rollover(date, check_every)) => {
          let now = today();
          if now == date {
            continue;
          }
          info!(from = %date, to = %now, "date rolled over; refreshing");
        }
      }
    }
    stale = false;

    date = today();
    let refresh = service.daily(date);
    tokio::pin!(refresh);

    loop {
      tokio::select! {
        result = &mut refresh => {
          match result {
            Ok(stats) => {
              info!(
                %date,
                students = stats.total_students,
                present = stats.present_students,
                journals = stats.journal_count,
                "monitor refreshed"
              );
              tx.send_replace(Some(Arc::new(stats)));
            }
            Err(e) => warn!(error = %e, "monitor refresh failed"),
          }
          restarts = 0;
          continue 'refresh;
        }
        event = changes.recv(), if feed_open && restarts < MAX_RESTARTS => match event {
          Ok(event) if event.affects_attendance() => {
            debug!(kind = ?event.kind, restarts, "newer change; restarting refresh");
            restarts += 1;
            stale = true;
            continue 'refresh;
          }
          Ok(_) => {}
          Err(RecvError::Lagged(missed)) => {
            warn!(missed, "change feed lagged; restarting refresh");
            restarts += 1;
            stale = true;
            continue 'refresh;
          }
          Err(RecvError::Closed) => feed_open = false,
        },
      }
    }
  }
}
