//! Pure report builders.
//!
//! Every builder takes already-fetched rows and delegates status resolution
//! to [`presensi_core::Reconciler`]. None of them knows the priority rule.

pub mod daily;
pub mod discipline;
pub mod report_card;
pub mod subject;

pub use daily::{daily_stats, DailyStats, PublicStats};
pub use discipline::{discipline, students_in_scope, DisciplineRow};
pub use report_card::{report_card, ReportCardRow};
pub use subject::{subject_recap, SubjectRecapRow};
