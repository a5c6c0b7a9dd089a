//! Attendance reports built on the reconciler.
//!
//! The [`assemble`] module holds the pure report builders: each takes rows that
//! were already fetched and returns presentation-ready rows. [`ReportService`]
//! does the fetching against any [`presensi_core::store::AttendanceStore`],
//! running all reads of one report concurrently before assembling.
//! [`LiveMonitor`] keeps today's figures current as the store changes.

pub mod assemble;
pub mod directory;
pub mod error;
pub mod monitor;
pub mod service;

pub use directory::Directory;
pub use error::{Error, Result};
pub use monitor::LiveMonitor;
pub use service::ReportService;

#[cfg(test)]
mod fixtures;
