//! Core types and the attendance reconciler for the Presensi journal system.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod date;
pub mod discipline;
pub mod error;
pub mod event;
pub mod journal;
pub mod reconcile;
pub mod roster;
pub mod status;
pub mod store;

pub use date::DateRange;
pub use error::{Error, Result};
pub use reconcile::Reconciler;
pub use status::{AttendanceCode, DailyStatus};
