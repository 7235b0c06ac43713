//! Attendance ledger module.
//!
//! One row per (member, team, date): expected participation, written by
//! the roster generator and membership handler, completed by confirmed
//! submissions.

pub mod store;
pub mod types;

pub use store::{LedgerError, LedgerStore};
pub use types::AttendanceRow;
