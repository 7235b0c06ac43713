//! Forward attendance row generation.
//!
//! T020: Implement RosterGenerator run cycle

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::ledger::{AttendanceRow, LedgerStore};
use crate::members::MemberStore;

use super::RosterError;

/// Materializes future attendance rows for every member on a roster.
///
/// Designed for a single-writer cron cadence; overlapping concurrent
/// runs are an accepted, documented risk. Each (user, team, date) is
/// existence-checked before insert, so re-running after a partial
/// failure only fills the gaps.
pub struct RosterGenerator<'a> {
    conn: &'a Connection,
    /// Number of future days pre-populated per run
    window_days: u32,
}

impl<'a> RosterGenerator<'a> {
    /// Create a new generator with the given forward window.
    pub fn new(conn: &'a Connection, window_days: u32) -> Self {
        Self { conn, window_days }
    }

    /// Run one generation cycle anchored on today (UTC).
    pub fn run(&self) -> Result<usize, RosterError> {
        self.run_for(Utc::now().date_naive())
    }

    /// Run one generation cycle anchored on the given date.
    ///
    /// The anchor is the day after the latest ledger date, or `today`
    /// when the ledger is empty; rows are generated for
    /// `[anchor, anchor + window - 1]`.
    pub fn run_for(&self, today: NaiveDate) -> Result<usize, RosterError> {
        let ledger = LedgerStore::new(self.conn);
        let members = MemberStore::new(self.conn);

        let anchor = match ledger.latest_date()? {
            Some(latest) => latest + chrono::Duration::days(1),
            None => today,
        };

        let roster = members.active_roster()?;
        let mut inserted = 0;

        for offset in 0..self.window_days {
            let date = anchor + chrono::Duration::days(offset as i64);
            for entry in &roster {
                let row = AttendanceRow::new(entry.user_id, entry.team_id, date, entry.opt_in);
                if ledger.insert_if_absent(&row)? {
                    inserted += 1;
                }
            }
        }

        tracing::info!(
            "Roster generation inserted {} rows ({} members, anchor {})",
            inserted,
            roster.len(),
            anchor
        );

        Ok(inserted)
    }
}
