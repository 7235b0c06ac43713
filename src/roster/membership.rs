//! Ledger consistency on membership changes.
//!
//! T021: Implement MembershipHandler backfill and cleanup

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::ledger::{AttendanceRow, LedgerStore};
use crate::members::MemberStore;

use super::RosterError;

/// Keeps the attendance ledger consistent when a member joins or
/// leaves a team. History is never rewritten: only forward-looking
/// rows are created or removed.
pub struct MembershipHandler<'a> {
    conn: &'a Connection,
}

impl<'a> MembershipHandler<'a> {
    /// Create a new handler with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Backfill rows for a member added to a team, up to the ledger's
    /// current horizon.
    pub fn member_added(&self, user_id: Uuid, team_id: Uuid) -> Result<usize, RosterError> {
        self.member_added_on(user_id, team_id, Utc::now().date_naive())
    }

    /// Backfill anchored on the given date, from `today` through the
    /// latest existing ledger date, skipping dates already covered.
    /// An empty ledger leaves nothing to backfill against.
    pub fn member_added_on(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        today: NaiveDate,
    ) -> Result<usize, RosterError> {
        let ledger = LedgerStore::new(self.conn);
        let members = MemberStore::new(self.conn);

        let Some(latest) = ledger.latest_date()? else {
            return Ok(0);
        };

        let member = members
            .get_member(user_id)?
            .ok_or(RosterError::UnknownMember(user_id))?;

        let mut inserted = 0;
        let mut date = today;
        while date <= latest {
            let row = AttendanceRow::new(user_id, team_id, date, member.checkin_opt_in);
            if ledger.insert_if_absent(&row)? {
                inserted += 1;
            }
            date += chrono::Duration::days(1);
        }

        tracing::info!(
            "Backfilled {} attendance rows for member {} on team {}",
            inserted,
            user_id,
            team_id
        );

        Ok(inserted)
    }

    /// Remove the forward-looking rows of a member leaving a team.
    pub fn member_removed(&self, user_id: Uuid, team_id: Uuid) -> Result<usize, RosterError> {
        self.member_removed_on(user_id, team_id, Utc::now().date_naive())
    }

    /// Removal anchored on the given date. Deletes future rows, plus
    /// today's row when no check-in exists yet; completed history is
    /// preserved.
    pub fn member_removed_on(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        today: NaiveDate,
    ) -> Result<usize, RosterError> {
        let ledger = LedgerStore::new(self.conn);
        let deleted = ledger.delete_removed_member_rows(user_id, team_id, today)?;

        tracing::info!(
            "Removed {} attendance rows for member {} leaving team {}",
            deleted,
            user_id,
            team_id
        );

        Ok(deleted)
    }
}
