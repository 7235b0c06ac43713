//! Attendance ledger storage operations.
//!
//! T017: Create LedgerStore for attendance row CRUD

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::AttendanceRow;

/// Store for attendance ledger rows.
pub struct LedgerStore<'a> {
    conn: &'a Connection,
}

impl<'a> LedgerStore<'a> {
    /// Create a new ledger store with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a row unless one already exists for its (user, team, date).
    ///
    /// Returns `true` if a row was inserted. The existence check makes
    /// repeated generator runs idempotent and a failed run safe to retry.
    pub fn insert_if_absent(&self, row: &AttendanceRow) -> Result<bool, LedgerError> {
        if self.exists(row.user_id, row.team_id, row.date)? {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO attendance
             (user_id, team_id, date, is_active, has_checked_in, is_blocked, smart_goal_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.user_id.to_string(),
                row.team_id.to_string(),
                row.date.to_string(),
                row.is_active as i32,
                row.has_checked_in as i32,
                row.is_blocked as i32,
                row.smart_goal_score,
            ],
        )?;

        Ok(true)
    }

    /// Check whether a row exists for the given key.
    pub fn exists(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, LedgerError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM attendance
             WHERE user_id = ?1 AND team_id = ?2 AND date = ?3)",
            params![user_id.to_string(), team_id.to_string(), date.to_string()],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    /// Get a single row by its key.
    pub fn get(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRow>, LedgerError> {
        self.conn
            .query_row(
                "SELECT user_id, team_id, date, is_active, has_checked_in, is_blocked,
                        smart_goal_score
                 FROM attendance
                 WHERE user_id = ?1 AND team_id = ?2 AND date = ?3",
                params![user_id.to_string(), team_id.to_string(), date.to_string()],
                parse_attendance_row,
            )
            .optional()
            .map_err(LedgerError::from)
    }

    /// Latest date present anywhere in the ledger.
    pub fn latest_date(&self) -> Result<Option<NaiveDate>, LedgerError> {
        let date_str: Option<String> =
            self.conn
                .query_row("SELECT MAX(date) FROM attendance", [], |row| row.get(0))?;

        Ok(date_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }

    /// Earliest date present anywhere in the ledger.
    pub fn first_date(&self) -> Result<Option<NaiveDate>, LedgerError> {
        let date_str: Option<String> =
            self.conn
                .query_row("SELECT MIN(date) FROM attendance", [], |row| row.get(0))?;

        Ok(date_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }

    /// All rows with dates inside `[start, end]`, inclusive.
    ///
    /// Rows whose identifiers or date fail to parse are skipped rather
    /// than aborting the scan.
    pub fn rows_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRow>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, team_id, date, is_active, has_checked_in, is_blocked,
                    smart_goal_score
             FROM attendance
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date ASC",
        )?;

        let rows = stmt.query_map(params![start.to_string(), end.to_string()], |row| {
            let user_id: String = row.get(0)?;
            let team_id: String = row.get(1)?;
            let date: String = row.get(2)?;
            let is_active: i32 = row.get(3)?;
            let has_checked_in: i32 = row.get(4)?;
            let is_blocked: i32 = row.get(5)?;
            let smart_goal_score: Option<f64> = row.get(6)?;
            Ok((
                user_id,
                team_id,
                date,
                is_active,
                has_checked_in,
                is_blocked,
                smart_goal_score,
            ))
        })?;

        let mut parsed = Vec::new();
        for row in rows {
            let (user_id, team_id, date, is_active, has_checked_in, is_blocked, score) = row?;

            let (user_id, team_id, date) = match (
                Uuid::parse_str(&user_id),
                Uuid::parse_str(&team_id),
                NaiveDate::parse_from_str(&date, "%Y-%m-%d"),
            ) {
                (Ok(u), Ok(t), Ok(d)) => (u, t, d),
                _ => {
                    tracing::warn!("Skipping attendance row with broken linkage");
                    continue;
                }
            };

            parsed.push(AttendanceRow {
                user_id,
                team_id,
                date,
                is_active: is_active != 0,
                has_checked_in: has_checked_in != 0,
                is_blocked: is_blocked != 0,
                smart_goal_score: score,
            });
        }

        Ok(parsed)
    }

    /// Record a confirmed check-in on the row.
    ///
    /// Returns `false` when no ledger row exists for the key.
    pub fn record_checkin(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
        blocked: bool,
        smart_goal_score: f64,
    ) -> Result<bool, LedgerError> {
        let updated = self.conn.execute(
            "UPDATE attendance
             SET has_checked_in = 1, is_blocked = ?4, smart_goal_score = ?5
             WHERE user_id = ?1 AND team_id = ?2 AND date = ?3",
            params![
                user_id.to_string(),
                team_id.to_string(),
                date.to_string(),
                blocked as i32,
                smart_goal_score,
            ],
        )?;

        Ok(updated > 0)
    }

    /// Record a confirmed check-out on the row.
    ///
    /// A blocker reported at check-out marks the row blocked; a clear
    /// check-out never un-blocks a row that was blocked at check-in.
    pub fn record_checkout(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
        blocked: bool,
    ) -> Result<bool, LedgerError> {
        let updated = self.conn.execute(
            "UPDATE attendance
             SET is_blocked = MAX(is_blocked, ?4)
             WHERE user_id = ?1 AND team_id = ?2 AND date = ?3",
            params![
                user_id.to_string(),
                team_id.to_string(),
                date.to_string(),
                blocked as i32,
            ],
        )?;

        Ok(updated > 0)
    }

    /// Delete the rows a removed member no longer owes: strictly future
    /// dates, plus today when no check-in has happened yet. Past rows and
    /// today's row with a completed check-in are preserved.
    pub fn delete_removed_member_rows(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        today: NaiveDate,
    ) -> Result<usize, LedgerError> {
        let deleted = self.conn.execute(
            "DELETE FROM attendance
             WHERE user_id = ?1 AND team_id = ?2
               AND (date > ?3 OR (date = ?3 AND has_checked_in = 0))",
            params![user_id.to_string(), team_id.to_string(), today.to_string()],
        )?;

        Ok(deleted)
    }

    /// Count all rows (test support).
    pub fn count(&self) -> Result<usize, LedgerError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM attendance", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

/// Parse a database row into an AttendanceRow.
fn parse_attendance_row(row: &rusqlite::Row) -> rusqlite::Result<AttendanceRow> {
    let user_id_str: String = row.get(0)?;
    let team_id_str: String = row.get(1)?;
    let date_str: String = row.get(2)?;
    let is_active: i32 = row.get(3)?;
    let has_checked_in: i32 = row.get(4)?;
    let is_blocked: i32 = row.get(5)?;

    Ok(AttendanceRow {
        user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
        team_id: Uuid::parse_str(&team_id_str).unwrap_or_default(),
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or(NaiveDate::MIN),
        is_active: is_active != 0,
        has_checked_in: has_checked_in != 0,
        is_blocked: is_blocked != 0,
        smart_goal_score: row.get(6)?,
    })
}

/// Ledger storage errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}
