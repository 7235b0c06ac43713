//! Submission storage operations.
//!
//! T033: Create SubmissionStore for immutable submission records

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{Mood, Submission, SubmissionKind};

/// Store for daily submissions. Rows are written once and never
/// updated.
pub struct SubmissionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SubmissionStore<'a> {
    /// Create a new submission store with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a submission record.
    pub fn insert(&self, submission: &Submission) -> Result<(), SubmissionError> {
        self.conn.execute(
            "INSERT INTO submissions
             (id, user_id, channel_id, date, kind, goal_text, update_text, blocker_text,
              mood, smart_verdict, goals_met, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                submission.id.to_string(),
                submission.user_id.to_string(),
                submission.channel_id.to_string(),
                submission.date.to_string(),
                submission.kind.as_str(),
                submission.goal_text,
                submission.update_text,
                submission.blocker_text,
                submission.mood.as_str(),
                submission.smart_verdict.map(|v| v as i32),
                submission.goals_met.map(|v| v as i32),
                submission.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Check whether a submission exists for the given key.
    pub fn exists(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        date: NaiveDate,
        kind: SubmissionKind,
    ) -> Result<bool, SubmissionError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM submissions
             WHERE user_id = ?1 AND channel_id = ?2 AND date = ?3 AND kind = ?4)",
            params![
                user_id.to_string(),
                channel_id.to_string(),
                date.to_string(),
                kind.as_str(),
            ],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    /// Get a submission by its key.
    pub fn get(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        date: NaiveDate,
        kind: SubmissionKind,
    ) -> Result<Option<Submission>, SubmissionError> {
        self.conn
            .query_row(
                "SELECT id, user_id, channel_id, date, kind, goal_text, update_text,
                        blocker_text, mood, smart_verdict, goals_met, created_at
                 FROM submissions
                 WHERE user_id = ?1 AND channel_id = ?2 AND date = ?3 AND kind = ?4",
                params![
                    user_id.to_string(),
                    channel_id.to_string(),
                    date.to_string(),
                    kind.as_str(),
                ],
                parse_submission_row,
            )
            .optional()
            .map_err(SubmissionError::from)
    }

    /// Count all submissions (test support).
    pub fn count(&self) -> Result<usize, SubmissionError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

/// Parse a database row into a Submission.
fn parse_submission_row(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let channel_id_str: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let kind_str: String = row.get(4)?;
    let mood_str: String = row.get(8)?;
    let smart_verdict: Option<i32> = row.get(9)?;
    let goals_met: Option<i32> = row.get(10)?;
    let created_at_str: String = row.get(11)?;

    let kind = SubmissionKind::parse(&kind_str).unwrap_or(SubmissionKind::CheckIn);

    let mood = match kind {
        SubmissionKind::CheckIn => Mood::parse_checkin(&mood_str),
        SubmissionKind::CheckOut => Mood::parse_checkout(&mood_str),
    }
    .unwrap_or(Mood::Neutral);

    Ok(Submission {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
        channel_id: Uuid::parse_str(&channel_id_str).unwrap_or_default(),
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or(NaiveDate::MIN),
        kind,
        goal_text: row.get(5)?,
        update_text: row.get(6)?,
        blocker_text: row.get(7)?,
        mood,
        smart_verdict: smart_verdict.map(|v| v != 0),
        goals_met: goals_met.map(|v| v != 0),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Submission storage errors.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}
