//! Attendance ledger type definitions.
//!
//! T016: Define AttendanceRow

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ledger record per (member, team, date) representing expected and
/// actual daily participation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRow {
    /// Member this row belongs to
    pub user_id: Uuid,
    /// Team the member is expected to report to
    pub team_id: Uuid,
    /// Calendar date of the expected check-in
    pub date: NaiveDate,
    /// Snapshot of the member's check-in opt-in at generation time
    pub is_active: bool,
    /// Whether a confirmed check-in exists for this row
    pub has_checked_in: bool,
    /// Whether the member reported a blocker
    pub is_blocked: bool,
    /// SMART quality score recorded at check-in
    pub smart_goal_score: Option<f64>,
}

impl AttendanceRow {
    /// Create a fresh, not-yet-checked-in row.
    pub fn new(user_id: Uuid, team_id: Uuid, date: NaiveDate, is_active: bool) -> Self {
        Self {
            user_id,
            team_id,
            date,
            is_active,
            has_checked_in: false,
            is_blocked: false,
            smart_goal_score: None,
        }
    }
}
