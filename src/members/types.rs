//! Member and team type definitions.
//!
//! T014: Define Member, Team, and role types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reporting scope role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees every team's data
    Admin,
    /// Sees data for teams they manage
    Manager,
    /// Sees data for their own teams only
    #[default]
    Member,
}

impl Role {
    /// Database text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
        }
    }

    /// Parse the database text form; unknown values fall back to Member.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            _ => Role::Member,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A member as read from the identity collaborator's tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub display_name: String,
    /// Reporting scope role
    pub role: Role,
    /// Whether the member account is active
    pub is_active: bool,
    /// Whether the member opted into daily check-ins
    pub checkin_opt_in: bool,
    /// Offset from UTC in minutes, for local calendar-date math
    pub tz_offset_minutes: i32,
    /// When the member record was created
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Create a new active, opted-in member.
    pub fn new(display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name,
            role: Role::Member,
            is_active: true,
            checkin_opt_in: true,
            tz_offset_minutes: 0,
            created_at: Utc::now(),
        }
    }

    /// The member's local calendar date at the given instant.
    pub fn local_date(&self, now_utc: DateTime<Utc>) -> NaiveDate {
        (now_utc + chrono::Duration::minutes(self.tz_offset_minutes as i64)).date_naive()
    }
}

/// A team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier; doubles as the team's channel id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Member who manages this team, if any
    pub manager_id: Option<Uuid>,
    /// When the team record was created
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            manager_id: None,
            created_at: Utc::now(),
        }
    }
}

/// One active (user, team, opt-in) tuple, as consumed by the roster
/// generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub opt_in: bool,
}
