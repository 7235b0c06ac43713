//! Check-in/check-out workflow type definitions.
//!
//! T032: Define submission and confirmation state types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messaging::MessageHandle;

/// Kind of a daily submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    CheckIn,
    CheckOut,
}

impl SubmissionKind {
    /// Database text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::CheckIn => "check_in",
            SubmissionKind::CheckOut => "check_out",
        }
    }

    /// Parse the database text form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check_in" => Some(SubmissionKind::CheckIn),
            "check_out" => Some(SubmissionKind::CheckOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionKind::CheckIn => write!(f, "check-in"),
            SubmissionKind::CheckOut => write!(f, "check-out"),
        }
    }
}

/// Mood reported alongside a submission.
///
/// Each submission kind accepts a closed subset: check-ins offer
/// energized/neutral/stressed/tired, check-outs offer
/// happy/neutral/stressed/tired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Energized,
    Happy,
    Neutral,
    Stressed,
    Tired,
}

impl Mood {
    /// Database text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energized => "energized",
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Stressed => "stressed",
            Mood::Tired => "tired",
        }
    }

    /// Parse a mood offered on the check-in prompt.
    pub fn parse_checkin(s: &str) -> Option<Self> {
        match s {
            "energized" => Some(Mood::Energized),
            "neutral" => Some(Mood::Neutral),
            "stressed" => Some(Mood::Stressed),
            "tired" => Some(Mood::Tired),
            _ => None,
        }
    }

    /// Parse a mood offered on the check-out prompt.
    pub fn parse_checkout(s: &str) -> Option<Self> {
        match s {
            "happy" => Some(Mood::Happy),
            "neutral" => Some(Mood::Neutral),
            "stressed" => Some(Mood::Stressed),
            "tired" => Some(Mood::Tired),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable daily submission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier
    pub id: Uuid,
    /// Member who submitted
    pub user_id: Uuid,
    /// Channel (team) the submission belongs to
    pub channel_id: Uuid,
    /// Calendar date in the member's local timezone
    pub date: NaiveDate,
    /// Check-in or check-out
    pub kind: SubmissionKind,
    /// Goal text (check-in)
    pub goal_text: Option<String>,
    /// Update text (check-out)
    pub update_text: Option<String>,
    /// Reported blocker, if any
    pub blocker_text: Option<String>,
    /// Reported mood
    pub mood: Mood,
    /// SMART classifier verdict (check-in)
    pub smart_verdict: Option<bool>,
    /// Whether the day's goals were met (check-out)
    pub goals_met: Option<bool>,
    /// When the submission was confirmed
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Create a confirmed check-in submission.
    pub fn check_in(
        user_id: Uuid,
        channel_id: Uuid,
        date: NaiveDate,
        goal_text: String,
        blocker_text: Option<String>,
        mood: Mood,
        smart_verdict: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            channel_id,
            date,
            kind: SubmissionKind::CheckIn,
            goal_text: Some(goal_text),
            update_text: None,
            blocker_text,
            mood,
            smart_verdict: Some(smart_verdict),
            goals_met: None,
            created_at: Utc::now(),
        }
    }

    /// Create a confirmed check-out submission.
    pub fn check_out(
        user_id: Uuid,
        channel_id: Uuid,
        date: NaiveDate,
        update_text: String,
        blocker_text: Option<String>,
        mood: Mood,
        goals_met: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            channel_id,
            date,
            kind: SubmissionKind::CheckOut,
            goal_text: None,
            update_text: Some(update_text),
            blocker_text,
            mood,
            smart_verdict: None,
            goals_met: Some(goals_met),
            created_at: Utc::now(),
        }
    }
}

/// Workflow state for one (user, channel, local date, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// No draft or submission exists yet
    NotStarted,
    /// A draft was received and is being assessed
    DraftSubmitted,
    /// A confirmation prompt is showing
    AwaitingConfirmation,
    /// A submission was persisted
    Confirmed,
    /// The draft was abandoned
    Cancelled,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkflowState::NotStarted => "not started",
            WorkflowState::DraftSubmitted => "draft submitted",
            WorkflowState::AwaitingConfirmation => "awaiting confirmation",
            WorkflowState::Confirmed => "confirmed",
            WorkflowState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Key of a pending confirmation: (user, channel, local date).
pub type PendingKey = (Uuid, Uuid, NaiveDate);

/// An unresolved confirmation prompt held in memory by the engine.
///
/// The AI-suggested rewrite lives only here until the member explicitly
/// accepts it; a cancelled draft leaves no trace.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    /// Check-in or check-out
    pub kind: SubmissionKind,
    /// Calendar date in the member's local timezone
    pub date: NaiveDate,
    /// Text exactly as the member typed it
    pub original_text: String,
    /// AI-suggested rewrite (check-in only)
    pub suggested_text: Option<String>,
    /// SMART classifier verdict (check-in only)
    pub smart_verdict: Option<bool>,
    /// Handle of the ephemeral prompt, for retraction
    pub prompt: MessageHandle,
}
