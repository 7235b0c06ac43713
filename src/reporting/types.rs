//! Reporting type definitions.
//!
//! T040: Define metrics query and report payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for a metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsQuery {
    /// First date of the requested range
    pub start: NaiveDate,
    /// Last date of the requested range
    pub end: NaiveDate,
    /// Restrict to a single team
    pub team_id: Option<Uuid>,
    /// Restrict to a set of members
    pub user_ids: Option<Vec<Uuid>>,
    /// Member the report is computed for; determines visibility scope
    pub requesting_user_id: Uuid,
}

/// One dense per-date percentage entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    /// Calendar date
    pub date: NaiveDate,
    /// Rounded to the nearest integer percent; 0 when no rows exist
    pub percentage: u8,
}

/// Mean SMART score for one member on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDailyScore {
    /// Member the score belongs to
    pub user_id: Uuid,
    /// Calendar date
    pub date: NaiveDate,
    /// Mean of the member's row scores, rounded to two decimals
    pub score: f64,
}

/// The three series returned to a reporting caller as one payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Percent of ledger rows with a confirmed check-in, per date
    pub participation: Vec<DailyRate>,
    /// Percent of ledger rows reporting a blocker, per date
    pub blocked: Vec<DailyRate>,
    /// Mean SMART score per (member, date)
    pub smart_scores: Vec<UserDailyScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_dense_entries() {
        let report = MetricsReport {
            participation: vec![DailyRate {
                date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                percentage: 40,
            }],
            blocked: vec![DailyRate {
                date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                percentage: 0,
            }],
            smart_scores: Vec::new(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["participation"][0]["date"], "2025-02-01");
        assert_eq!(json["participation"][0]["percentage"], 40);
    }
}
