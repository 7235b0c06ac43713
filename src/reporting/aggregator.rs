//! Metrics aggregation over ledger and submission rows.
//!
//! T041: Implement MetricsAggregator query

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::ledger::{AttendanceRow, LedgerError, LedgerStore};
use crate::members::{MemberError, MemberStore, Role};

use super::types::{DailyRate, MetricsQuery, MetricsReport, UserDailyScore};

/// Turns sparse ledger rows into dense date-bucketed percentage series.
///
/// Every calendar date in the clipped range yields an entry; dates with
/// no underlying rows report 0, never an absent entry.
pub struct MetricsAggregator<'a> {
    conn: &'a Connection,
}

impl<'a> MetricsAggregator<'a> {
    /// Create a new aggregator with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Compute the report for a query, clipping the range against
    /// today (UTC).
    pub fn query(&self, query: &MetricsQuery) -> Result<MetricsReport, ReportingError> {
        self.query_at(query, Utc::now().date_naive())
    }

    /// Compute the report for a query, clipping the range against the
    /// given date.
    pub fn query_at(
        &self,
        query: &MetricsQuery,
        today: NaiveDate,
    ) -> Result<MetricsReport, ReportingError> {
        let members = MemberStore::new(self.conn);
        let ledger = LedgerStore::new(self.conn);

        let requester = members
            .get_member(query.requesting_user_id)?
            .ok_or(ReportingError::UnknownRequester(query.requesting_user_id))?;

        // Visibility scope: admins see everything, managers their
        // managed teams, members their own teams
        let visible_teams: Option<HashSet<Uuid>> = match requester.role {
            Role::Admin => None,
            Role::Manager => Some(members.managed_team_ids(requester.id)?.into_iter().collect()),
            Role::Member => Some(members.member_team_ids(requester.id)?.into_iter().collect()),
        };

        // Clip the range to the data that can exist
        let end = query.end.min(today);
        let Some(first_ledger_date) = ledger.first_date()? else {
            return Ok(MetricsReport::default());
        };
        let start = query.start.max(first_ledger_date);
        if start > end {
            return Ok(MetricsReport::default());
        }

        let rows = ledger.rows_in_range(start, end)?;
        let rows: Vec<AttendanceRow> = rows
            .into_iter()
            .filter(|row| {
                visible_teams
                    .as_ref()
                    .map_or(true, |teams| teams.contains(&row.team_id))
            })
            .filter(|row| query.team_id.map_or(true, |team| row.team_id == team))
            .filter(|row| {
                query
                    .user_ids
                    .as_ref()
                    .map_or(true, |users| users.contains(&row.user_id))
            })
            .collect();

        // Per-date tallies
        let mut per_date: BTreeMap<NaiveDate, DateTally> = BTreeMap::new();
        let mut per_user_date: BTreeMap<(Uuid, NaiveDate), ScoreTally> = BTreeMap::new();

        for row in &rows {
            let tally = per_date.entry(row.date).or_default();
            tally.total += 1;
            if row.has_checked_in {
                tally.checked_in += 1;
            }
            if row.is_blocked {
                tally.blocked += 1;
            }

            if let Some(score) = row.smart_goal_score {
                let entry = per_user_date.entry((row.user_id, row.date)).or_default();
                entry.sum += score;
                entry.count += 1;
            }
        }

        // Dense series: one entry per calendar date, data or not
        let mut participation = Vec::new();
        let mut blocked = Vec::new();
        let mut date = start;
        while date <= end {
            let tally = per_date.get(&date).copied().unwrap_or_default();
            participation.push(DailyRate {
                date,
                percentage: tally.rate(tally.checked_in),
            });
            blocked.push(DailyRate {
                date,
                percentage: tally.rate(tally.blocked),
            });
            date += chrono::Duration::days(1);
        }

        let smart_scores = per_user_date
            .into_iter()
            .map(|((user_id, date), tally)| UserDailyScore {
                user_id,
                date,
                score: (tally.sum / tally.count as f64 * 100.0).round() / 100.0,
            })
            .collect();

        Ok(MetricsReport {
            participation,
            blocked,
            smart_scores,
        })
    }
}

/// Row counts for one date.
#[derive(Debug, Clone, Copy, Default)]
struct DateTally {
    total: u32,
    checked_in: u32,
    blocked: u32,
}

impl DateTally {
    /// Numerator over total as a nearest-integer percent.
    fn rate(&self, numerator: u32) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (numerator as f64 / self.total as f64 * 100.0).round() as u8
    }
}

/// Running SMART score for one (member, date).
#[derive(Debug, Clone, Copy, Default)]
struct ScoreTally {
    sum: f64,
    count: u32,
}

/// Reporting errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Member error: {0}")]
    Member(#[from] MemberError),

    #[error("Unknown requesting member: {0}")]
    UnknownRequester(Uuid),
}
