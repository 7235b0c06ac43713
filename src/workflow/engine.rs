//! Check-in/check-out workflow engine.
//!
//! T035: Implement WorkflowEngine event handling
//! T036: Implement confirmation actions and duplicate guards
//!
//! One engine handles one decoded interaction event at a time, in a
//! request/response style. Every event is acknowledged before any
//! other work; the platform treats a late acknowledgment as a failed
//! interaction and retries it.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::ledger::{LedgerError, LedgerStore};
use crate::members::{Member, MemberError, MemberStore};
use crate::messaging::{ActionId, FormState, InteractionEvent, Messenger, MessagingError, SlashCommand};
use crate::smart::SmartAssist;

use super::messages;
use super::store::{SubmissionError, SubmissionStore};
use super::types::{
    Mood, PendingConfirmation, PendingKey, Submission, SubmissionKind, WorkflowState,
};

/// Per-user, per-channel, per-day conversational state machine for
/// daily check-ins and check-outs.
///
/// Confirmation prompts are held in memory; everything durable goes
/// through the submission and ledger stores. At most one submission of
/// each kind can exist per (user, channel, local calendar date).
pub struct WorkflowEngine<'a, M, S> {
    conn: &'a Connection,
    messenger: &'a M,
    smart: &'a S,
    /// Bound on each SMART assist call
    smart_timeout: Duration,
    /// Unresolved confirmation prompts
    pending: HashMap<PendingKey, PendingConfirmation>,
}

impl<'a, M: Messenger, S: SmartAssist> WorkflowEngine<'a, M, S> {
    /// Create a new workflow engine.
    pub fn new(conn: &'a Connection, messenger: &'a M, smart: &'a S, smart_timeout: Duration) -> Self {
        Self {
            conn,
            messenger,
            smart,
            smart_timeout,
            pending: HashMap::new(),
        }
    }

    /// Handle one interaction event.
    pub async fn handle_event(&mut self, event: InteractionEvent) -> Result<(), WorkflowError> {
        self.handle_event_at(event, Utc::now()).await
    }

    /// Handle one interaction event at the given instant.
    ///
    /// The acknowledgment goes out first, unconditionally, before any
    /// store or assist call.
    pub async fn handle_event_at(
        &mut self,
        event: InteractionEvent,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.messenger.ack(event.response()).await?;

        match event {
            InteractionEvent::CommandInvoked {
                command,
                user_id,
                channel_id,
                text,
                ..
            } => match command {
                SlashCommand::CheckIn => self.start_checkin(user_id, channel_id, text, now).await,
                SlashCommand::CheckOut => self.start_checkout(user_id, channel_id, text, now).await,
            },
            InteractionEvent::ActionTriggered {
                action,
                user_id,
                channel_id,
                form,
                ..
            } => self.resolve_action(action, user_id, channel_id, form, now).await,
        }
    }

    /// Current state of the workflow for a key and submission kind.
    pub fn state(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
        date: chrono::NaiveDate,
        kind: SubmissionKind,
    ) -> Result<WorkflowState, WorkflowError> {
        if SubmissionStore::new(self.conn).exists(user_id, channel_id, date, kind)? {
            return Ok(WorkflowState::Confirmed);
        }

        let pending_kind = self
            .pending
            .get(&(user_id, channel_id, date))
            .map(|p| p.kind);
        if pending_kind == Some(kind) {
            return Ok(WorkflowState::AwaitingConfirmation);
        }

        Ok(WorkflowState::NotStarted)
    }

    /// Process a check-in draft through the entry guard, the SMART
    /// assessment, and on to a confirmation prompt.
    async fn start_checkin(
        &mut self,
        user_id: Uuid,
        channel_id: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        let member = self.load_member(user_id, channel_id).await?;

        let goal = text.trim().to_string();
        if goal.is_empty() {
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::EMPTY_CHECKIN)
                .await?;
            return Err(WorkflowError::Validation("empty check-in goal".to_string()));
        }

        let date = member.local_date(now);

        // Entry guard: a confirmed check-in closes the day
        let submissions = SubmissionStore::new(self.conn);
        if submissions.exists(user_id, channel_id, date, SubmissionKind::CheckIn)? {
            tracing::debug!("Duplicate check-in attempt by {} on {}", user_id, date);
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::ALREADY_CHECKED_IN)
                .await?;
            return Ok(());
        }

        tracing::debug!(
            "Check-in {} for {} on {}",
            WorkflowState::DraftSubmitted,
            user_id,
            date
        );

        let (verdict, suggested) = self.assess_goal(&goal).await;

        let prompt_text = messages::checkin_prompt(&goal, &suggested, verdict);
        let prompt = self
            .messenger
            .send_ephemeral(channel_id, user_id, &prompt_text)
            .await?;

        let superseded = self.pending.insert(
            (user_id, channel_id, date),
            PendingConfirmation {
                kind: SubmissionKind::CheckIn,
                date,
                original_text: goal,
                suggested_text: Some(suggested),
                smart_verdict: Some(verdict),
                prompt,
            },
        );

        // A fresh draft replaces an unresolved prompt
        if let Some(old) = superseded {
            let _ = self.messenger.retract_ephemeral(&old.prompt).await;
        }

        Ok(())
    }

    /// Process a check-out draft; requires a confirmed check-in for the
    /// same local date.
    async fn start_checkout(
        &mut self,
        user_id: Uuid,
        channel_id: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        let member = self.load_member(user_id, channel_id).await?;

        let update = text.trim().to_string();
        if update.is_empty() {
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::EMPTY_CHECKOUT)
                .await?;
            return Err(WorkflowError::Validation("empty check-out update".to_string()));
        }

        let date = member.local_date(now);
        let submissions = SubmissionStore::new(self.conn);

        // Precondition: nothing to close out without a check-in
        if !submissions.exists(user_id, channel_id, date, SubmissionKind::CheckIn)? {
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::CHECKIN_REQUIRED)
                .await?;
            return Ok(());
        }

        if submissions.exists(user_id, channel_id, date, SubmissionKind::CheckOut)? {
            tracing::debug!("Duplicate check-out attempt by {} on {}", user_id, date);
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::ALREADY_CHECKED_OUT)
                .await?;
            return Ok(());
        }

        let prompt_text = messages::checkout_prompt(&update);
        let prompt = self
            .messenger
            .send_ephemeral(channel_id, user_id, &prompt_text)
            .await?;

        let superseded = self.pending.insert(
            (user_id, channel_id, date),
            PendingConfirmation {
                kind: SubmissionKind::CheckOut,
                date,
                original_text: update,
                suggested_text: None,
                smart_verdict: None,
                prompt,
            },
        );

        if let Some(old) = superseded {
            let _ = self.messenger.retract_ephemeral(&old.prompt).await;
        }

        Ok(())
    }

    /// Run both SMART assist calls under the configured bound.
    ///
    /// Degradation never blocks the workflow: a failed or timed-out
    /// classification falls back to `false`, a failed rewrite falls
    /// back to the original text.
    async fn assess_goal(&self, goal: &str) -> (bool, String) {
        let classify = tokio::time::timeout(self.smart_timeout, self.smart.classify_smart(goal));
        let rewrite = tokio::time::timeout(self.smart_timeout, self.smart.rewrite_smart(goal));
        let (classify, rewrite) = futures::future::join(classify, rewrite).await;

        let verdict = match classify {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                tracing::warn!("SMART classification degraded: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("SMART classification timed out");
                false
            }
        };

        let suggested = match rewrite {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!("SMART rewrite degraded: {}", e);
                goal.to_string()
            }
            Err(_) => {
                tracing::warn!("SMART rewrite timed out");
                goal.to_string()
            }
        };

        (verdict, suggested)
    }

    /// Resolve a confirmation-prompt action.
    async fn resolve_action(
        &mut self,
        action: ActionId,
        user_id: Uuid,
        channel_id: Uuid,
        form: FormState,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        let member = self.load_member(user_id, channel_id).await?;
        let date = member.local_date(now);
        let key = (user_id, channel_id, date);

        match action {
            ActionId::Cancel => {
                let Some(pending) = self.pending.remove(&key) else {
                    self.messenger
                        .send_ephemeral(channel_id, user_id, messages::NOTHING_PENDING)
                        .await?;
                    return Ok(());
                };

                tracing::info!(
                    "{} {} by {} on {}",
                    pending.kind,
                    WorkflowState::Cancelled,
                    user_id,
                    date
                );
                self.messenger.retract_ephemeral(&pending.prompt).await?;
                Ok(())
            }
            ActionId::AcceptOriginal => self.confirm(&member, key, false, form).await,
            ActionId::AcceptSuggested => self.confirm(&member, key, true, form).await,
        }
    }

    /// Persist an accepted draft: submission row, ledger flip,
    /// broadcast, prompt retraction, in that order.
    async fn confirm(
        &mut self,
        member: &Member,
        key: PendingKey,
        use_suggested: bool,
        form: FormState,
    ) -> Result<(), WorkflowError> {
        let (user_id, channel_id, date) = key;

        let Some(pending) = self.pending.get(&key).cloned() else {
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::NOTHING_PENDING)
                .await?;
            return Ok(());
        };

        let mood = match pending.kind {
            SubmissionKind::CheckIn => form.mood.as_deref().and_then(Mood::parse_checkin),
            SubmissionKind::CheckOut => form.mood.as_deref().and_then(Mood::parse_checkout),
        };
        let Some(mood) = mood else {
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::MOOD_REQUIRED)
                .await?;
            return Err(WorkflowError::Validation(
                "missing or unknown mood".to_string(),
            ));
        };

        let blocker = form
            .blocker
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from);
        let blocked = blocker.is_some();

        // Close the duplicate race immediately before the persisting write
        let submissions = SubmissionStore::new(self.conn);
        let already_submitted = match submissions.exists(user_id, channel_id, date, pending.kind) {
            Ok(exists) => exists,
            Err(e) => {
                // The store is unwell; keep the prompt standing for a retry
                tracing::error!("Failed to check for an existing {}: {}", pending.kind, e);
                self.messenger
                    .send_ephemeral(channel_id, user_id, messages::TRANSIENT_ERROR)
                    .await?;
                return Ok(());
            }
        };
        if already_submitted {
            tracing::debug!("Duplicate {} resolved by race check", pending.kind);
            let notice = match pending.kind {
                SubmissionKind::CheckIn => messages::ALREADY_CHECKED_IN,
                SubmissionKind::CheckOut => messages::ALREADY_CHECKED_OUT,
            };
            self.messenger
                .send_ephemeral(channel_id, user_id, notice)
                .await?;
            if let Some(p) = self.pending.remove(&key) {
                self.messenger.retract_ephemeral(&p.prompt).await?;
            }
            return Ok(());
        }

        let goals_met = form.goals_met.unwrap_or(false);
        let goal_text = if use_suggested {
            pending
                .suggested_text
                .clone()
                .unwrap_or_else(|| pending.original_text.clone())
        } else {
            pending.original_text.clone()
        };

        let submission = match pending.kind {
            SubmissionKind::CheckIn => Submission::check_in(
                user_id,
                channel_id,
                date,
                goal_text.clone(),
                blocker.clone(),
                mood,
                pending.smart_verdict.unwrap_or(false),
            ),
            SubmissionKind::CheckOut => Submission::check_out(
                user_id,
                channel_id,
                date,
                pending.original_text.clone(),
                blocker.clone(),
                mood,
                goals_met,
            ),
        };

        // A store failure leaves the prompt pending and retryable
        if let Err(e) = submissions.insert(&submission) {
            tracing::error!("Failed to persist {}: {}", pending.kind, e);
            self.messenger
                .send_ephemeral(channel_id, user_id, messages::TRANSIENT_ERROR)
                .await?;
            return Ok(());
        }

        let ledger = LedgerStore::new(self.conn);
        let ledger_result = match pending.kind {
            SubmissionKind::CheckIn => {
                // An accepted suggestion is a SMART phrasing by construction
                let score = if use_suggested || pending.smart_verdict.unwrap_or(false) {
                    1.0
                } else {
                    0.0
                };
                ledger.record_checkin(user_id, channel_id, date, blocked, score)
            }
            SubmissionKind::CheckOut => ledger.record_checkout(user_id, channel_id, date, blocked),
        };

        match ledger_result {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    "No attendance row for {} on channel {} at {}",
                    user_id,
                    channel_id,
                    date
                );
            }
            Err(e) => {
                tracing::error!("Failed to update attendance row: {}", e);
                self.messenger
                    .send_ephemeral(channel_id, user_id, messages::TRANSIENT_ERROR)
                    .await?;
                return Ok(());
            }
        }

        let broadcast = match pending.kind {
            SubmissionKind::CheckIn => messages::checkin_broadcast(
                &member.display_name,
                &goal_text,
                mood,
                blocker.as_deref(),
            ),
            SubmissionKind::CheckOut => messages::checkout_broadcast(
                &member.display_name,
                &pending.original_text,
                mood,
                goals_met,
                blocker.as_deref(),
            ),
        };
        self.messenger.send_broadcast(channel_id, &broadcast).await?;

        tracing::info!(
            "{} {} by {} on {}",
            pending.kind,
            WorkflowState::Confirmed,
            user_id,
            date
        );

        // Retract the ephemeral prompt as the final step
        if let Some(p) = self.pending.remove(&key) {
            self.messenger.retract_ephemeral(&p.prompt).await?;
        }

        Ok(())
    }

    /// Look up the member behind an event, rejecting unknown ids with a
    /// user-visible notice.
    async fn load_member(
        &self,
        user_id: Uuid,
        channel_id: Uuid,
    ) -> Result<Member, WorkflowError> {
        let member = MemberStore::new(self.conn).get_member(user_id)?;
        match member {
            Some(member) => Ok(member),
            None => {
                self.messenger
                    .send_ephemeral(channel_id, user_id, messages::UNKNOWN_MEMBER)
                    .await?;
                Err(WorkflowError::Validation(format!(
                    "unknown member {}",
                    user_id
                )))
            }
        }
    }
}

/// Workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Member error: {0}")]
    Member(#[from] MemberError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
}
