//! Integration tests for a full daily cycle: roster generation,
//! check-in/check-out workflow, and the metrics report built from the
//! resulting rows.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use rollcall::ledger::LedgerStore;
use rollcall::members::{Member, MemberStore, Role, Team};
use rollcall::messaging::{
    ActionId, FormState, InteractionEvent, MessageHandle, Messenger, MessagingError,
    ResponseHandle, SlashCommand,
};
use rollcall::reporting::MetricsQuery;
use rollcall::smart::{SmartAssist, SmartError};
use rollcall::storage::Database;
use rollcall::workflow::{SubmissionKind, SubmissionStore};
use rollcall::{MetricsAggregator, RosterGenerator, WorkflowEngine};

/// Recording in-memory messenger.
#[derive(Default)]
struct RecordingMessenger {
    ephemerals: Mutex<Vec<String>>,
    broadcasts: Mutex<Vec<String>>,
    retracted: Mutex<Vec<String>>,
    counter: Mutex<u32>,
}

impl RecordingMessenger {
    fn ephemerals(&self) -> Vec<String> {
        self.ephemerals.lock().unwrap().clone()
    }

    fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn retracted(&self) -> Vec<String> {
        self.retracted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn ack(&self, _response: &ResponseHandle) -> Result<(), MessagingError> {
        Ok(())
    }

    async fn send_ephemeral(
        &self,
        _channel_id: Uuid,
        _user_id: Uuid,
        text: &str,
    ) -> Result<MessageHandle, MessagingError> {
        self.ephemerals.lock().unwrap().push(text.to_string());
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        Ok(MessageHandle(format!("mh-{}", counter)))
    }

    async fn send_broadcast(&self, _channel_id: Uuid, text: &str) -> Result<(), MessagingError> {
        self.broadcasts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn retract_ephemeral(&self, handle: &MessageHandle) -> Result<(), MessagingError> {
        self.retracted.lock().unwrap().push(handle.0.clone());
        Ok(())
    }
}

/// SMART stub with a fixed verdict and rewrite.
struct StubSmart {
    verdict: bool,
    rewrite: String,
}

#[async_trait]
impl SmartAssist for StubSmart {
    async fn classify_smart(&self, _text: &str) -> Result<bool, SmartError> {
        Ok(self.verdict)
    }

    async fn rewrite_smart(&self, _text: &str) -> Result<String, SmartError> {
        Ok(self.rewrite.clone())
    }
}

const SMART_TIMEOUT: Duration = Duration::from_millis(50);

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
}

fn seed_team_of_two(db: &Database) -> (Member, Member, Team) {
    let store = MemberStore::new(db.connection());
    let team = Team::new("core".to_string());
    store.insert_team(&team).unwrap();

    let ada = Member::new("Ada".to_string());
    let bea = Member::new("Bea".to_string());
    for member in [&ada, &bea] {
        store.insert_member(member).unwrap();
        store.add_membership(member.id, team.id).unwrap();
    }

    (ada, bea, team)
}

fn command(
    command: SlashCommand,
    member: &Member,
    team: &Team,
    text: &str,
) -> InteractionEvent {
    InteractionEvent::CommandInvoked {
        command,
        user_id: member.id,
        channel_id: team.id,
        text: text.to_string(),
        response: ResponseHandle("rh".to_string()),
    }
}

fn accept(member: &Member, team: &Team, form: FormState) -> InteractionEvent {
    InteractionEvent::ActionTriggered {
        action: ActionId::AcceptOriginal,
        user_id: member.id,
        channel_id: team.id,
        form,
        response: ResponseHandle("rh".to_string()),
    }
}

#[tokio::test]
async fn test_full_day_feeds_the_report() {
    let db = Database::open_in_memory().unwrap();
    let (ada, bea, team) = seed_team_of_two(&db);
    let today = date(2025, 2, 1);

    // Morning: the scheduler materializes today and tomorrow
    let generator = RosterGenerator::new(db.connection(), 2);
    assert_eq!(generator.run_for(today).unwrap(), 4);

    // Ada checks in with a blocker; Bea never does
    let messenger = RecordingMessenger::default();
    let smart = StubSmart {
        verdict: true,
        rewrite: "Ship the importer by 5pm".to_string(),
    };
    let mut engine = WorkflowEngine::new(db.connection(), &messenger, &smart, SMART_TIMEOUT);

    engine
        .handle_event_at(
            command(SlashCommand::CheckIn, &ada, &team, "ship the importer"),
            noon(today),
        )
        .await
        .unwrap();
    engine
        .handle_event_at(
            accept(
                &ada,
                &team,
                FormState {
                    blocker: Some("waiting on review".to_string()),
                    mood: Some("stressed".to_string()),
                    goals_met: None,
                },
            ),
            noon(today),
        )
        .await
        .unwrap();

    // Evening: Ada closes the day out
    engine
        .handle_event_at(
            command(SlashCommand::CheckOut, &ada, &team, "importer shipped"),
            noon(today),
        )
        .await
        .unwrap();
    engine
        .handle_event_at(
            accept(
                &ada,
                &team,
                FormState {
                    blocker: None,
                    mood: Some("happy".to_string()),
                    goals_met: Some(true),
                },
            ),
            noon(today),
        )
        .await
        .unwrap();

    assert_eq!(messenger.broadcasts().len(), 2);

    // An admin pulls the report for the day
    let members = MemberStore::new(db.connection());
    let mut admin = Member::new("Root".to_string());
    admin.role = Role::Admin;
    members.insert_member(&admin).unwrap();

    let aggregator = MetricsAggregator::new(db.connection());
    let report = aggregator
        .query_at(
            &MetricsQuery {
                start: today,
                end: today,
                team_id: Some(team.id),
                user_ids: None,
                requesting_user_id: admin.id,
            },
            today,
        )
        .unwrap();

    // Two rows today, one checked in and blocked
    assert_eq!(report.participation.len(), 1);
    assert_eq!(report.participation[0].percentage, 50);
    assert_eq!(report.blocked[0].percentage, 50);

    assert_eq!(report.smart_scores.len(), 1);
    assert_eq!(report.smart_scores[0].user_id, ada.id);
    assert_eq!(report.smart_scores[0].score, 1.0);

    // Bea's row is untouched
    let row = LedgerStore::new(db.connection())
        .get(bea.id, team.id, today)
        .unwrap()
        .unwrap();
    assert!(!row.has_checked_in);
}

#[tokio::test]
async fn test_store_failure_keeps_confirmation_retryable() {
    let db = Database::open_in_memory().unwrap();
    let (ada, _, team) = seed_team_of_two(&db);
    let today = date(2025, 2, 1);

    let generator = RosterGenerator::new(db.connection(), 1);
    generator.run_for(today).unwrap();

    let messenger = RecordingMessenger::default();
    let smart = StubSmart {
        verdict: false,
        rewrite: "rewrite".to_string(),
    };
    let mut engine = WorkflowEngine::new(db.connection(), &messenger, &smart, SMART_TIMEOUT);

    engine
        .handle_event_at(
            command(SlashCommand::CheckIn, &ada, &team, "a goal"),
            noon(today),
        )
        .await
        .unwrap();

    // Break the submissions table out from under the engine
    db.connection()
        .execute_batch("ALTER TABLE submissions RENAME TO submissions_gone")
        .unwrap();

    let form = FormState {
        blocker: None,
        mood: Some("neutral".to_string()),
        goals_met: None,
    };
    engine
        .handle_event_at(accept(&ada, &team, form.clone()), noon(today))
        .await
        .unwrap();

    // The member saw a transient error, no broadcast went out, and the
    // prompt is still standing
    assert!(messenger
        .ephemerals()
        .iter()
        .any(|m| m.contains("try again")));
    assert!(messenger.broadcasts().is_empty());
    assert!(messenger.retracted().is_empty());

    // Restore the table; the same action now succeeds
    db.connection()
        .execute_batch("ALTER TABLE submissions_gone RENAME TO submissions")
        .unwrap();

    engine
        .handle_event_at(accept(&ada, &team, form), noon(today))
        .await
        .unwrap();

    assert_eq!(
        SubmissionStore::new(db.connection()).count().unwrap(),
        1
    );
    assert_eq!(messenger.broadcasts().len(), 1);
    assert_eq!(messenger.retracted().len(), 1);
}

#[tokio::test]
async fn test_two_members_do_not_interfere() {
    let db = Database::open_in_memory().unwrap();
    let (ada, bea, team) = seed_team_of_two(&db);
    let today = date(2025, 2, 1);

    let generator = RosterGenerator::new(db.connection(), 1);
    generator.run_for(today).unwrap();

    let messenger = RecordingMessenger::default();
    let smart = StubSmart {
        verdict: true,
        rewrite: "rewrite".to_string(),
    };
    let mut engine = WorkflowEngine::new(db.connection(), &messenger, &smart, SMART_TIMEOUT);

    // Both draft; only Ada confirms
    engine
        .handle_event_at(
            command(SlashCommand::CheckIn, &ada, &team, "ada's goal"),
            noon(today),
        )
        .await
        .unwrap();
    engine
        .handle_event_at(
            command(SlashCommand::CheckIn, &bea, &team, "bea's goal"),
            noon(today),
        )
        .await
        .unwrap();
    engine
        .handle_event_at(
            accept(
                &ada,
                &team,
                FormState {
                    blocker: None,
                    mood: Some("energized".to_string()),
                    goals_met: None,
                },
            ),
            noon(today),
        )
        .await
        .unwrap();

    let submissions = SubmissionStore::new(db.connection());
    assert!(submissions
        .exists(ada.id, team.id, today, SubmissionKind::CheckIn)
        .unwrap());
    assert!(!submissions
        .exists(bea.id, team.id, today, SubmissionKind::CheckIn)
        .unwrap());

    // Bea's prompt is still pending; her row is untouched
    let row = LedgerStore::new(db.connection())
        .get(bea.id, team.id, today)
        .unwrap()
        .unwrap();
    assert!(!row.has_checked_in);
}
