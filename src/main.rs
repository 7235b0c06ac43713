//! Rollcall - Daily Team Check-in Service
//!
//! Main entry point for the daemon: runs the periodic roster generator
//! and feeds messaging-platform interaction events to the workflow
//! engine.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rollcall::messaging::HttpMessenger;
use rollcall::smart::SmartClient;
use rollcall::storage::config;
use rollcall::{Database, RosterGenerator, WorkflowEngine};

/// Seconds between event polls.
const EVENT_POLL_SECS: u64 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rollcall v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config()?;
    let db = Database::open(&config.database_path())?;

    let messenger = HttpMessenger::new(
        config.messaging.base_url.clone(),
        config.messaging.bot_token.clone(),
    );
    let smart = SmartClient::new(
        config.smart.base_url.clone(),
        config.smart.api_key.clone(),
        config.smart.timeout(),
    );

    let generator = RosterGenerator::new(db.connection(), config.roster.forward_window_days);
    let mut engine = WorkflowEngine::new(
        db.connection(),
        &messenger,
        &smart,
        config.smart.timeout(),
    );

    let mut roster_tick =
        tokio::time::interval(Duration::from_secs(config.roster.interval_minutes * 60));
    let mut event_tick = tokio::time::interval(Duration::from_secs(EVENT_POLL_SECS));

    loop {
        tokio::select! {
            _ = roster_tick.tick() => {
                match generator.run() {
                    Ok(inserted) => {
                        tracing::info!("Roster tick complete, {} rows inserted", inserted);
                    }
                    Err(e) => tracing::error!("Roster generation failed: {}", e),
                }
            }
            _ = event_tick.tick() => {
                match messenger.poll_events().await {
                    Ok(events) => {
                        for event in events {
                            if let Err(e) = engine.handle_event(event).await {
                                tracing::warn!("Interaction handling failed: {}", e);
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Event poll failed: {}", e),
                }
            }
        }
    }
}
