//! Messaging platform types.
//!
//! T028: Decode interaction payloads into a tagged event union
//!
//! The platform delivers loosely-structured interaction payloads; they
//! are decoded exactly once, here, into `InteractionEvent`. Everything
//! downstream dispatches on the variant tag.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque token identifying an interaction awaiting acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseHandle(pub String);

/// Opaque token identifying a sent message, used for retraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(pub String);

/// Slash command recognized by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlashCommand {
    /// Start a daily check-in draft
    CheckIn,
    /// Start a daily check-out draft
    CheckOut,
}

/// Identifier of a confirmation-prompt action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    /// Keep the goal text as typed
    AcceptOriginal,
    /// Use the AI-suggested rewrite
    AcceptSuggested,
    /// Abandon the draft
    Cancel,
}

/// Form values attached to a confirmation-prompt action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Optional blocker text
    #[serde(default)]
    pub blocker: Option<String>,
    /// Selected mood, still unvalidated platform text
    #[serde(default)]
    pub mood: Option<String>,
    /// Goals-met toggle (check-out only)
    #[serde(default)]
    pub goals_met: Option<bool>,
}

/// A typed interaction event from the messaging platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// A member invoked a slash command.
    CommandInvoked {
        command: SlashCommand,
        user_id: Uuid,
        channel_id: Uuid,
        text: String,
        response: ResponseHandle,
    },
    /// A member pressed an action button on a prompt.
    ActionTriggered {
        action: ActionId,
        user_id: Uuid,
        channel_id: Uuid,
        form: FormState,
        response: ResponseHandle,
    },
}

impl InteractionEvent {
    /// Decode a raw platform payload into a typed event.
    pub fn decode(payload: &serde_json::Value) -> Result<Self, EventDecodeError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| EventDecodeError::Malformed(e.to_string()))
    }

    /// The response handle carried by the event.
    pub fn response(&self) -> &ResponseHandle {
        match self {
            InteractionEvent::CommandInvoked { response, .. } => response,
            InteractionEvent::ActionTriggered { response, .. } => response,
        }
    }
}

/// Event decode errors.
#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("Malformed interaction payload: {0}")]
    Malformed(String),
}
