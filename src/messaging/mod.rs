//! Messaging platform module.
//!
//! The platform is an opaque duplex channel: typed interaction events
//! in, acknowledgments and ephemeral/broadcast messages out.

pub mod client;
pub mod types;

pub use client::{HttpMessenger, Messenger, MessagingError};
pub use types::{
    ActionId, EventDecodeError, FormState, InteractionEvent, MessageHandle, ResponseHandle,
    SlashCommand,
};
