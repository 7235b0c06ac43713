//! Check-in/check-out workflow module.
//!
//! Drives the daily conversational flow: draft, SMART assessment,
//! confirmation prompt, and exactly one terminal action per day.

pub mod engine;
pub mod messages;
pub mod store;
pub mod types;

pub use engine::{WorkflowEngine, WorkflowError};
pub use store::{SubmissionError, SubmissionStore};
pub use types::{
    Mood, PendingConfirmation, PendingKey, Submission, SubmissionKind, WorkflowState,
};
