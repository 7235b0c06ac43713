//! SMART goal assist module.
//!
//! Thin client over the external text-quality service. Rate-limited
//! and fallible; the workflow engine supplies fallback behavior.

pub mod client;
pub mod types;

pub use client::{SmartAssist, SmartClient};
pub use types::SmartError;
