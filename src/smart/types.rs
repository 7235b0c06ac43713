//! SMART assist service types.
//!
//! T024: Define SMART request/response payloads and errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request payload for goal classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
    /// Raw goal text as typed by the member
    pub text: String,
}

/// Response payload for goal classification.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    /// Whether the goal meets the SMART criteria
    pub smart: bool,
}

/// Request payload for goal rewriting.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteRequest {
    /// Raw goal text as typed by the member
    pub text: String,
}

/// Response payload for goal rewriting.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteResponse {
    /// SMART-phrased rewrite of the goal
    pub text: String,
}

/// SMART assist service errors.
#[derive(Debug, Error)]
pub enum SmartError {
    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by SMART service")]
    RateLimited,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
