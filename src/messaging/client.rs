//! Messaging platform HTTP client.
//!
//! T029: Implement Messenger port and HTTP client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::types::{InteractionEvent, MessageHandle, ResponseHandle};

/// Default per-request timeout for platform calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound port onto the messaging platform, as consumed by the
/// workflow engine.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Acknowledge an interaction. Must be the first call made for any
    /// event; a late acknowledgment makes the platform retry the event.
    async fn ack(&self, response: &ResponseHandle) -> Result<(), MessagingError>;

    /// Send a requester-only ephemeral message into a channel.
    async fn send_ephemeral(
        &self,
        channel_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> Result<MessageHandle, MessagingError>;

    /// Send a broadcast message visible to the whole channel.
    async fn send_broadcast(&self, channel_id: Uuid, text: &str) -> Result<(), MessagingError>;

    /// Retract a previously sent ephemeral message.
    async fn retract_ephemeral(&self, handle: &MessageHandle) -> Result<(), MessagingError>;
}

/// HTTP client for the messaging platform API.
pub struct HttpMessenger {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL for the platform API
    base_url: String,
    /// Bot token for authentication
    bot_token: String,
}

impl HttpMessenger {
    /// Create a new messenger client.
    pub fn new(base_url: String, bot_token: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            bot_token,
        }
    }

    /// Send a request, returning the parsed envelope.
    async fn post<R: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<PlatformEnvelope<R>, MessagingError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.bot_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    MessagingError::Timeout
                } else {
                    MessagingError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MessagingError::ApiError(format!(
                "Platform returned status {}",
                status
            )));
        }

        let envelope: PlatformEnvelope<R> = response
            .json()
            .await
            .map_err(|e| MessagingError::SerializationError(e.to_string()))?;

        if !envelope.ok {
            return Err(MessagingError::ApiError(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(envelope)
    }

    /// Fetch pending interaction events from the platform.
    ///
    /// Payloads that fail to decode are dropped with a warning rather
    /// than wedging the event loop.
    pub async fn poll_events(&self) -> Result<Vec<InteractionEvent>, MessagingError> {
        let url = format!("{}/events", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.bot_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    MessagingError::Timeout
                } else {
                    MessagingError::ApiError(e.to_string())
                }
            })?;

        let envelope: PlatformEnvelope<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| MessagingError::SerializationError(e.to_string()))?;

        let payloads = envelope.data.unwrap_or_default();
        let mut events = Vec::new();
        for payload in &payloads {
            match InteractionEvent::decode(payload) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!("Dropping undecodable interaction payload: {}", e),
            }
        }

        Ok(events)
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn ack(&self, response: &ResponseHandle) -> Result<(), MessagingError> {
        self.post::<serde_json::Value>(
            "/interactions/ack",
            serde_json::json!({ "response": response }),
        )
        .await?;
        Ok(())
    }

    async fn send_ephemeral(
        &self,
        channel_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> Result<MessageHandle, MessagingError> {
        let envelope: PlatformEnvelope<SentMessage> = self
            .post(
                "/messages/ephemeral",
                serde_json::json!({
                    "channel_id": channel_id,
                    "user_id": user_id,
                    "text": text,
                }),
            )
            .await?;

        let sent = envelope.data.ok_or_else(|| {
            MessagingError::ApiError("Platform returned ok but no message handle".to_string())
        })?;
        Ok(MessageHandle(sent.handle))
    }

    async fn send_broadcast(&self, channel_id: Uuid, text: &str) -> Result<(), MessagingError> {
        self.post::<serde_json::Value>(
            "/messages/broadcast",
            serde_json::json!({
                "channel_id": channel_id,
                "text": text,
            }),
        )
        .await?;
        Ok(())
    }

    async fn retract_ephemeral(&self, handle: &MessageHandle) -> Result<(), MessagingError> {
        self.post::<serde_json::Value>(
            "/messages/retract",
            serde_json::json!({ "handle": handle }),
        )
        .await?;
        Ok(())
    }
}

/// Platform response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct PlatformEnvelope<T> {
    ok: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Sent-message response body.
#[derive(Debug, Deserialize)]
struct SentMessage {
    handle: String,
}

/// Messaging platform errors.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Request timed out")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
