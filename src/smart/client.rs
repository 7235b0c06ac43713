//! SMART assist API client.
//!
//! T025: Create SmartClient for classify/rewrite calls

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::types::{
    ClassifyRequest, ClassifyResponse, RewriteRequest, RewriteResponse, SmartError,
};

/// Capability interface over the external SMART text service.
///
/// Both operations are best-effort: callers own the fallback policy
/// (verdict `false`, original text) and must never block a workflow on
/// a failure here.
#[async_trait]
pub trait SmartAssist: Send + Sync {
    /// Classify whether the goal text meets the SMART criteria.
    async fn classify_smart(&self, text: &str) -> Result<bool, SmartError>;

    /// Rewrite the goal text into a SMART phrasing.
    async fn rewrite_smart(&self, text: &str) -> Result<String, SmartError>;
}

/// HTTP client for the SMART assist API.
pub struct SmartClient {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL for API
    base_url: String,
    /// API key for authentication
    api_key: String,
}

impl SmartClient {
    /// Create a new SMART client with a bounded per-request timeout.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Send a request to the SMART API.
    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R, SmartError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SmartError::Timeout
                } else {
                    SmartError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let api_response: ApiResponse<R> = response
                .json()
                .await
                .map_err(|e| SmartError::SerializationError(e.to_string()))?;

            if api_response.success {
                api_response.data.ok_or_else(|| {
                    SmartError::ApiError("API returned success but no data".to_string())
                })
            } else {
                let error = api_response.error.unwrap_or_default();
                Err(SmartError::ApiError(error.message))
            }
        } else if status.as_u16() == 429 {
            Err(SmartError::RateLimited)
        } else {
            Err(SmartError::ApiError(format!(
                "API returned status {}",
                status
            )))
        }
    }
}

#[async_trait]
impl SmartAssist for SmartClient {
    async fn classify_smart(&self, text: &str) -> Result<bool, SmartError> {
        let request = ClassifyRequest {
            text: text.to_string(),
        };
        let response: ClassifyResponse = self.post("/goals/classify", &request).await?;
        Ok(response.smart)
    }

    async fn rewrite_smart(&self, text: &str) -> Result<String, SmartError> {
        let request = RewriteRequest {
            text: text.to_string(),
        };
        let response: RewriteResponse = self.post("/goals/rewrite", &request).await?;
        Ok(response.text)
    }
}

/// API response wrapper.
#[derive(Debug, serde::Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<ApiError>,
}

/// API error details.
#[derive(Debug, Default, serde::Deserialize)]
#[allow(dead_code)]
struct ApiError {
    code: String,
    message: String,
}
