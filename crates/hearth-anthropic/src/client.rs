// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, streaming SSE responses, and transient error retry.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use hearth_core::HearthError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::sse::{self, StreamEvent};
use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Base URL for the Anthropic Messages API.
const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// HTTP client for Anthropic API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503, 529).
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    max_retries: u32,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key for authentication
    /// * `api_version` - API version string (e.g., "2023-06-01")
    pub fn new(api_key: &str, api_version: &str) -> Result<Self, HearthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                HearthError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                HearthError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| HearthError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a streaming request and returns a stream of SSE events.
    ///
    /// On transient errors (429, 500, 503, 529), retries once after a
    /// 1-second delay.
    pub async fn stream_message(
        &self,
        request: &MessageRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, HearthError>> + Send>>, HearthError>
    {
        let mut req = request.clone();
        req.stream = true;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying streaming request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&req)
                .send()
                .await
                .map_err(|e| HearthError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "streaming response received");

            if status.is_success() {
                return Ok(sse::parse_sse_stream(response));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(HearthError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Err(last_error.unwrap_or_else(|| HearthError::Provider {
            message: "streaming request failed after retries".into(),
            source: None,
        }))
    }

    /// Sends a non-streaming request and returns the full response.
    ///
    /// On transient errors (429, 500, 503, 529), retries once after a
    /// 1-second delay.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, HearthError> {
        let mut req = request.clone();
        req.stream = false;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&req)
                .send()
                .await
                .map_err(|e| HearthError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| HearthError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let msg_response: MessageResponse =
                    serde_json::from_str(&body).map_err(|e| HearthError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(msg_response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(HearthError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Err(last_error.unwrap_or_else(|| HearthError::Provider {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

/// Shapes a non-success HTTP response into a provider error, preferring the
/// structured API error body when present.
fn api_error(status: reqwest::StatusCode, body: String) -> HearthError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        format!(
            "Anthropic API error ({}): {}",
            api_err.error.type_, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };
    HearthError::Provider {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
