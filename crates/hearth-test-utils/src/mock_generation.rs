// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generation capability for deterministic testing.
//!
//! Responses are popped from a FIFO queue; an empty queue yields a default
//! reply. Individual entries can be scripted as failures to exercise the
//! retry and degraded paths.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use hearth_core::types::{
    AdapterKind, GenerationEvent, GenerationRequest, GenerationResponse, HealthStatus,
};
use hearth_core::{CapabilityAdapter, HearthError, TextGeneration};

/// One scripted generation outcome.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Succeed with this text.
    Text(String),
    /// Fail the whole call.
    Fail,
}

/// A mock generation capability that returns pre-configured replies.
pub struct MockGeneration {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
}

impl MockGeneration {
    /// Create a mock with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock pre-loaded with successful replies.
    pub fn with_replies<I: IntoIterator<Item = String>>(replies: I) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies.into_iter().map(ScriptedReply::Text).collect(),
            )),
        }
    }

    /// Append a scripted outcome to the queue.
    pub async fn push(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    async fn next_reply(&self) -> ScriptedReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Text("mock reply".to_string()))
    }
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityAdapter for MockGeneration {
    fn name(&self) -> &str {
        "mock-generation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HearthError> {
        Ok(())
    }
}

#[async_trait]
impl TextGeneration for MockGeneration {
    async fn complete(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerationResponse, HearthError> {
        match self.next_reply().await {
            ScriptedReply::Text(text) => Ok(GenerationResponse {
                text,
                stop_reason: Some("end_turn".to_string()),
            }),
            ScriptedReply::Fail => Err(HearthError::Provider {
                message: "scripted failure".into(),
                source: None,
            }),
        }
    }

    async fn stream(
        &self,
        _request: GenerationRequest,
    ) -> Result<
        Pin<Box<dyn futures_core::Stream<Item = Result<GenerationEvent, HearthError>> + Send>>,
        HearthError,
    > {
        match self.next_reply().await {
            ScriptedReply::Text(text) => {
                // Split into a couple of deltas so chunk ordering is exercised.
                let mid = text
                    .char_indices()
                    .nth(text.chars().count() / 2)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let (a, b) = text.split_at(mid);
                let events = vec![
                    Ok(GenerationEvent::Delta { text: a.to_string() }),
                    Ok(GenerationEvent::Delta { text: b.to_string() }),
                    Ok(GenerationEvent::Completed {
                        stop_reason: Some("end_turn".to_string()),
                    }),
                ];
                Ok(Box::pin(stream::iter(events)))
            }
            ScriptedReply::Fail => Err(HearthError::Provider {
                message: "scripted failure".into(),
                source: None,
            }),
        }
    }
}
