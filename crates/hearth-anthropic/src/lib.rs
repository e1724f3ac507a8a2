// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic text/vision generation adapter for Hearth.
//!
//! Implements the [`TextGeneration`] capability over the Anthropic Messages
//! API with SSE streaming and transient-error retry. Vision inputs (base64
//! image blocks) pass straight through to the API.

pub mod client;
pub mod sse;
pub mod types;

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::StreamExt;
use futures::Stream;
use hearth_core::types::{
    GenerationEvent, GenerationRequest, GenerationResponse, PromptBlock, PromptMessage,
};
use hearth_core::{AdapterKind, CapabilityAdapter, HealthStatus, HearthError, TextGeneration};

pub use client::AnthropicClient;

use types::{ApiContent, ApiContentBlock, ApiMessage, ImageSource, MessageRequest};

/// Text/vision generation capability backed by the Anthropic Messages API.
///
/// Each instance is pinned to one model; construct separate instances for
/// the reply generator and the cheaper intent-classifier tier.
pub struct AnthropicGeneration {
    client: AnthropicClient,
    model: String,
}

impl AnthropicGeneration {
    /// Creates a new adapter for the given model.
    pub fn new(api_key: &str, api_version: &str, model: String) -> Result<Self, HearthError> {
        Ok(Self {
            client: AnthropicClient::new(api_key, api_version)?,
            model,
        })
    }

    /// Overrides the API base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    fn to_api_request(&self, request: &GenerationRequest, stream: bool) -> MessageRequest {
        MessageRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(to_api_message).collect(),
            system: request.system.clone(),
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

fn to_api_message(message: &PromptMessage) -> ApiMessage {
    // Text-only messages serialize as a plain string; anything with an image
    // becomes a block array.
    let all_text = message
        .content
        .iter()
        .all(|b| matches!(b, PromptBlock::Text { .. }));

    let content = if all_text {
        let text: String = message
            .content
            .iter()
            .map(|b| match b {
                PromptBlock::Text { text } => text.as_str(),
                PromptBlock::Image { .. } => unreachable!(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        ApiContent::Text(text)
    } else {
        ApiContent::Blocks(
            message
                .content
                .iter()
                .map(|b| match b {
                    PromptBlock::Text { text } => ApiContentBlock::Text { text: text.clone() },
                    PromptBlock::Image { media_type, data } => ApiContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: media_type.clone(),
                            data: data.clone(),
                        },
                    },
                })
                .collect(),
        )
    };

    ApiMessage {
        role: message.role.clone(),
        content,
    }
}

#[async_trait]
impl CapabilityAdapter for AnthropicGeneration {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
        // No cheap unauthenticated probe exists; a constructed client with
        // valid headers is considered healthy.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HearthError> {
        Ok(())
    }
}

#[async_trait]
impl TextGeneration for AnthropicGeneration {
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, HearthError> {
        let api_request = self.to_api_request(&request, false);
        let response = self.client.complete_message(&api_request).await?;
        Ok(GenerationResponse {
            text: response.text(),
            stop_reason: response.stop_reason,
        })
    }

    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<GenerationEvent, HearthError>> + Send>>,
        HearthError,
    > {
        let api_request = self.to_api_request(&request, true);
        let sse_stream = self.client.stream_message(&api_request).await?;

        let mapped = sse_stream.filter_map(|result| async move {
            match result {
                Ok(sse::StreamEvent::ContentBlockDelta(delta)) => {
                    let types::SseDelta::TextDelta { text } = delta.delta;
                    Some(Ok(GenerationEvent::Delta { text }))
                }
                Ok(sse::StreamEvent::MessageDelta(md)) => Some(Ok(GenerationEvent::Completed {
                    stop_reason: md.delta.stop_reason,
                })),
                Ok(sse::StreamEvent::MessageStop) => {
                    Some(Ok(GenerationEvent::Completed { stop_reason: None }))
                }
                Ok(sse::StreamEvent::Error(err)) => Some(Err(HearthError::Provider {
                    message: format!(
                        "stream error ({}): {}",
                        err.error.type_, err.error.message
                    ),
                    source: None,
                })),
                Ok(sse::StreamEvent::MessageStart(_)) | Ok(sse::StreamEvent::Ping) => None,
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(mapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: &str) -> AnthropicGeneration {
        AnthropicGeneration::new("test-key", "2023-06-01", "claude-sonnet-4-20250514".into())
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn request_with_text(text: &str) -> GenerationRequest {
        GenerationRequest {
            system: Some("You are a home-improvement assistant.".into()),
            messages: vec![PromptMessage::text("user", text)],
            max_tokens: 1024,
        }
    }

    #[test]
    fn text_only_message_collapses_to_string_content() {
        let msg = PromptMessage::text("user", "hello");
        let api = to_api_message(&msg);
        assert!(matches!(api.content, ApiContent::Text(ref t) if t == "hello"));
    }

    #[test]
    fn image_message_becomes_blocks() {
        let msg = PromptMessage {
            role: "user".into(),
            content: vec![
                PromptBlock::Text {
                    text: "what room is this?".into(),
                },
                PromptBlock::Image {
                    media_type: "image/png".into(),
                    data: "aWkK".into(),
                },
            ],
        };
        let api = to_api_message(&msg);
        match api.content {
            ApiContent::Blocks(blocks) => assert_eq!(blocks.len(), 2),
            _ => panic!("expected Blocks"),
        }
    }

    #[tokio::test]
    async fn complete_maps_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "Use satin finish."}],
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 9, "output_tokens": 4}
            })))
            .mount(&server)
            .await;

        let result = adapter(&server.uri())
            .complete(request_with_text("which paint finish?"))
            .await
            .unwrap();
        assert_eq!(result.text, "Use satin finish.");
        assert_eq!(result.stop_reason.as_deref(), Some("end_turn"));
    }

    #[tokio::test]
    async fn stream_yields_deltas_then_completed() {
        let server = MockServer::start().await;
        let sse_body = concat!(
            "event: message_start\ndata: {\"message\":{\"id\":\"msg_s\",\"model\":\"claude-sonnet-4-20250514\"}}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Soft \"}}\n\n",
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"gray.\"}}\n\n",
            "event: message_delta\ndata: {\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"input_tokens\":5,\"output_tokens\":2}}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&server)
            .await;

        let mut stream = adapter(&server.uri())
            .stream(request_with_text("pick a color"))
            .await
            .unwrap();

        let mut text = String::new();
        let mut stop_reason = None;
        while let Some(event) = stream.next().await {
            match event.unwrap() {
                GenerationEvent::Delta { text: t } => text.push_str(&t),
                GenerationEvent::Completed { stop_reason: sr } => {
                    stop_reason = sr;
                    break;
                }
            }
        }
        assert_eq!(text, "Soft gray.");
        assert_eq!(stop_reason.as_deref(), Some("end_turn"));
    }
}
