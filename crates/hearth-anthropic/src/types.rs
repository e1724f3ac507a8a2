// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request/response types and SSE event types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ApiMessage>,

    /// System prompt (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Whether to stream the response.
    pub stream: bool,
}

/// A single message in the Anthropic conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,

    /// Content -- either a plain string or an array of content blocks.
    pub content: ApiContent,
}

/// Content within an API message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiContent {
    /// Simple text content.
    Text(String),
    /// Array of typed content blocks (text, image).
    Blocks(Vec<ApiContentBlock>),
}

/// A typed content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
    /// Image content block (base64 encoded), for vision inputs.
    #[serde(rename = "image")]
    Image { source: ImageSource },
}

/// Source data for an image content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    /// Source type (always "base64" for inline images).
    #[serde(rename = "type")]
    pub source_type: String,
    /// MIME type (e.g., "image/jpeg", "image/png").
    pub media_type: String,
    /// Base64-encoded image data.
    pub data: String,
}

// --- Response types ---

/// A full response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Response ID.
    pub id: String,
    /// Content blocks in the response.
    pub content: Vec<ResponseContentBlock>,
    /// Model that generated the response.
    pub model: String,
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    pub usage: ApiUsage,
}

impl MessageResponse {
    /// Concatenated text of all text content blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| {
                let ResponseContentBlock::Text { text } = block;
                text.as_str()
            })
            .collect()
    }
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    /// Number of input tokens consumed.
    pub input_tokens: u32,
    /// Number of output tokens generated.
    pub output_tokens: u32,
}

// --- SSE event types ---

/// SSE event: message_start
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageStart {
    /// The initial message object.
    pub message: MessageStartBody,
}

/// The message body inside a message_start event. The content array is empty
/// at this point, so only identity fields are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageStartBody {
    pub id: String,
    pub model: String,
}

/// SSE event: content_block_delta
#[derive(Debug, Clone, Deserialize)]
pub struct SseContentBlockDelta {
    /// Index of the content block being updated.
    pub index: usize,
    /// The delta update.
    pub delta: SseDelta,
}

/// A delta update within a content block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SseDelta {
    /// Text delta -- appends text to the current block.
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
}

/// SSE event: message_delta
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageDelta {
    /// Delta information (stop reason, etc.).
    pub delta: SseMessageDeltaInfo,
    /// Updated usage statistics.
    pub usage: Option<ApiUsage>,
}

/// Delta information for a message_delta event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseMessageDeltaInfo {
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
}

/// SSE event: error
#[derive(Debug, Clone, Deserialize)]
pub struct SseError {
    /// Error details.
    pub error: SseErrorDetail,
}

/// Error detail within an SSE error event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error response (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_message_request() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: ApiContent::Text("Hello".into()),
            }],
            system: Some("You are a home-improvement assistant.".into()),
            max_tokens: 2048,
            stream: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["stream"], true);
        assert_eq!(json["system"], "You are a home-improvement assistant.");
        assert_eq!(json["messages"][0]["content"], "Hello");
    }

    #[test]
    fn serialize_message_request_without_system_omits_field() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![],
            system: None,
            max_tokens: 1024,
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn serialize_image_content_block() {
        let msg = ApiMessage {
            role: "user".into(),
            content: ApiContent::Blocks(vec![
                ApiContentBlock::Text {
                    text: "What room is this?".into(),
                },
                ApiContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64".into(),
                        media_type: "image/jpeg".into(),
                        data: "abc123==".into(),
                    },
                },
            ]),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image");
        assert_eq!(json["content"][1]["source"]["media_type"], "image/jpeg");
    }

    #[test]
    fn deserialize_message_response_and_collect_text() {
        let json = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Soft gray works well "},
                {"type": "text", "text": "in north-facing rooms."}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let resp: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, "msg_123");
        assert_eq!(resp.stop_reason, Some("end_turn".into()));
        assert_eq!(resp.text(), "Soft gray works well in north-facing rooms.");
    }

    #[test]
    fn deserialize_sse_content_block_delta() {
        let json = r#"{"index": 0, "delta": {"type": "text_delta", "text": "Hello"}}"#;
        let delta: SseContentBlockDelta = serde_json::from_str(json).unwrap();
        assert_eq!(delta.index, 0);
        let SseDelta::TextDelta { ref text } = delta.delta;
        assert_eq!(text, "Hello");
    }

    #[test]
    fn deserialize_sse_message_delta() {
        let json = r#"{"delta": {"stop_reason": "end_turn"}, "usage": {"input_tokens": 100, "output_tokens": 50}}"#;
        let md: SseMessageDelta = serde_json::from_str(json).unwrap();
        assert_eq!(md.delta.stop_reason, Some("end_turn".into()));
        assert_eq!(md.usage.as_ref().unwrap().output_tokens, 50);
    }

    #[test]
    fn deserialize_sse_error() {
        let json = r#"{"error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let err: SseError = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.type_, "overloaded_error");
    }
}
