// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model for the Hearth assistant backend.
//!
//! Entities here are persisted by `hearth-storage` (timestamps as RFC 3339
//! TEXT, enums as their snake_case string forms) and exchanged across the
//! capability trait boundaries. Tool outputs are modeled as a tagged union
//! with a fixed field set per tag so the enricher's fan-in stays type-safe.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// --- Identity ---

/// Who is speaking. Threaded explicitly through the call chain; there is no
/// process-wide default user for guest access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Identity {
    /// Unauthenticated guest access.
    Anonymous,
    /// An authenticated user id.
    User(String),
}

// --- Conversation ---

/// Persona the assistant adopts for a conversation. A hint for tone and
/// ranking, never a gate on which actions are offered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    #[default]
    None,
    Homeowner,
    DiyWorker,
    Contractor,
}

/// Guided scenario a conversation may be running under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    None,
    DiyProjectPlan,
    ContractorQuotes,
}

/// Conversation mode. Multimodal tool enrichment only runs in `Agent` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Chat,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Closed,
}

/// Home/room identifiers scoping context retrieval. Both parts optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeScope {
    pub home_id: Option<String>,
    pub room_id: Option<String>,
}

impl HomeScope {
    pub fn is_empty(&self) -> bool {
        self.home_id.is_none() && self.room_id.is_none()
    }
}

/// A long-lived conversation. Created on the first turn, mutated by every
/// turn, archived (never deleted) when closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub persona: Persona,
    pub scenario: Scenario,
    pub scope: HomeScope,
    pub mode: ConversationMode,
    pub status: ConversationStatus,
    pub created_at: String,
    pub updated_at: String,
}

// --- Messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One persisted chat message. Immutable once committed; ordered by `seq`,
/// a per-conversation monotonic sequence allocated inside the commit
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub seq: i64,
    pub role: Role,
    pub content: String,
    pub metadata: Option<TurnMetadata>,
    pub created_at: String,
}

/// Which classifier tier produced the intent label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    Model,
    Keyword,
}

/// Structured metadata attached to an assistant message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_source: Option<IntentSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_outputs: Vec<ToolOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<ActionChip>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_questions: Vec<ClarifyingQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_delta: Option<JourneyDelta>,
    #[serde(default)]
    pub degraded: bool,
}

/// Record of what the journey manager attached during a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyDelta {
    pub journey_id: String,
    pub step_id: String,
    pub attachment_ids: Vec<String>,
}

// --- Intent taxonomy ---

/// Closed intent taxonomy for a user turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DesignVisualization,
    DiyGuide,
    CostEstimate,
    ContractorQuotes,
    ProductSearch,
    PdfExportRequest,
    GeneralQuestion,
}

impl Intent {
    /// All taxonomy labels, for constrained-output prompts and fallback tables.
    pub const ALL: &'static [Intent] = &[
        Intent::DesignVisualization,
        Intent::DiyGuide,
        Intent::CostEstimate,
        Intent::ContractorQuotes,
        Intent::ProductSearch,
        Intent::PdfExportRequest,
        Intent::GeneralQuestion,
    ];
}

// --- Attachments ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Document,
}

/// Where an attachment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    UserUploaded,
    Generated,
}

/// An attachment as submitted with a turn, before it is bound to a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingAttachment {
    pub kind: AttachmentKind,
    pub storage_ref: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
}

/// A persisted attachment. Owned by exactly one message; optionally linked
/// to at most one journey step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub message_id: String,
    pub kind: AttachmentKind,
    pub storage_ref: String,
    pub content_type: String,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_step_id: Option<String>,
    pub created_at: String,
}

// --- Journeys ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Active,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Done,
}

/// A tracked multi-step home-improvement project. At most one active
/// journey per conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub conversation_id: String,
    pub template: String,
    pub status: JourneyStatus,
    pub created_at: String,
}

/// One step of a journey. At most one step per journey is `InProgress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStep {
    pub id: String,
    pub journey_id: String,
    pub position: i64,
    pub title: String,
    pub status: StepStatus,
}

// --- Tool outputs (tagged union, fixed fields per tag) ---

/// A locator for a generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLocator {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// One web/product grounding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub source: String,
}

/// One contractor lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorHit {
    pub name: String,
    pub locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Output of one enrichment tool, tagged by tool kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    Image { locators: Vec<ImageLocator> },
    Search { hits: Vec<SearchHit> },
    Video { hits: Vec<SearchHit> },
    Contractor { hits: Vec<ContractorHit> },
}

impl ToolOutput {
    /// True when the tool returned nothing worth attaching to the turn.
    pub fn is_empty(&self) -> bool {
        match self {
            ToolOutput::Image { locators } => locators.is_empty(),
            ToolOutput::Search { hits } | ToolOutput::Video { hits } => hits.is_empty(),
            ToolOutput::Contractor { hits } => hits.is_empty(),
        }
    }
}

// --- Suggestions ---

/// A follow-up action chip offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChip {
    pub id: String,
    pub label: String,
}

/// A clarifying question offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyingQuestion {
    pub id: String,
    pub text: String,
}

/// The rolling window of recently emitted suggestion ids for a conversation.
#[derive(Debug, Clone, Default)]
pub struct SuggestionWindow {
    pub action_ids: Vec<String>,
    pub question_ids: Vec<String>,
}

// --- Retrieval ---

/// A ranked knowledge snippet returned by the knowledge index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub score: f64,
}

// --- Turn surface ---

/// Everything the caller submits for one turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: String,
    pub identity: Identity,
    pub text: String,
    pub attachments: Vec<IncomingAttachment>,
    pub mode: ConversationMode,
}

/// Everything the caller gets back from one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub conversation_id: String,
    pub reply_text: String,
    pub suggested_actions: Vec<ActionChip>,
    pub suggested_questions: Vec<ClarifyingQuestion>,
    pub attachments: Vec<Attachment>,
    pub degraded: bool,
}

/// One incremental reply chunk on the per-turn streaming channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
}

// --- Generation capability request/response ---

/// One block of prompt content. Images are base64-encoded for vision inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptBlock {
    Text { text: String },
    Image { media_type: String, data: String },
}

/// One message in a generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: Vec<PromptBlock>,
}

impl PromptMessage {
    pub fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: vec![PromptBlock::Text { text: text.into() }],
        }
    }
}

/// A request to the text/vision generation capability.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
}

/// A complete (non-streaming) generation result.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub stop_reason: Option<String>,
}

/// One event on a streaming generation.
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// An incremental text delta, in generation order.
    Delta { text: String },
    /// The generation finished.
    Completed { stop_reason: Option<String> },
}

// --- Adapter plumbing ---

/// Health status reported by capability health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the kind of capability adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterKind {
    Generation,
    Image,
    Search,
    Maps,
    Index,
    Storage,
}

/// Returns the current time as an RFC 3339 string, the canonical timestamp
/// format for all persisted entities.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
