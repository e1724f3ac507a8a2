// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for conversations, messages, journeys, and the
//! all-or-nothing turn commit.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::{
    Attachment, Conversation, Journey, JourneyStep, Message, SuggestionWindow,
};

/// The journey mutation computed by a turn, applied inside the commit
/// transaction.
#[derive(Debug, Clone)]
pub struct JourneyAttach {
    pub journey_id: String,
    pub step_id: String,
    /// Ids of attachments (from the commit's attachment set) to link to the step.
    pub attachment_ids: Vec<String>,
}

/// Everything one turn persists, committed as a single transaction.
///
/// Message `seq` values are allocated inside the transaction; the `seq`
/// fields on the carried messages are ignored.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    /// Updated conversation row (mode/status/updated_at may have changed).
    pub conversation: Conversation,
    pub user_message: Message,
    pub assistant_message: Message,
    /// Attachments for either message of this turn.
    pub attachments: Vec<Attachment>,
    /// Optional journey step linkage from the journey manager.
    pub journey_attach: Option<JourneyAttach>,
    /// Suggestion ids emitted this turn, appended to the rolling window.
    pub emitted_action_ids: Vec<String>,
    pub emitted_question_ids: Vec<String>,
}

/// Sequence numbers assigned by a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedTurn {
    pub user_seq: i64,
    pub assistant_seq: i64,
}

/// Transactional persistence for all turn entities.
///
/// Everything except [`TurnStore::commit_turn`] is a plain read or a
/// single-entity write; `commit_turn` is the one multi-entity atomicity
/// boundary in the system.
#[async_trait]
pub trait TurnStore: CapabilityAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), HearthError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), HearthError>;

    // --- Conversations ---

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), HearthError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, HearthError>;

    async fn list_conversations(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<Conversation>, HearthError>;

    /// Archives a conversation. Conversations are never deleted.
    async fn close_conversation(&self, id: &str) -> Result<(), HearthError>;

    // --- Messages (read-only outside the commit) ---

    /// Returns messages in chronological (seq) order, optionally the most
    /// recent `limit` only.
    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, HearthError>;

    // --- Journeys ---

    async fn create_journey(
        &self,
        journey: &Journey,
        steps: &[JourneyStep],
    ) -> Result<(), HearthError>;

    /// Returns the at-most-one active journey for a conversation.
    async fn get_active_journey(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Journey>, HearthError>;

    async fn get_journey_steps(&self, journey_id: &str) -> Result<Vec<JourneyStep>, HearthError>;

    /// Marks the current in-progress step done and promotes the next pending
    /// step, preserving the single-current-step invariant. A journey whose
    /// last step completes becomes `completed`.
    async fn advance_journey(&self, journey_id: &str) -> Result<(), HearthError>;

    /// Returns the attachments linked to a journey step.
    async fn get_step_attachments(
        &self,
        journey_step_id: &str,
    ) -> Result<Vec<Attachment>, HearthError>;

    // --- Suggestions ---

    /// Returns the rolling window of suggestion ids emitted over the last
    /// `k` turns of a conversation.
    async fn suggestion_window(
        &self,
        conversation_id: &str,
        k: usize,
    ) -> Result<SuggestionWindow, HearthError>;

    // --- The turn commit ---

    /// Atomically persists one turn: the user message, the assistant message
    /// with its metadata, the turn's attachments, the journey mutation, and
    /// the suggestion-window rows. Either everything commits or nothing does.
    async fn commit_turn(&self, commit: TurnCommit) -> Result<CommittedTurn, HearthError>;
}
