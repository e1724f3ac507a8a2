// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn pipeline controller.
//!
//! One turn flows through a fixed stage order: Validate -> Classify ->
//! Retrieve -> Load History -> Generate -> Enrich -> Journey -> Suggest ->
//! Persist -> Finalize. Data flows forward only; later stages append
//! metadata but never rewrite earlier outputs.
//!
//! Turns for the same conversation are single-flight and in order: a keyed
//! async mutex prevents a new turn from starting before the prior turn's
//! commit. Turns for different conversations run fully in parallel.
//!
//! Only validation and persistence failures surface to the caller; every
//! other failure degrades content (absent enrichment, fallback reply,
//! keyword-tier intent) per the error policy.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use hearth_actions::{suggest, SlotState, SuggestionSet};
use hearth_config::model::{HearthConfig, PipelineConfig};
use hearth_core::traits::TurnCommit;
use hearth_core::types::{
    now_rfc3339, Attachment, AttachmentKind, Conversation, ConversationStatus, Message,
    Persona, Provenance, Role, Scenario, TextChunk, ToolOutput, TurnMetadata, TurnOutcome,
    TurnRequest,
};
use hearth_core::{
    ContractorLookup, GroundingSearch, HearthError, ImageGeneration, KnowledgeIndex,
    TextGeneration, TurnStore,
};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::{Classification, IntentClassifier, ModelClassifier, TieredClassifier};
use crate::enrich::{Enricher, EnricherConfig};
use crate::generate::ResponseGenerator;
use crate::history::load_history;
use crate::journey::plan_attachment;
use crate::validate::{validate, NormalizedTurn};

/// Pipeline stages, in execution order. Used for tracing and for the
/// explicit state machine the controller walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Validate,
    Classify,
    Retrieve,
    LoadHistory,
    Generate,
    Enrich,
    Journey,
    Suggest,
    Persist,
    Finalize,
}

/// Snippets requested from the knowledge index per turn; the retriever may
/// cap this further.
const SNIPPET_LIMIT: usize = 6;

impl std::fmt::Display for TurnStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnStage::Validate => "validate",
            TurnStage::Classify => "classify",
            TurnStage::Retrieve => "retrieve",
            TurnStage::LoadHistory => "load_history",
            TurnStage::Generate => "generate",
            TurnStage::Enrich => "enrich",
            TurnStage::Journey => "journey",
            TurnStage::Suggest => "suggest",
            TurnStage::Persist => "persist",
            TurnStage::Finalize => "finalize",
        };
        write!(f, "{name}")
    }
}

/// The capability adapters the pipeline runs against.
pub struct PipelineDeps {
    pub store: Arc<dyn TurnStore>,
    pub index: Arc<dyn KnowledgeIndex>,
    /// Reply generation tier.
    pub generation: Arc<dyn TextGeneration>,
    /// Cheap tier for intent classification; `None` means keyword-only.
    pub classifier_generation: Option<Arc<dyn TextGeneration>>,
    pub image: Arc<dyn ImageGeneration>,
    pub search: Arc<dyn GroundingSearch>,
    pub contractors: Arc<dyn ContractorLookup>,
}

/// Orchestrates one assistant turn end to end.
pub struct TurnPipeline {
    store: Arc<dyn TurnStore>,
    index: Arc<dyn KnowledgeIndex>,
    generator: ResponseGenerator,
    classifier: TieredClassifier,
    enricher: Enricher,
    config: PipelineConfig,
    /// Per-conversation single-flight locks.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TurnPipeline {
    pub fn new(deps: PipelineDeps, config: &HearthConfig) -> Self {
        let classifier = TieredClassifier::new(
            deps.classifier_generation
                .map(|g| Box::new(ModelClassifier::new(g)) as Box<dyn IntentClassifier>),
        );
        let generator = ResponseGenerator::new(
            deps.generation,
            config.pipeline.generation_retries,
            config.generation.max_tokens,
        );
        let enricher = Enricher::new(
            deps.image,
            deps.search,
            deps.contractors,
            EnricherConfig {
                per_tool_timeout: Duration::from_secs(config.pipeline.per_tool_timeout_secs),
                overall_timeout: Duration::from_secs(config.pipeline.enrichment_timeout_secs),
                video_site_filter: config.search.video_site_filter.clone(),
                default_location: config.maps.default_location.clone(),
            },
        );

        Self {
            store: deps.store,
            index: deps.index,
            generator,
            classifier,
            enricher,
            config: config.pipeline.clone(),
            locks: DashMap::new(),
        }
    }

    /// Process one turn without streaming or cancellation.
    pub async fn process_turn(&self, request: TurnRequest) -> Result<TurnOutcome, HearthError> {
        self.process_turn_streaming(request, None, CancellationToken::new())
            .await
    }

    /// Process one turn, forwarding reply chunks to `chunk_tx` as they are
    /// generated.
    ///
    /// Cancelling `cancel` before the persist stage aborts the turn (and
    /// any in-flight tool calls) without persisting anything; once the
    /// persist stage begins, the turn runs to completion.
    pub async fn process_turn_streaming(
        &self,
        request: TurnRequest,
        chunk_tx: Option<mpsc::Sender<TextChunk>>,
        cancel: CancellationToken,
    ) -> Result<TurnOutcome, HearthError> {
        debug!(conversation_id = %request.conversation_id, stage = %TurnStage::Validate, "turn started");
        let turn = validate(&request.text, request.attachments.clone(), &self.config)?;

        // Single-flight per conversation: the prior turn must have committed
        // before this one touches any state.
        let lock = self
            .locks
            .entry(request.conversation_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Defensive bound on the pre-persist stages. Nothing has been
        // written yet when it fires, so the caller can safely retry.
        let turn_timeout = Duration::from_secs(self.config.turn_timeout_secs);
        let prepared = tokio::time::timeout(
            turn_timeout,
            self.prepare(&request, &turn, chunk_tx.as_ref(), &cancel),
        )
        .await
        .map_err(|_| HearthError::Timeout {
            duration: turn_timeout,
        })??;

        if cancel.is_cancelled() {
            debug!(conversation_id = %request.conversation_id, "turn cancelled before persistence");
            return Err(HearthError::Internal(
                "turn cancelled before persistence".into(),
            ));
        }

        debug!(conversation_id = %request.conversation_id, stage = %TurnStage::Persist, "committing turn");
        let committed = self.store.commit_turn(prepared.commit).await?;

        info!(
            conversation_id = %request.conversation_id,
            stage = %TurnStage::Finalize,
            user_seq = committed.user_seq,
            assistant_seq = committed.assistant_seq,
            degraded = prepared.outcome.degraded,
            "turn complete"
        );
        Ok(prepared.outcome)
    }

    /// Stages 2-8: everything between validation and the commit.
    async fn prepare(
        &self,
        request: &TurnRequest,
        turn: &NormalizedTurn,
        chunk_tx: Option<&mpsc::Sender<TextChunk>>,
        cancel: &CancellationToken,
    ) -> Result<PreparedTurn, HearthError> {
        let conversation_id = &request.conversation_id;
        let now = now_rfc3339();

        // The conversation is created on the first turn and mode-updated on
        // every turn; the row lands with the commit.
        let mut conversation = match self.store.get_conversation(conversation_id).await? {
            Some(existing) => existing,
            None => Conversation {
                id: conversation_id.clone(),
                persona: Persona::None,
                scenario: Scenario::None,
                scope: Default::default(),
                mode: request.mode,
                status: ConversationStatus::Active,
                created_at: now.clone(),
                updated_at: now.clone(),
            },
        };
        conversation.mode = request.mode;
        conversation.updated_at = now.clone();

        // Classify, with a short context window for momentum.
        debug!(conversation_id = %conversation_id, stage = %TurnStage::Classify, "classifying intent");
        let recent: Vec<String> = self
            .store
            .get_messages(conversation_id, Some(6))
            .await?
            .into_iter()
            .map(|m| m.content)
            .collect();
        let classification = self.classifier.classify(&turn.text, &recent).await;

        // Retrieve scoped context; a broken index degrades to generic
        // behavior rather than failing the turn.
        debug!(conversation_id = %conversation_id, stage = %TurnStage::Retrieve, "retrieving context");
        let snippets = match self
            .index
            .query(&conversation.scope, &turn.text, SNIPPET_LIMIT)
            .await
        {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!(error = %e, "context retrieval failed, continuing without snippets");
                vec![]
            }
        };

        debug!(conversation_id = %conversation_id, stage = %TurnStage::LoadHistory, "loading history");
        let history =
            load_history(self.store.as_ref(), conversation_id, self.config.history_char_budget)
                .await?;

        debug!(conversation_id = %conversation_id, stage = %TurnStage::Generate, "generating reply");
        let reply = self
            .generator
            .generate(&conversation, &snippets, &history, turn, chunk_tx)
            .await;

        // Slot state comes from what the user has supplied so far.
        let slots = SlotState::scan(
            history
                .iter()
                .filter(|m| m.role == Role::User)
                .map(|m| m.content.as_str())
                .chain(std::iter::once(turn.text.as_str())),
        );

        debug!(conversation_id = %conversation_id, stage = %TurnStage::Enrich, "running enrichment");
        let tool_outputs = self
            .enricher
            .enrich(request.mode, classification.intent, &turn.text, &slots, cancel)
            .await;

        // Build the message and attachment rows for the commit.
        let user_message_id = uuid::Uuid::new_v4().to_string();
        let assistant_message_id = uuid::Uuid::new_v4().to_string();
        let attachments =
            build_attachments(turn, &tool_outputs, &user_message_id, &assistant_message_id, &now);

        debug!(conversation_id = %conversation_id, stage = %TurnStage::Journey, "managing journey");
        let image_ids: Vec<String> = attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Image)
            .map(|a| a.id.clone())
            .collect();
        let journey_plan =
            plan_attachment(self.store.as_ref(), conversation_id, &image_ids).await;

        debug!(conversation_id = %conversation_id, stage = %TurnStage::Suggest, "computing suggestions");
        let window = self
            .store
            .suggestion_window(conversation_id, self.config.suggestion_window_k)
            .await?;
        let suggestions = suggest(
            classification.intent,
            conversation.scenario,
            conversation.persona,
            &slots,
            &window,
            self.config.max_suggestions,
        );
        if suggestions.actions_exhausted || suggestions.questions_exhausted {
            // Documented fallback exhaustion: the window swallowed even the
            // defaults, so this turn carries fewer (or no) suggestions.
            info!(
                conversation_id = %conversation_id,
                actions_exhausted = suggestions.actions_exhausted,
                questions_exhausted = suggestions.questions_exhausted,
                "suggestion defaults exhausted"
            );
        }

        let (commit, outcome) = assemble_commit(
            conversation,
            turn,
            &classification,
            reply.text,
            reply.degraded,
            tool_outputs,
            attachments,
            journey_plan,
            suggestions,
            user_message_id,
            assistant_message_id,
            now,
        );

        Ok(PreparedTurn { commit, outcome })
    }
}

/// Everything ready for the persist stage.
struct PreparedTurn {
    commit: TurnCommit,
    outcome: TurnOutcome,
}

/// Attachment rows for one turn: the user's uploads on the user message,
/// generated images on the assistant message.
fn build_attachments(
    turn: &NormalizedTurn,
    tool_outputs: &[ToolOutput],
    user_message_id: &str,
    assistant_message_id: &str,
    now: &str,
) -> Vec<Attachment> {
    let mut attachments = Vec::new();

    for incoming in &turn.attachments {
        attachments.push(Attachment {
            id: uuid::Uuid::new_v4().to_string(),
            message_id: user_message_id.to_string(),
            kind: incoming.kind,
            storage_ref: incoming.storage_ref.clone(),
            content_type: incoming.content_type.clone(),
            provenance: Provenance::UserUploaded,
            analysis: incoming.analysis.clone(),
            journey_step_id: None,
            created_at: now.to_string(),
        });
    }

    for output in tool_outputs {
        if let ToolOutput::Image { locators } = output {
            for locator in locators {
                attachments.push(Attachment {
                    id: uuid::Uuid::new_v4().to_string(),
                    message_id: assistant_message_id.to_string(),
                    kind: AttachmentKind::Image,
                    storage_ref: locator.url.clone(),
                    content_type: locator
                        .content_type
                        .clone()
                        .unwrap_or_else(|| "image/png".to_string()),
                    provenance: Provenance::Generated,
                    analysis: None,
                    journey_step_id: None,
                    created_at: now.to_string(),
                });
            }
        }
    }

    attachments
}

#[allow(clippy::too_many_arguments)]
fn assemble_commit(
    conversation: Conversation,
    turn: &NormalizedTurn,
    classification: &Classification,
    reply_text: String,
    degraded: bool,
    tool_outputs: Vec<ToolOutput>,
    attachments: Vec<Attachment>,
    journey_plan: Option<crate::journey::JourneyPlan>,
    suggestions: SuggestionSet,
    user_message_id: String,
    assistant_message_id: String,
    now: String,
) -> (TurnCommit, TurnOutcome) {
    let conversation_id = conversation.id.clone();

    let (journey_attach, journey_delta) = match journey_plan {
        Some(plan) => (Some(plan.attach), Some(plan.delta)),
        None => (None, None),
    };

    let metadata = TurnMetadata {
        intent: Some(classification.intent),
        intent_confidence: Some(classification.confidence),
        intent_source: Some(classification.source),
        tool_outputs,
        suggested_actions: suggestions.actions.clone(),
        suggested_questions: suggestions.questions.clone(),
        journey_delta,
        degraded,
    };

    let user_message = Message {
        id: user_message_id,
        conversation_id: conversation_id.clone(),
        seq: 0, // allocated by the commit transaction
        role: Role::User,
        content: turn.text.clone(),
        metadata: None,
        created_at: now.clone(),
    };
    let assistant_message = Message {
        id: assistant_message_id,
        conversation_id: conversation_id.clone(),
        seq: 0, // allocated by the commit transaction
        role: Role::Assistant,
        content: reply_text.clone(),
        metadata: Some(metadata),
        created_at: now,
    };

    let commit = TurnCommit {
        conversation,
        user_message,
        assistant_message,
        attachments: attachments.clone(),
        journey_attach,
        emitted_action_ids: suggestions.actions.iter().map(|a| a.id.clone()).collect(),
        emitted_question_ids: suggestions.questions.iter().map(|q| q.id.clone()).collect(),
    };

    let outcome = TurnOutcome {
        conversation_id,
        reply_text,
        suggested_actions: suggestions.actions,
        suggested_questions: suggestions.questions,
        attachments,
        degraded,
    };

    (commit, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_render_in_order() {
        let stages = [
            TurnStage::Validate,
            TurnStage::Classify,
            TurnStage::Retrieve,
            TurnStage::LoadHistory,
            TurnStage::Generate,
            TurnStage::Enrich,
            TurnStage::Journey,
            TurnStage::Suggest,
            TurnStage::Persist,
            TurnStage::Finalize,
        ];
        let rendered: Vec<String> = stages.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered[0], "validate");
        assert_eq!(rendered[9], "finalize");
        assert_eq!(rendered.len(), 10);
    }

    #[test]
    fn generated_images_land_on_the_assistant_message() {
        let turn = NormalizedTurn {
            text: "paint it gray".into(),
            attachments: vec![hearth_core::types::IncomingAttachment {
                kind: AttachmentKind::Image,
                storage_ref: "blob://uploads/before.jpg".into(),
                content_type: "image/jpeg".into(),
                size_bytes: 2048,
                analysis: None,
            }],
        };
        let outputs = vec![ToolOutput::Image {
            locators: vec![hearth_core::types::ImageLocator {
                url: "https://cdn.example.com/after.png".into(),
                content_type: None,
            }],
        }];

        let attachments = build_attachments(&turn, &outputs, "user-msg", "assistant-msg", "now");
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].message_id, "user-msg");
        assert_eq!(attachments[0].provenance, Provenance::UserUploaded);
        assert_eq!(attachments[1].message_id, "assistant-msg");
        assert_eq!(attachments[1].provenance, Provenance::Generated);
        assert_eq!(attachments[1].content_type, "image/png");
    }
}
