// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generation with streaming, one retry, and a degraded fallback.
//!
//! Chunks are forwarded to the per-turn channel in generation order and are
//! never re-emitted: a retry only happens when nothing has been streamed
//! yet, so consumers always see a single monotonically growing reply.
//! Persistent failure degrades to a fixed apology; it never aborts the turn.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use hearth_core::types::{
    Conversation, GenerationEvent, GenerationRequest, Message, Persona, PromptMessage, Role,
    Scenario, Snippet, TextChunk,
};
use hearth_core::TextGeneration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::validate::NormalizedTurn;

/// Reply used when the generation capability stays down past the retry.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble putting an answer together right now. Your message is saved -- \
     please try again in a moment.";

/// Delay before the single retry.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// The generated reply and whether the turn degraded.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
    pub degraded: bool,
}

/// Assembles prompts and drives the streaming generation call.
pub struct ResponseGenerator {
    generation: Arc<dyn TextGeneration>,
    retries: u32,
    max_tokens: u32,
}

impl ResponseGenerator {
    pub fn new(generation: Arc<dyn TextGeneration>, retries: u32, max_tokens: u32) -> Self {
        Self {
            generation,
            retries,
            max_tokens,
        }
    }

    /// Generate the assistant reply for a turn, forwarding chunks to
    /// `chunk_tx` as they arrive.
    pub async fn generate(
        &self,
        conversation: &Conversation,
        snippets: &[Snippet],
        history: &[Message],
        turn: &NormalizedTurn,
        chunk_tx: Option<&mpsc::Sender<TextChunk>>,
    ) -> GeneratedReply {
        let request = build_request(conversation, snippets, history, turn, self.max_tokens);

        for attempt in 0..=self.retries {
            if attempt > 0 {
                warn!(attempt, "retrying generation after transient failure");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            let mut stream = match self.generation.stream(request.clone()).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, attempt, "generation call failed");
                    continue;
                }
            };

            let mut text = String::new();
            let mut failed_midstream = false;

            while let Some(event) = stream.next().await {
                match event {
                    Ok(GenerationEvent::Delta { text: delta }) => {
                        text.push_str(&delta);
                        if let Some(tx) = chunk_tx {
                            // A closed channel only means no one is
                            // listening; generation continues regardless.
                            let _ = tx.send(TextChunk { text: delta }).await;
                        }
                    }
                    Ok(GenerationEvent::Completed { stop_reason }) => {
                        debug!(stop_reason = ?stop_reason, "generation complete");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "generation stream error");
                        failed_midstream = true;
                        break;
                    }
                }
            }

            if !failed_midstream && !text.is_empty() {
                return GeneratedReply {
                    text,
                    degraded: false,
                };
            }

            if failed_midstream && !text.is_empty() {
                // Part of the reply already reached the consumer; a retry
                // would re-emit chunks out of order. Keep the partial text.
                warn!("stream failed after partial output, keeping partial reply");
                return GeneratedReply {
                    text,
                    degraded: true,
                };
            }
            // Nothing streamed yet: safe to retry from scratch.
        }

        if let Some(tx) = chunk_tx {
            let _ = tx
                .send(TextChunk {
                    text: FALLBACK_REPLY.to_string(),
                })
                .await;
        }
        GeneratedReply {
            text: FALLBACK_REPLY.to_string(),
            degraded: true,
        }
    }
}

/// Builds the generation request from persona/scenario configuration,
/// retrieved context, loaded history, and the new turn.
fn build_request(
    conversation: &Conversation,
    snippets: &[Snippet],
    history: &[Message],
    turn: &NormalizedTurn,
    max_tokens: u32,
) -> GenerationRequest {
    let mut system = String::from(
        "You are Hearth, a home-improvement assistant. Be practical and specific; \
         give measurements, materials, and realistic effort levels.",
    );
    system.push(' ');
    system.push_str(persona_preamble(conversation.persona));
    if let Some(scenario) = scenario_preamble(conversation.scenario) {
        system.push(' ');
        system.push_str(scenario);
    }

    if !snippets.is_empty() {
        system.push_str("\n\nWhat you know about this home:\n");
        for snippet in snippets {
            if let Some(title) = &snippet.title {
                system.push_str(&format!("- {title}: {}\n", snippet.text));
            } else {
                system.push_str(&format!("- {}\n", snippet.text));
            }
        }
    }

    let mut messages: Vec<PromptMessage> = history
        .iter()
        .map(|m| {
            PromptMessage::text(
                match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                m.content.clone(),
            )
        })
        .collect();

    let mut turn_text = turn.text.clone();
    for attachment in &turn.attachments {
        turn_text.push_str(&format!(
            "\n[attached {}: {}]",
            attachment.kind, attachment.storage_ref
        ));
    }
    messages.push(PromptMessage::text("user", turn_text));

    GenerationRequest {
        system: Some(system),
        messages,
        max_tokens,
    }
}

fn persona_preamble(persona: Persona) -> &'static str {
    match persona {
        Persona::None => "Assume no particular skill level until the user shows one.",
        Persona::Homeowner => {
            "The user is a homeowner; explain trade-offs without assuming tool experience."
        }
        Persona::DiyWorker => {
            "The user does their own work; skip the basics and be precise about technique."
        }
        Persona::Contractor => {
            "The user is a professional; use trade terminology and code references freely."
        }
    }
}

fn scenario_preamble(scenario: Scenario) -> Option<&'static str> {
    match scenario {
        Scenario::None => None,
        Scenario::DiyProjectPlan => {
            Some("You are walking the user through planning a DIY project end to end.")
        }
        Scenario::ContractorQuotes => {
            Some("You are helping the user scope work to request contractor quotes.")
        }
    }
}
