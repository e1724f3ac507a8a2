// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over the mock harness and a real SQLite store.

use std::collections::HashSet;
use std::sync::Arc;

use hearth_core::types::{
    AttachmentKind, ConversationMode, IncomingAttachment, JourneyStatus, Provenance, Role,
    StepStatus, ToolOutput,
};
use hearth_core::{HearthError, TurnStore};
use hearth_pipeline::FALLBACK_REPLY;
use hearth_test_utils::{ScriptedReply, TestHarness};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn messages_persist_in_strictly_increasing_gapless_seq_order() {
    let harness = TestHarness::new().await;

    for n in 0..3 {
        harness
            .pipeline
            .process_turn(harness.turn(
                "conv-order",
                &format!("question number {n}"),
                ConversationMode::Chat,
            ))
            .await
            .unwrap();
    }

    let messages = harness
        .store
        .get_messages("conv-order", None)
        .await
        .unwrap();
    let seqs: Vec<i64> = messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, (1..=6).collect::<Vec<i64>>(), "no gaps, strict order");
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn empty_message_is_a_validation_error_and_persists_nothing() {
    let harness = TestHarness::new().await;

    let err = harness
        .pipeline
        .process_turn(harness.turn("conv-empty", "   ", ConversationMode::Agent))
        .await
        .unwrap_err();
    assert!(matches!(err, HearthError::Validation { .. }));

    let conversation = harness.store.get_conversation("conv-empty").await.unwrap();
    assert!(conversation.is_none(), "no conversation row created");
    let messages = harness.store.get_messages("conv-empty", None).await.unwrap();
    assert!(messages.is_empty(), "no message persisted");
}

#[tokio::test]
async fn agent_mode_visualization_turn_includes_a_generated_image() {
    let harness = TestHarness::new().await;
    harness
        .generation
        .push(ScriptedReply::Text("Soft gray would look great.".into()))
        .await;

    let outcome = harness
        .pipeline
        .process_turn(harness.turn(
            "conv-viz",
            "paint my living room soft gray",
            ConversationMode::Agent,
        ))
        .await
        .unwrap();

    assert!(!outcome.degraded);
    let generated: Vec<_> = outcome
        .attachments
        .iter()
        .filter(|a| a.provenance == Provenance::Generated)
        .collect();
    assert!(!generated.is_empty(), "at least one generated image locator");
    assert_eq!(generated[0].kind, AttachmentKind::Image);

    // The persisted assistant metadata carries the image tool output.
    let messages = harness.store.get_messages("conv-viz", None).await.unwrap();
    let meta = messages[1].metadata.as_ref().unwrap();
    assert!(meta
        .tool_outputs
        .iter()
        .any(|o| matches!(o, ToolOutput::Image { .. })));
}

#[tokio::test]
async fn chat_mode_has_no_tool_side_effects_for_any_intent() {
    let harness = TestHarness::new().await;

    for text in [
        "paint my living room soft gray",
        "how do I install a ceiling fan",
        "how much would new counters cost",
        "find me a contractor for the roof",
    ] {
        harness
            .pipeline
            .process_turn(harness.turn("conv-chat", text, ConversationMode::Chat))
            .await
            .unwrap();
    }

    assert_eq!(harness.image.calls(), 0, "no image calls in chat mode");
    assert_eq!(harness.search.calls(), 0, "no search calls in chat mode");
    assert_eq!(harness.contractors.calls(), 0, "no maps calls in chat mode");

    let messages = harness.store.get_messages("conv-chat", None).await.unwrap();
    for message in messages.iter().filter(|m| m.role == Role::Assistant) {
        let meta = message.metadata.as_ref().unwrap();
        assert!(
            meta.tool_outputs.is_empty(),
            "metadata contains no enrichment fields in chat mode"
        );
    }
}

#[tokio::test]
async fn tool_failure_omits_content_without_degrading_the_turn() {
    let harness = TestHarness::new().await;
    harness.image.set_failing(true);

    let outcome = harness
        .pipeline
        .process_turn(harness.turn(
            "conv-toolfail",
            "paint my living room soft gray",
            ConversationMode::Agent,
        ))
        .await
        .unwrap();

    assert!(
        !outcome.degraded,
        "enrichment failures alone never set degraded"
    );
    assert!(outcome.attachments.is_empty(), "failed tool contributes nothing");
    assert_eq!(harness.image.calls(), 1, "the tool was attempted");
}

#[tokio::test]
async fn slow_tool_times_out_and_turn_still_completes() {
    let harness = TestHarness::new().await;
    // Per-tool timeout in the harness is 1s.
    harness.search.set_delay_ms(1_500);

    let outcome = harness
        .pipeline
        .process_turn(harness.turn(
            "conv-slow",
            "how much would new counters cost",
            ConversationMode::Agent,
        ))
        .await
        .unwrap();

    assert!(!outcome.degraded);
    let messages = harness.store.get_messages("conv-slow", None).await.unwrap();
    let meta = messages[1].metadata.as_ref().unwrap();
    assert!(meta.tool_outputs.is_empty(), "timed-out tool omitted");
}

#[tokio::test]
async fn generation_failure_degrades_but_the_turn_persists() {
    let harness = TestHarness::new().await;
    // First attempt and the retry both fail.
    harness.generation.push(ScriptedReply::Fail).await;
    harness.generation.push(ScriptedReply::Fail).await;

    let outcome = harness
        .pipeline
        .process_turn(harness.turn("conv-genfail", "hello there", ConversationMode::Chat))
        .await
        .unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.reply_text, FALLBACK_REPLY);

    let messages = harness.store.get_messages("conv-genfail", None).await.unwrap();
    assert_eq!(messages.len(), 2, "user message and fallback reply persisted");
    assert!(messages[1].metadata.as_ref().unwrap().degraded);
}

#[tokio::test]
async fn transient_generation_failure_recovers_on_retry() {
    let harness = TestHarness::new().await;
    harness.generation.push(ScriptedReply::Fail).await;
    harness
        .generation
        .push(ScriptedReply::Text("Recovered on retry.".into()))
        .await;

    let outcome = harness
        .pipeline
        .process_turn(harness.turn("conv-retry", "hello there", ConversationMode::Chat))
        .await
        .unwrap();

    assert!(!outcome.degraded);
    assert_eq!(outcome.reply_text, "Recovered on retry.");
}

#[tokio::test]
async fn consecutive_cost_estimate_turns_share_no_suggestions() {
    let harness = TestHarness::new().await;

    let first = harness
        .pipeline
        .process_turn(harness.turn(
            "conv-antirep",
            "how much would a kitchen remodel cost",
            ConversationMode::Chat,
        ))
        .await
        .unwrap();
    let second = harness
        .pipeline
        .process_turn(harness.turn(
            "conv-antirep",
            "and how much would a bathroom remodel cost",
            ConversationMode::Chat,
        ))
        .await
        .unwrap();

    assert!(first.suggested_questions.len() >= 2, "candidates existed");

    let first_questions: HashSet<&str> = first
        .suggested_questions
        .iter()
        .map(|q| q.id.as_str())
        .collect();
    for q in &second.suggested_questions {
        assert!(
            !first_questions.contains(q.id.as_str()),
            "question {} repeated across consecutive turns",
            q.id
        );
    }

    let first_actions: HashSet<&str> =
        first.suggested_actions.iter().map(|a| a.id.as_str()).collect();
    for a in &second.suggested_actions {
        assert!(
            !first_actions.contains(a.id.as_str()),
            "action {} repeated across consecutive turns",
            a.id
        );
    }
}

#[tokio::test]
async fn user_images_attach_to_the_active_journey_step() {
    let harness = TestHarness::new().await;

    // Seed a conversation with an active journey before the turn.
    harness
        .pipeline
        .process_turn(harness.turn("conv-journey", "let's plan a repaint", ConversationMode::Chat))
        .await
        .unwrap();
    let journey = hearth_core::types::Journey {
        id: "j-1".into(),
        conversation_id: "conv-journey".into(),
        template: "paint_room".into(),
        status: JourneyStatus::Active,
        created_at: hearth_core::types::now_rfc3339(),
    };
    let steps = vec![
        hearth_core::types::JourneyStep {
            id: "j-1-step-0".into(),
            journey_id: "j-1".into(),
            position: 0,
            title: "Pick a color".into(),
            status: StepStatus::Pending,
        },
        hearth_core::types::JourneyStep {
            id: "j-1-step-1".into(),
            journey_id: "j-1".into(),
            position: 1,
            title: "Paint".into(),
            status: StepStatus::Pending,
        },
    ];
    harness.store.create_journey(&journey, &steps).await.unwrap();

    let outcome = harness
        .pipeline
        .process_turn(harness.turn_with_attachments(
            "conv-journey",
            "here's the wall as it looks today",
            ConversationMode::Chat,
            vec![IncomingAttachment {
                kind: AttachmentKind::Image,
                storage_ref: "blob://uploads/wall.jpg".into(),
                content_type: "image/jpeg".into(),
                size_bytes: 4096,
                analysis: Some(serde_json::json!({"room_type": "living_room"})),
            }],
        ))
        .await
        .unwrap();

    assert_eq!(outcome.attachments.len(), 1);

    // The attachment landed on the journey's current (first) step.
    let linked = harness.store.get_step_attachments("j-1-step-0").await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].provenance, Provenance::UserUploaded);
    assert_eq!(linked[0].analysis.as_ref().unwrap()["room_type"], "living_room");

    // And the journey delta is recorded in the assistant metadata.
    let messages = harness.store.get_messages("conv-journey", None).await.unwrap();
    let meta = messages.last().unwrap().metadata.as_ref().unwrap();
    let delta = meta.journey_delta.as_ref().expect("journey delta recorded");
    assert_eq!(delta.step_id, "j-1-step-0");

    // The invariant held throughout: exactly one step in progress.
    let steps = harness.store.get_journey_steps("j-1").await.unwrap();
    assert_eq!(
        steps
            .iter()
            .filter(|s| s.status == StepStatus::InProgress)
            .count(),
        1
    );
}

#[tokio::test]
async fn concurrent_turns_for_one_conversation_serialize() {
    let harness = TestHarness::new().await;
    let pipeline = Arc::clone(&harness.pipeline);

    let a = {
        let pipeline = Arc::clone(&pipeline);
        let request = hearth_core::types::TurnRequest {
            conversation_id: "conv-flight".into(),
            identity: hearth_core::types::Identity::Anonymous,
            text: "first turn".into(),
            attachments: vec![],
            mode: ConversationMode::Chat,
        };
        tokio::spawn(async move { pipeline.process_turn(request).await })
    };
    let b = {
        let pipeline = Arc::clone(&pipeline);
        let request = hearth_core::types::TurnRequest {
            conversation_id: "conv-flight".into(),
            identity: hearth_core::types::Identity::Anonymous,
            text: "second turn".into(),
            attachments: vec![],
            mode: ConversationMode::Chat,
        };
        tokio::spawn(async move { pipeline.process_turn(request).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let messages = harness.store.get_messages("conv-flight", None).await.unwrap();
    let seqs: Vec<i64> = messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4], "single-flight keeps seq gapless");
}

#[tokio::test]
async fn cancellation_before_persist_leaves_no_trace() {
    let harness = TestHarness::new().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = harness
        .pipeline
        .process_turn_streaming(
            harness.turn("conv-cancel", "paint my living room", ConversationMode::Agent),
            None,
            cancel,
        )
        .await;
    assert!(result.is_err());

    let messages = harness.store.get_messages("conv-cancel", None).await.unwrap();
    assert!(messages.is_empty(), "cancelled turn persisted nothing");
}

#[tokio::test]
async fn streamed_chunks_reassemble_to_the_reply() {
    let harness = TestHarness::new().await;
    harness
        .generation
        .push(ScriptedReply::Text("A longer streamed reply.".into()))
        .await;

    let (tx, mut rx) = tokio::sync::mpsc::channel(32);
    let outcome = harness
        .pipeline
        .process_turn_streaming(
            harness.turn("conv-stream", "hello there", ConversationMode::Chat),
            Some(tx),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let mut streamed = String::new();
    while let Ok(chunk) = rx.try_recv() {
        streamed.push_str(&chunk.text);
    }
    assert_eq!(streamed, outcome.reply_text, "chunks arrive in order, no reordering");
}

#[tokio::test]
async fn intent_lands_in_persisted_metadata_with_its_source() {
    let harness = TestHarness::new().await;
    harness
        .pipeline
        .process_turn(harness.turn(
            "conv-meta",
            "how do I install a ceiling fan myself",
            ConversationMode::Chat,
        ))
        .await
        .unwrap();

    let messages = harness.store.get_messages("conv-meta", None).await.unwrap();
    let meta = messages[1].metadata.as_ref().unwrap();
    assert_eq!(meta.intent, Some(hearth_core::Intent::DiyGuide));
    assert_eq!(
        meta.intent_source,
        Some(hearth_core::types::IntentSource::Keyword)
    );
    assert!(meta.intent_confidence.is_some());
}
