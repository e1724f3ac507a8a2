// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn commit transaction.
//!
//! One turn persists the user message, the assistant message with its
//! metadata, the turn's attachments, the journey step linkage, and the
//! suggestion-window rows -- all inside a single transaction. Either the
//! whole set commits or none of it does.
//!
//! Sequence numbers are allocated here, inside the transaction, which
//! together with the single-flight-per-conversation ordering upstream
//! guarantees strictly increasing, gapless `seq` values.

use hearth_core::traits::{CommittedTurn, TurnCommit};
use hearth_core::HearthError;
use rusqlite::params;
use thiserror::Error;
use tracing::debug;

use crate::database::Database;
use crate::queries::to_json;

/// Invariant violations detected inside the commit transaction. Any of
/// these rolls the whole turn back.
#[derive(Debug, Error)]
enum CommitViolation {
    #[error("journey step {0} does not exist")]
    StepMissing(String),
    #[error("journey step {0} is not in progress")]
    StepNotInProgress(String),
}

/// Atomically persist one turn. Returns the allocated sequence numbers.
pub async fn commit_turn(
    db: &Database,
    commit: TurnCommit,
) -> Result<CommittedTurn, HearthError> {
    let committed = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let c = &commit.conversation;

            // The conversation row is created on the first turn and updated
            // on every later one; both happen inside this transaction.
            tx.execute(
                "INSERT INTO conversations (id, persona, scenario, home_id, room_id, mode, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                     persona = excluded.persona,
                     scenario = excluded.scenario,
                     home_id = excluded.home_id,
                     room_id = excluded.room_id,
                     mode = excluded.mode,
                     status = excluded.status,
                     updated_at = excluded.updated_at",
                params![
                    c.id,
                    c.persona.to_string(),
                    c.scenario.to_string(),
                    c.scope.home_id,
                    c.scope.room_id,
                    c.mode.to_string(),
                    c.status.to_string(),
                    c.created_at,
                    c.updated_at,
                ],
            )?;

            let user_seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = ?1",
                params![c.id],
                |row| row.get(0),
            )?;
            let assistant_seq = user_seq + 1;

            let user = &commit.user_message;
            tx.execute(
                "INSERT INTO messages (id, conversation_id, seq, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.conversation_id,
                    user_seq,
                    user.role.to_string(),
                    user.content,
                    user.metadata.as_ref().map(to_json).transpose()?,
                    user.created_at,
                ],
            )?;

            let assistant = &commit.assistant_message;
            tx.execute(
                "INSERT INTO messages (id, conversation_id, seq, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    assistant.id,
                    assistant.conversation_id,
                    assistant_seq,
                    assistant.role.to_string(),
                    assistant.content,
                    assistant.metadata.as_ref().map(to_json).transpose()?,
                    assistant.created_at,
                ],
            )?;

            for a in &commit.attachments {
                tx.execute(
                    "INSERT INTO attachments (id, message_id, kind, storage_ref, content_type, provenance, analysis, journey_step_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        a.id,
                        a.message_id,
                        a.kind.to_string(),
                        a.storage_ref,
                        a.content_type,
                        a.provenance.to_string(),
                        a.analysis.as_ref().map(to_json).transpose()?,
                        a.journey_step_id,
                        a.created_at,
                    ],
                )?;
            }

            // Journey linkage: re-check the single-current-step invariant
            // under the transaction before mutating.
            if let Some(ja) = &commit.journey_attach {
                let status: String = tx
                    .query_row(
                        "SELECT status FROM journey_steps WHERE id = ?1",
                        params![ja.step_id],
                        |row| row.get(0),
                    )
                    .map_err(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => {
                            rusqlite::Error::UserFunctionError(Box::new(
                                CommitViolation::StepMissing(ja.step_id.clone()),
                            ))
                        }
                        other => other,
                    })?;
                if status != "in_progress" {
                    return Err(rusqlite::Error::UserFunctionError(Box::new(
                        CommitViolation::StepNotInProgress(ja.step_id.clone()),
                    ))
                    .into());
                }
                for attachment_id in &ja.attachment_ids {
                    tx.execute(
                        "UPDATE attachments SET journey_step_id = ?1 WHERE id = ?2",
                        params![ja.step_id, attachment_id],
                    )?;
                }
            }

            for action_id in &commit.emitted_action_ids {
                tx.execute(
                    "INSERT INTO suggestion_history (conversation_id, turn_seq, item_kind, item_id)
                     VALUES (?1, ?2, 'action', ?3)",
                    params![c.id, assistant_seq, action_id],
                )?;
            }
            for question_id in &commit.emitted_question_ids {
                tx.execute(
                    "INSERT INTO suggestion_history (conversation_id, turn_seq, item_kind, item_id)
                     VALUES (?1, ?2, 'question', ?3)",
                    params![c.id, assistant_seq, question_id],
                )?;
            }

            tx.commit()?;
            Ok(CommittedTurn {
                user_seq,
                assistant_seq,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    debug!(
        user_seq = committed.user_seq,
        assistant_seq = committed.assistant_seq,
        "turn committed"
    );
    Ok(committed)
}
