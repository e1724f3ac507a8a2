// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message read operations.
//!
//! Messages are only ever written through the turn commit transaction in
//! `turn_writer`; this module is read-only.

use hearth_core::HearthError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Message;
use crate::queries::{from_json, parse_enum};

pub(crate) fn message_from_row(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        seq: row.get(2)?,
        role: parse_enum(3, row.get::<_, String>(3)?)?,
        content: row.get(4)?,
        metadata: from_json(5, row.get::<_, Option<String>>(5)?)?,
        created_at: row.get(6)?,
    })
}

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, conversation_id, seq, role, content, metadata, created_at";

/// Get messages for a conversation in chronological (seq) order.
///
/// With a limit, returns the most recent `limit` messages, still in
/// chronological order.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, HearthError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM (
                             SELECT {MESSAGE_COLUMNS} FROM messages
                             WHERE conversation_id = ?1
                             ORDER BY seq DESC LIMIT ?2
                         ) ORDER BY seq ASC"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id, lim], message_from_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1 ORDER BY seq ASC"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id], message_from_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
