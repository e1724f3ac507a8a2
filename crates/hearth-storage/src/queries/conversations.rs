// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use hearth_core::types::HomeScope;
use hearth_core::HearthError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Conversation;
use crate::queries::parse_enum;

pub(crate) fn conversation_from_row(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        persona: parse_enum(1, row.get::<_, String>(1)?)?,
        scenario: parse_enum(2, row.get::<_, String>(2)?)?,
        scope: HomeScope {
            home_id: row.get(3)?,
            room_id: row.get(4)?,
        },
        mode: parse_enum(5, row.get::<_, String>(5)?)?,
        status: parse_enum(6, row.get::<_, String>(6)?)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const CONVERSATION_COLUMNS: &str =
    "id, persona, scenario, home_id, room_id, mode, status, created_at, updated_at";

/// Create a new conversation.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), HearthError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, persona, scenario, home_id, room_id, mode, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
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
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, HearthError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], conversation_from_row);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List conversations, optionally filtered by status.
pub async fn list_conversations(
    db: &Database,
    status: Option<&str>,
) -> Result<Vec<Conversation>, HearthError> {
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let mut conversations = Vec::new();
            match &status {
                Some(status_filter) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE status = ?1 ORDER BY updated_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![status_filter], conversation_from_row)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations ORDER BY updated_at DESC"
                    ))?;
                    let rows = stmt.query_map([], conversation_from_row)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
            }
            Ok(conversations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Archive a conversation. Conversations are never deleted.
pub async fn close_conversation(db: &Database, id: &str) -> Result<(), HearthError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET status = 'closed', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
