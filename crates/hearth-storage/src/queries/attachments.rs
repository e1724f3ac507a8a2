// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment read operations.
//!
//! Attachments are written through the turn commit transaction; this module
//! is read-only.

use hearth_core::HearthError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Attachment;
use crate::queries::{from_json, parse_enum};

pub(crate) fn attachment_from_row(row: &rusqlite::Row<'_>) -> Result<Attachment, rusqlite::Error> {
    Ok(Attachment {
        id: row.get(0)?,
        message_id: row.get(1)?,
        kind: parse_enum(2, row.get::<_, String>(2)?)?,
        storage_ref: row.get(3)?,
        content_type: row.get(4)?,
        provenance: parse_enum(5, row.get::<_, String>(5)?)?,
        analysis: from_json(6, row.get::<_, Option<String>>(6)?)?,
        journey_step_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub(crate) const ATTACHMENT_COLUMNS: &str =
    "id, message_id, kind, storage_ref, content_type, provenance, analysis, journey_step_id, created_at";

/// Get all attachments owned by a message.
pub async fn get_attachments_for_message(
    db: &Database,
    message_id: &str,
) -> Result<Vec<Attachment>, HearthError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ATTACHMENT_COLUMNS} FROM attachments
                 WHERE message_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![message_id], attachment_from_row)?;
            let mut attachments = Vec::new();
            for row in rows {
                attachments.push(row?);
            }
            Ok(attachments)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get all attachments linked to a journey step.
pub async fn get_attachments_for_step(
    db: &Database,
    journey_step_id: &str,
) -> Result<Vec<Attachment>, HearthError> {
    let journey_step_id = journey_step_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ATTACHMENT_COLUMNS} FROM attachments
                 WHERE journey_step_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![journey_step_id], attachment_from_row)?;
            let mut attachments = Vec::new();
            for row in rows {
                attachments.push(row?);
            }
            Ok(attachments)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
