// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rolling suggestion-window reads.
//!
//! Window rows are written through the turn commit transaction; this module
//! only reads the last K turns' emitted ids.

use hearth_core::types::SuggestionWindow;
use hearth_core::HearthError;
use rusqlite::params;

use crate::database::Database;

/// Returns the suggestion ids emitted over the last `k` turns of a
/// conversation.
pub async fn suggestion_window(
    db: &Database,
    conversation_id: &str,
    k: usize,
) -> Result<SuggestionWindow, HearthError> {
    let conversation_id = conversation_id.to_string();
    let k = k as i64;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT item_kind, item_id FROM suggestion_history
                 WHERE conversation_id = ?1 AND turn_seq IN (
                     SELECT DISTINCT turn_seq FROM suggestion_history
                     WHERE conversation_id = ?1
                     ORDER BY turn_seq DESC LIMIT ?2
                 )
                 ORDER BY turn_seq DESC",
            )?;
            let rows = stmt.query_map(params![conversation_id, k], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut window = SuggestionWindow::default();
            for row in rows {
                let (kind, id) = row?;
                match kind.as_str() {
                    "action" => window.action_ids.push(id),
                    "question" => window.question_ids.push(id),
                    _ => {}
                }
            }
            Ok(window)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
