// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History loading bounded by a character budget.
//!
//! The budget approximates tokens at roughly four characters per token.
//! Messages are kept newest-first until the budget would overflow, then
//! returned in chronological order. Read-only; never mutates the store.

use hearth_core::types::Message;
use hearth_core::{HearthError, TurnStore};
use tracing::debug;

/// Upper bound on rows fetched before budget trimming.
const FETCH_LIMIT: i64 = 50;

/// Load the most recent messages of a conversation that fit in
/// `char_budget`, oldest first.
pub async fn load_history(
    store: &dyn TurnStore,
    conversation_id: &str,
    char_budget: usize,
) -> Result<Vec<Message>, HearthError> {
    let messages = store
        .get_messages(conversation_id, Some(FETCH_LIMIT))
        .await?;
    let trimmed = trim_to_budget(messages, char_budget);
    debug!(
        conversation_id = conversation_id,
        kept = trimmed.len(),
        "history loaded"
    );
    Ok(trimmed)
}

/// Keep the newest messages whose combined content fits the budget, in
/// chronological order. The newest message is always kept even if it alone
/// exceeds the budget.
pub fn trim_to_budget(messages: Vec<Message>, char_budget: usize) -> Vec<Message> {
    let mut kept = Vec::new();
    let mut used = 0usize;

    for message in messages.into_iter().rev() {
        let len = message.content.chars().count();
        if !kept.is_empty() && used + len > char_budget {
            break;
        }
        used += len;
        kept.push(message);
    }

    kept.reverse();
    kept
}
