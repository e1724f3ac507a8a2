// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input validation, the only stage whose failure is synchronous and fatal.
//!
//! Every rejection names the violated constraint so the caller knows what
//! to correct.

use hearth_config::model::PipelineConfig;
use hearth_core::types::IncomingAttachment;
use hearth_core::HearthError;

/// A validated, normalized turn input.
#[derive(Debug, Clone)]
pub struct NormalizedTurn {
    /// Trimmed message text, guaranteed non-empty.
    pub text: String,
    pub attachments: Vec<IncomingAttachment>,
}

/// Validate raw turn input against the configured bounds.
pub fn validate(
    text: &str,
    attachments: Vec<IncomingAttachment>,
    config: &PipelineConfig,
) -> Result<NormalizedTurn, HearthError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(HearthError::validation(
            "text.non_empty",
            "message text must not be empty",
        ));
    }
    if trimmed.chars().count() > config.max_text_len {
        return Err(HearthError::validation(
            "text.max_len",
            format!(
                "message text exceeds {} characters",
                config.max_text_len
            ),
        ));
    }

    if attachments.len() > config.max_attachments {
        return Err(HearthError::validation(
            "attachments.max_count",
            format!("at most {} attachments per turn", config.max_attachments),
        ));
    }
    for attachment in &attachments {
        if attachment.size_bytes > config.max_attachment_bytes {
            return Err(HearthError::validation(
                "attachments.max_size",
                format!(
                    "attachment {} exceeds {} bytes",
                    attachment.storage_ref, config.max_attachment_bytes
                ),
            ));
        }
        if !config
            .allowed_content_types
            .iter()
            .any(|t| t == &attachment.content_type)
        {
            return Err(HearthError::validation(
                "attachments.content_type",
                format!("content type {} is not allowed", attachment.content_type),
            ));
        }
    }

    Ok(NormalizedTurn {
        text: trimmed.to_string(),
        attachments,
    })
}
