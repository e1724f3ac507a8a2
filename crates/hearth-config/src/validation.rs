// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as timeout ordering and non-empty paths. Collects all
//! errors rather than failing fast.

use crate::diagnostic::ConfigError;
use crate::model::HearthConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// every collected validation error.
pub fn validate_config(config: &HearthConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    let p = &config.pipeline;

    if p.max_text_len == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.max_text_len must be positive".to_string(),
        });
    }

    if p.suggestion_window_k == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.suggestion_window_k must be at least 1".to_string(),
        });
    }

    if p.max_suggestions == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.max_suggestions must be at least 1".to_string(),
        });
    }

    // The enrichment fan-in timeout must exceed any single tool timeout, and
    // the defensive turn timeout must bound both.
    if p.enrichment_timeout_secs <= p.per_tool_timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "pipeline.enrichment_timeout_secs ({}) must exceed pipeline.per_tool_timeout_secs ({})",
                p.enrichment_timeout_secs, p.per_tool_timeout_secs
            ),
        });
    }

    if p.turn_timeout_secs <= p.enrichment_timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "pipeline.turn_timeout_secs ({}) must exceed pipeline.enrichment_timeout_secs ({})",
                p.turn_timeout_secs, p.enrichment_timeout_secs
            ),
        });
    }

    if p.allowed_content_types.is_empty() {
        errors.push(ConfigError::Validation {
            message: "pipeline.allowed_content_types must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
