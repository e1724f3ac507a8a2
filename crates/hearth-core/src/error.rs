// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hearth assistant backend.

use thiserror::Error;

/// The primary error type used across all Hearth capability traits and core operations.
///
/// Only two variants ever surface to the caller of a turn: [`HearthError::Validation`]
/// (the input must be corrected) and [`HearthError::Storage`] (the turn's commit
/// failed and nothing was persisted). Every other variant is absorbed inside the
/// pipeline and reflected as reduced content.
#[derive(Debug, Error)]
pub enum HearthError {
    /// Input validation failure. Names the violated constraint so the caller
    /// can correct the input.
    #[error("validation error ({constraint}): {message}")]
    Validation {
        constraint: &'static str,
        message: String,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence backend errors (database connection, query failure, rollback).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Text/vision generation capability errors (API failure, token limits).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single enrichment tool failed. Never fatal to a turn.
    #[error("tool error ({tool}): {message}")]
    Tool { tool: String, message: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HearthError {
    /// Convenience constructor for validation failures.
    pub fn validation(constraint: &'static str, message: impl Into<String>) -> Self {
        HearthError::Validation {
            constraint,
            message: message.into(),
        }
    }

    /// True if this error must surface to the caller as a hard failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HearthError::Validation { .. } | HearthError::Storage { .. }
        )
    }
}
