// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! valid key listings, and renders collected errors to stderr.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(hearth::config::unknown_key),
        help("valid keys: {valid_keys}")
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid value for key `{key}`: {detail}")]
    #[diagnostic(code(hearth::config::invalid_value))]
    InvalidValue {
        /// The key with the bad value.
        key: String,
        /// Description of the mismatch.
        detail: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(hearth::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(hearth::config::other))]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may contain multiple underlying errors; all are converted
/// so the user sees every problem at once.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let key = error.path.join(".");
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                key: if key.is_empty() {
                    field.clone()
                } else {
                    format!("{key}.{field}")
                },
                valid_keys: expected.to_vec().join(", "),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidValue {
                key,
                detail: format!("found {actual}, expected {expected}"),
            },
            Kind::InvalidValue(actual, expected) => ConfigError::InvalidValue {
                key,
                detail: format!("found {actual}, expected {expected}"),
            },
            other => ConfigError::Other(other.to_string()),
        };
        errors.push(config_error);
    }

    errors
}

/// Render all collected errors to stderr via miette's fancy reporter.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::msg(error.to_string()));
    }
    eprintln!(
        "hearth: {} configuration error(s), startup aborted",
        errors.len()
    );
}
