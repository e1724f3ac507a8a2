// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hearth.toml` > `~/.config/hearth/hearth.toml` > `/etc/hearth/hearth.toml`
//! with environment variable overrides via `HEARTH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HearthConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hearth/hearth.toml` (system-wide)
/// 3. `~/.config/hearth/hearth.toml` (user XDG config)
/// 4. `./hearth.toml` (local directory)
/// 5. `HEARTH_*` environment variables
pub fn load_config() -> Result<HearthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::file("/etc/hearth/hearth.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hearth/hearth.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hearth.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HearthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HearthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HEARTH_GENERATION_API_KEY` must map to
/// `generation.api_key`, not `generation.api.key`.
fn env_provider() -> Env {
    Env::prefixed("HEARTH_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: HEARTH_GENERATION_API_KEY -> "generation_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("image_", "image.", 1)
            .replacen("search_", "search.", 1)
            .replacen("maps_", "maps.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("pipeline_", "pipeline.", 1)
            .replacen("server_", "server.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "hearth");
        assert_eq!(config.pipeline.suggestion_window_k, 4);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[agent]
name = "hearth-staging"

[pipeline]
per_tool_timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.agent.name, "hearth-staging");
        assert_eq!(config.pipeline.per_tool_timeout_secs, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.pipeline.enrichment_timeout_secs, 20);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
[agent]
naem = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
