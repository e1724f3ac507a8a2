// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hearth assistant backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Hearth configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Text/vision generation capability settings (Anthropic API).
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Image generation capability settings.
    #[serde(default)]
    pub image: ImageConfig,

    /// Web/product grounding search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Maps/contractor lookup settings.
    #[serde(default)]
    pub maps: MapsConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Knowledge index retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Turn pipeline tunables.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "hearth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Text/vision generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for reply generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model for cheap constrained calls (intent classification).
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            classifier_model: default_classifier_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_classifier_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Image generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Endpoint of the image generation service.
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    /// API key. `None` disables the capability.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Number of images to request per prompt.
    #[serde(default = "default_image_count")]
    pub count: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_image_endpoint(),
            api_key: None,
            count: default_image_count(),
        }
    }
}

fn default_image_endpoint() -> String {
    "https://api.imagine.example.com/v1/generations".to_string()
}

fn default_image_count() -> u8 {
    1
}

/// Web/product grounding search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Endpoint of the search service.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// API key. `None` disables the capability.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum hits to keep per query.
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,

    /// Site filter applied when searching for video tutorials.
    #[serde(default = "default_video_site_filter")]
    pub video_site_filter: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: None,
            max_hits: default_max_hits(),
            video_site_filter: default_video_site_filter(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://api.grounding.example.com/v1/search".to_string()
}

fn default_max_hits() -> usize {
    5
}

fn default_video_site_filter() -> String {
    "site:youtube.com".to_string()
}

/// Maps/contractor lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MapsConfig {
    /// Endpoint of the places service.
    #[serde(default = "default_maps_endpoint")]
    pub endpoint: String,

    /// API key. `None` disables the capability.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Location used when the conversation carries no location of its own.
    #[serde(default = "default_location")]
    pub default_location: String,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_maps_endpoint(),
            api_key: None,
            default_location: default_location(),
        }
    }
}

fn default_maps_endpoint() -> String {
    "https://api.places.example.com/v1/nearby".to_string()
}

fn default_location() -> String {
    "Austin, TX".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("hearth").join("hearth.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("hearth.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Knowledge index retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Path to the SQLite knowledge index. Empty/missing index is tolerated.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Maximum snippets returned per query.
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            max_snippets: default_max_snippets(),
        }
    }
}

fn default_index_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("hearth").join("knowledge.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("knowledge.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_max_snippets() -> usize {
    6
}

/// Turn pipeline tunables.
///
/// Timeout and window values are deliberate conservative defaults: the
/// per-tool timeout is smaller than the overall enrichment timeout, which is
/// smaller than the defensive whole-turn timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Maximum message text length in characters.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Maximum attachments per turn.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,

    /// Maximum size of a single attachment in bytes.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,

    /// Allowed attachment content types.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,

    /// Character budget for loaded history (oldest messages dropped first).
    #[serde(default = "default_history_char_budget")]
    pub history_char_budget: usize,

    /// Retries for a failed generation call (after the first attempt).
    #[serde(default = "default_generation_retries")]
    pub generation_retries: u32,

    /// Timeout for a single enrichment tool call, in seconds.
    #[serde(default = "default_per_tool_timeout_secs")]
    pub per_tool_timeout_secs: u64,

    /// Overall enrichment fan-in timeout, in seconds. Must exceed the
    /// per-tool timeout.
    #[serde(default = "default_enrichment_timeout_secs")]
    pub enrichment_timeout_secs: u64,

    /// Defensive whole-turn timeout, in seconds.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Rolling anti-repetition window: suggestion ids emitted in the last K
    /// turns are not offered again.
    #[serde(default = "default_suggestion_window_k")]
    pub suggestion_window_k: usize,

    /// Maximum suggested actions (and clarifying questions) per turn.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_text_len: default_max_text_len(),
            max_attachments: default_max_attachments(),
            max_attachment_bytes: default_max_attachment_bytes(),
            allowed_content_types: default_allowed_content_types(),
            history_char_budget: default_history_char_budget(),
            generation_retries: default_generation_retries(),
            per_tool_timeout_secs: default_per_tool_timeout_secs(),
            enrichment_timeout_secs: default_enrichment_timeout_secs(),
            turn_timeout_secs: default_turn_timeout_secs(),
            suggestion_window_k: default_suggestion_window_k(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_max_text_len() -> usize {
    4_000
}

fn default_max_attachments() -> usize {
    4
}

fn default_max_attachment_bytes() -> u64 {
    8 * 1024 * 1024
}

fn default_allowed_content_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
        "application/pdf".to_string(),
    ]
}

fn default_history_char_budget() -> usize {
    12_000
}

fn default_generation_retries() -> u32 {
    1
}

fn default_per_tool_timeout_secs() -> u64 {
    10
}

fn default_enrichment_timeout_secs() -> u64 {
    20
}

fn default_turn_timeout_secs() -> u64 {
    120
}

fn default_suggestion_window_k() -> usize {
    4
}

fn default_max_suggestions() -> usize {
    3
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for auth. `None` disables authentication.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7420
}
