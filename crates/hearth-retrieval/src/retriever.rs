// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped retriever implementing the knowledge index capability.
//!
//! Tolerates a missing or empty index: both degrade to an empty snippet
//! list so the rest of the pipeline falls back to generic behavior.

use std::sync::Arc;

use async_trait::async_trait;
use hearth_config::model::RetrievalConfig;
use hearth_core::types::{HomeScope, Snippet};
use hearth_core::{
    AdapterKind, CapabilityAdapter, HealthStatus, HearthError, KnowledgeIndex,
};
use tracing::{debug, warn};

use crate::store::KnowledgeStore;

/// Knowledge index over the FTS5 snippet store.
pub struct ScopedRetriever {
    store: Option<Arc<KnowledgeStore>>,
    max_snippets: usize,
}

impl ScopedRetriever {
    /// Opens the retriever over the configured index path.
    ///
    /// An index that cannot be opened is tolerated: the retriever runs with
    /// no store and every query returns an empty list.
    pub async fn open(config: &RetrievalConfig) -> Self {
        let store = match KnowledgeStore::open(&config.index_path).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, path = %config.index_path, "knowledge index unavailable, retrieval disabled");
                None
            }
        };
        Self {
            store,
            max_snippets: config.max_snippets,
        }
    }

    /// Builds a retriever over an already-open store (for tests and tools).
    pub fn with_store(store: Arc<KnowledgeStore>, max_snippets: usize) -> Self {
        Self {
            store: Some(store),
            max_snippets,
        }
    }
}

/// Turns free text into an FTS5 MATCH query: alphanumeric terms, quoted,
/// OR-joined. Returns `None` when no searchable terms remain.
fn build_match_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(|t| format!("\"{}\"", t.to_lowercase()))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

#[async_trait]
impl CapabilityAdapter for ScopedRetriever {
    fn name(&self) -> &str {
        "fts-retriever"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
        match &self.store {
            Some(_) => Ok(HealthStatus::Healthy),
            None => Ok(HealthStatus::Degraded("index unavailable".into())),
        }
    }

    async fn shutdown(&self) -> Result<(), HearthError> {
        Ok(())
    }
}

#[async_trait]
impl KnowledgeIndex for ScopedRetriever {
    async fn query(
        &self,
        scope: &HomeScope,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Snippet>, HearthError> {
        let Some(store) = &self.store else {
            return Ok(vec![]);
        };
        let Some(match_query) = build_match_query(text) else {
            return Ok(vec![]);
        };

        let limit = limit.min(self.max_snippets);
        let results = store.search_bm25(scope, &match_query, limit).await?;

        debug!(snippets = results.len(), "knowledge retrieval complete");

        Ok(results
            .into_iter()
            .map(|(record, score)| Snippet {
                id: record.id,
                title: record.title,
                text: record.content,
                score,
            })
            .collect())
    }
}
