// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock knowledge index with fixed snippets.

use std::sync::Mutex;

use async_trait::async_trait;

use hearth_core::types::{AdapterKind, HealthStatus, HomeScope, Snippet};
use hearth_core::{CapabilityAdapter, HearthError, KnowledgeIndex};

/// A knowledge index returning a fixed snippet list regardless of query.
pub struct MockIndex {
    snippets: Mutex<Vec<Snippet>>,
}

impl MockIndex {
    /// Create an empty index (the degraded-to-generic case).
    pub fn empty() -> Self {
        Self {
            snippets: Mutex::new(vec![]),
        }
    }

    /// Create an index that always returns the given snippets.
    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets: Mutex::new(snippets),
        }
    }

    pub fn set_snippets(&self, snippets: Vec<Snippet>) {
        *self.snippets.lock().expect("snippets lock") = snippets;
    }
}

#[async_trait]
impl CapabilityAdapter for MockIndex {
    fn name(&self) -> &str {
        "mock-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HearthError> {
        Ok(())
    }
}

#[async_trait]
impl KnowledgeIndex for MockIndex {
    async fn query(
        &self,
        _scope: &HomeScope,
        _text: &str,
        limit: usize,
    ) -> Result<Vec<Snippet>, HearthError> {
        let snippets = self.snippets.lock().expect("snippets lock");
        Ok(snippets.iter().take(limit).cloned().collect())
    }
}
