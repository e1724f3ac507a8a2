// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge index capability trait.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::{HomeScope, Snippet};

/// Adapter for the indexed knowledge store.
///
/// An empty or missing index returns an empty list, never an error -- the
/// pipeline degrades gracefully to generic behavior.
#[async_trait]
pub trait KnowledgeIndex: CapabilityAdapter {
    /// Returns a ranked, size-bounded list of snippets relevant to the query
    /// within the given home/room scope.
    async fn query(
        &self,
        scope: &HomeScope,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Snippet>, HearthError>;
}
