// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web/product grounding search capability trait.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::SearchHit;

/// Adapter for the web/product grounding search capability.
///
/// Video-tutorial lookup is a filtered invocation of this capability (query
/// suffix plus a site filter), not a separate index.
#[async_trait]
pub trait GroundingSearch: CapabilityAdapter {
    /// Searches the web/product index. May legitimately return no hits.
    async fn search(
        &self,
        query: &str,
        region_hint: Option<&str>,
    ) -> Result<Vec<SearchHit>, HearthError>;
}
