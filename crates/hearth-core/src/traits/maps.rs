// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps/contractor lookup capability trait.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::ContractorHit;

/// Adapter for the maps/contractor lookup capability.
#[async_trait]
pub trait ContractorLookup: CapabilityAdapter {
    /// Finds contractors for a job type near a location. May return no hits.
    async fn find_nearby(
        &self,
        job_type: &str,
        location: &str,
    ) -> Result<Vec<ContractorHit>, HearthError>;
}
