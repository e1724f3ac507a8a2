// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all capability adapters must implement.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::types::{AdapterKind, HealthStatus};

/// The base trait for all Hearth capability adapters.
///
/// Every adapter (generation, image, search, maps, index, storage) implements
/// this trait, which provides identity, lifecycle, and health checks.
#[async_trait]
pub trait CapabilityAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of capability this adapter provides.
    fn kind(&self) -> AdapterKind;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, HearthError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), HearthError>;
}
