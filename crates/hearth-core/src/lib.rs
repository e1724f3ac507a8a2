// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hearth assistant backend.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain model used throughout the Hearth workspace. All capability
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HearthError;
pub use types::{AdapterKind, HealthStatus, Identity, Intent};

// Re-export all capability traits at crate root.
pub use traits::{
    CapabilityAdapter, ContractorLookup, GroundingSearch, ImageGeneration, KnowledgeIndex,
    TextGeneration, TurnStore,
};
