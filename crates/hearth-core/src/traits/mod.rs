// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for Hearth adapters.

pub mod adapter;
pub mod generation;
pub mod image;
pub mod index;
pub mod maps;
pub mod search;
pub mod store;

pub use adapter::CapabilityAdapter;
pub use generation::TextGeneration;
pub use image::ImageGeneration;
pub use index::KnowledgeIndex;
pub use maps::ContractorLookup;
pub use search::GroundingSearch;
pub use store::{CommittedTurn, JourneyAttach, TurnCommit, TurnStore};
