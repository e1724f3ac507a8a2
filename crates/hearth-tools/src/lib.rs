// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP tool adapters for the Hearth enrichment capabilities.
//!
//! Each adapter owns its own reqwest client and maps failures into
//! `HearthError::Tool`, which the enricher absorbs without failing the turn.
//! Empty result sets are legitimate results, not errors.

pub mod image;
pub mod maps;
pub mod search;

pub use image::HttpImageGeneration;
pub use maps::HttpContractorLookup;
pub use search::HttpGroundingSearch;
