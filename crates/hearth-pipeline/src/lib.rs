// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn-processing pipeline for the Hearth assistant backend.
//!
//! The [`TurnPipeline`] walks a fixed stage order -- validate, classify,
//! retrieve, load history, generate, enrich, manage journey, suggest,
//! persist, finalize -- with single-flight ordering per conversation,
//! a single fan-out point (enrichment), streaming reply chunks, and an
//! all-or-nothing persistence boundary.

pub mod classify;
pub mod enrich;
pub mod generate;
pub mod history;
pub mod journey;
pub mod pipeline;
pub mod validate;

pub use classify::{Classification, IntentClassifier, KeywordClassifier, ModelClassifier, TieredClassifier};
pub use enrich::{Enricher, EnricherConfig, ToolKind};
pub use generate::{GeneratedReply, ResponseGenerator, FALLBACK_REPLY};
pub use pipeline::{PipelineDeps, TurnPipeline, TurnStage};
pub use validate::{validate, NormalizedTurn};
