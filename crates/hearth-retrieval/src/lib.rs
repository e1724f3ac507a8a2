// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped knowledge retrieval for the Hearth assistant backend.
//!
//! An FTS5-backed snippet store plus a retriever implementing the
//! `KnowledgeIndex` capability. Missing or empty indexes degrade to empty
//! results rather than errors.

pub mod retriever;
pub mod store;

pub use retriever::ScopedRetriever;
pub use store::{KnowledgeStore, SnippetRecord};
