// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hearth integration tests.
//!
//! Queue-scripted mock capabilities with failure/delay injection, plus a
//! [`TestHarness`] that wires a full pipeline over a tempdir database.

pub mod harness;
pub mod mock_generation;
pub mod mock_index;
pub mod mock_tools;

pub use harness::TestHarness;
pub use mock_generation::{MockGeneration, ScriptedReply};
pub use mock_index::MockIndex;
pub use mock_tools::{MockContractorLookup, MockImageGeneration, MockSearch};
