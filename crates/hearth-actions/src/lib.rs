// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up actions for the Hearth assistant backend.
//!
//! Three concerns live here: the closed action taxonomy, the anti-repetition
//! suggestion computation, and the action resolver (a separate entry point
//! from the turn pipeline that executes a named action against accumulated
//! conversation state).

pub mod resolver;
pub mod slots;
pub mod suggester;
pub mod taxonomy;

pub use resolver::{ActionContext, ActionResolution, ActionResolver};
pub use slots::SlotState;
pub use suggester::{suggest, SuggestionSet};
pub use taxonomy::{spec, ActionId, ActionSpec, ParamSpec, CATALOG};
