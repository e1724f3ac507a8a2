// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Hearth assistant backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed query modules, and the
//! all-or-nothing turn commit transaction.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod turn_writer;

pub use adapter::SqliteTurnStore;
pub use database::Database;
pub use models::*;
