// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Every function accepts `&Database` and runs its
//! SQL through the single background writer thread.

pub mod attachments;
pub mod conversations;
pub mod journeys;
pub mod messages;
pub mod suggestions;

use std::str::FromStr;

/// Parse a TEXT column into a strum enum, mapping failures into a rusqlite
/// conversion error so they surface through the normal error path.
pub(crate) fn parse_enum<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Serialize a value into a JSON TEXT column.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Deserialize an optional JSON TEXT column.
pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    value: Option<String>,
) -> Result<Option<T>, rusqlite::Error> {
    match value {
        None => Ok(None),
        Some(s) => serde_json::from_str(&s).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
    }
}
