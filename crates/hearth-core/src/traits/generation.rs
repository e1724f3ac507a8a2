// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text/vision generation capability trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::{GenerationEvent, GenerationRequest, GenerationResponse};

/// Adapter for the text/vision generation capability.
///
/// Supports both single-shot completion (used by the intent classifier and
/// the action resolver) and streaming (used by the response generator).
/// Calls may fail or time out; the pipeline owns retry policy.
#[async_trait]
pub trait TextGeneration: CapabilityAdapter {
    /// Sends a generation request and returns the full response.
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, HearthError>;

    /// Sends a generation request and returns a stream of incremental events.
    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<GenerationEvent, HearthError>> + Send>>,
        HearthError,
    >;
}
