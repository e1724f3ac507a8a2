// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image generation capability trait.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::adapter::CapabilityAdapter;
use crate::types::ImageLocator;

/// Adapter for the image generation capability.
#[async_trait]
pub trait ImageGeneration: CapabilityAdapter {
    /// Generates one or more images for a prompt, optionally in a named style.
    ///
    /// May fail or time out; callers wrap each invocation in its own timeout
    /// and error boundary.
    async fn generate_image(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<Vec<ImageLocator>, HearthError>;
}
