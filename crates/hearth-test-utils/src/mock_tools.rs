// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock enrichment tools with failure and delay injection.
//!
//! Each mock counts its calls and can be flipped into failing or slow
//! behavior at runtime, which is what the partial-failure and mode-gating
//! tests need.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use hearth_core::types::{
    AdapterKind, ContractorHit, HealthStatus, ImageLocator, SearchHit,
};
use hearth_core::{
    CapabilityAdapter, ContractorLookup, GroundingSearch, HearthError, ImageGeneration,
};

/// Shared behavior knobs for a mock tool.
struct ToolKnobs {
    fail: AtomicBool,
    delay_ms: AtomicU64,
    calls: AtomicU32,
}

impl ToolKnobs {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            calls: AtomicU32::new(0),
        }
    }

    async fn enter(&self, tool: &'static str) -> Result<(), HearthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(HearthError::Tool {
                tool: tool.into(),
                message: "scripted tool failure".into(),
            });
        }
        Ok(())
    }
}

macro_rules! knob_methods {
    () => {
        /// Number of calls made so far.
        pub fn calls(&self) -> u32 {
            self.knobs.calls.load(Ordering::SeqCst)
        }

        /// Make every subsequent call fail.
        pub fn set_failing(&self, failing: bool) {
            self.knobs.fail.store(failing, Ordering::SeqCst);
        }

        /// Delay every subsequent call by `ms` milliseconds.
        pub fn set_delay_ms(&self, ms: u64) {
            self.knobs.delay_ms.store(ms, Ordering::SeqCst);
        }
    };
}

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl CapabilityAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }
            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }
            fn kind(&self) -> AdapterKind {
                $kind
            }
            async fn health_check(&self) -> Result<HealthStatus, HearthError> {
                Ok(HealthStatus::Healthy)
            }
            async fn shutdown(&self) -> Result<(), HearthError> {
                Ok(())
            }
        }
    };
}

// --- Image generation ---

/// Mock image generation returning configurable locators.
pub struct MockImageGeneration {
    knobs: ToolKnobs,
    locators: Mutex<Vec<ImageLocator>>,
}

impl MockImageGeneration {
    pub fn new() -> Self {
        Self {
            knobs: ToolKnobs::new(),
            locators: Mutex::new(vec![ImageLocator {
                url: "https://cdn.test/render-1.png".into(),
                content_type: Some("image/png".into()),
            }]),
        }
    }

    /// Replace the locators returned by subsequent calls.
    pub fn set_locators(&self, locators: Vec<ImageLocator>) {
        *self.locators.lock().expect("locators lock") = locators;
    }

    knob_methods!();
}

impl Default for MockImageGeneration {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockImageGeneration, "mock-image", AdapterKind::Image);

#[async_trait]
impl ImageGeneration for MockImageGeneration {
    async fn generate_image(
        &self,
        _prompt: &str,
        _style: Option<&str>,
    ) -> Result<Vec<ImageLocator>, HearthError> {
        self.knobs.enter("image_generation").await?;
        Ok(self.locators.lock().expect("locators lock").clone())
    }
}

// --- Grounding search ---

/// Mock search returning configurable hits. The last query is recorded so
/// tests can assert on video-filter parameterization.
pub struct MockSearch {
    knobs: ToolKnobs,
    hits: Mutex<Vec<SearchHit>>,
    last_query: Mutex<Option<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            knobs: ToolKnobs::new(),
            hits: Mutex::new(vec![SearchHit {
                title: "Interior paint, 1 gal".into(),
                url: "https://shop.test/p1".into(),
                price: Some("$34.99".into()),
                source: "shop.test".into(),
            }]),
            last_query: Mutex::new(None),
        }
    }

    pub fn set_hits(&self, hits: Vec<SearchHit>) {
        *self.hits.lock().expect("hits lock") = hits;
    }

    /// The most recent query string, if any call was made.
    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().expect("query lock").clone()
    }

    knob_methods!();
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockSearch, "mock-search", AdapterKind::Search);

#[async_trait]
impl GroundingSearch for MockSearch {
    async fn search(
        &self,
        query: &str,
        _region_hint: Option<&str>,
    ) -> Result<Vec<SearchHit>, HearthError> {
        *self.last_query.lock().expect("query lock") = Some(query.to_string());
        self.knobs.enter("search").await?;
        Ok(self.hits.lock().expect("hits lock").clone())
    }
}

// --- Contractor lookup ---

/// Mock contractor lookup returning configurable hits.
pub struct MockContractorLookup {
    knobs: ToolKnobs,
    hits: Mutex<Vec<ContractorHit>>,
}

impl MockContractorLookup {
    pub fn new() -> Self {
        Self {
            knobs: ToolKnobs::new(),
            hits: Mutex::new(vec![ContractorHit {
                name: "Ace Plumbing".into(),
                locator: "place:123".into(),
                rating: Some(4.6),
                contact: Some("+1-512-555-0101".into()),
            }]),
        }
    }

    pub fn set_hits(&self, hits: Vec<ContractorHit>) {
        *self.hits.lock().expect("hits lock") = hits;
    }

    knob_methods!();
}

impl Default for MockContractorLookup {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockContractorLookup, "mock-contractors", AdapterKind::Maps);

#[async_trait]
impl ContractorLookup for MockContractorLookup {
    async fn find_nearby(
        &self,
        _job_type: &str,
        _location: &str,
    ) -> Result<Vec<ContractorHit>, HearthError> {
        self.knobs.enter("contractor_lookup").await?;
        Ok(self.hits.lock().expect("hits lock").clone())
    }
}
