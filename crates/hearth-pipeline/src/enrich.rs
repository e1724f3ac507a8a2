// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multimodal enrichment: the pipeline's only fan-out point.
//!
//! Runs only in agent mode, checked once at entry. The classified intent
//! selects a fixed set of tool calls; every call gets its own timeout and
//! error boundary so a failing or slow tool contributes nothing but never
//! fails the turn. All selected calls run concurrently and the enricher
//! waits for all to settle, bounded by an overall timeout larger than any
//! single tool's. Cancellation aborts in-flight calls.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use hearth_core::types::{ConversationMode, Intent, ToolOutput};
use hearth_core::{ContractorLookup, GroundingSearch, HearthError, ImageGeneration};
use hearth_actions::SlotState;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The tools the enricher can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Search,
    Image,
    Video,
    Contractor,
}

impl ToolKind {
    fn name(self) -> &'static str {
        match self {
            ToolKind::Search => "search",
            ToolKind::Image => "image_generation",
            ToolKind::Video => "video_search",
            ToolKind::Contractor => "contractor_lookup",
        }
    }
}

/// Which tools run for which intent. Fixed, not user-programmable.
pub fn plan(intent: Intent) -> &'static [ToolKind] {
    match intent {
        Intent::DesignVisualization => &[ToolKind::Image],
        Intent::DiyGuide => &[ToolKind::Video],
        Intent::CostEstimate => &[ToolKind::Search],
        Intent::ProductSearch => &[ToolKind::Search],
        Intent::ContractorQuotes => &[ToolKind::Contractor],
        Intent::PdfExportRequest | Intent::GeneralQuestion => &[],
    }
}

/// Tunables for one enrichment pass.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub per_tool_timeout: Duration,
    pub overall_timeout: Duration,
    pub video_site_filter: String,
    pub default_location: String,
}

/// Fan-out/fan-in coordinator over the three enrichment capabilities.
pub struct Enricher {
    image: Arc<dyn ImageGeneration>,
    search: Arc<dyn GroundingSearch>,
    contractors: Arc<dyn ContractorLookup>,
    config: EnricherConfig,
}

type ToolFuture = Pin<Box<dyn Future<Output = Option<ToolOutput>> + Send>>;

impl Enricher {
    pub fn new(
        image: Arc<dyn ImageGeneration>,
        search: Arc<dyn GroundingSearch>,
        contractors: Arc<dyn ContractorLookup>,
        config: EnricherConfig,
    ) -> Self {
        Self {
            image,
            search,
            contractors,
            config,
        }
    }

    /// Run enrichment for one turn.
    ///
    /// No-op outside agent mode. Returns whatever the surviving tools
    /// produced; failures and timeouts are logged and omitted.
    pub async fn enrich(
        &self,
        mode: ConversationMode,
        intent: Intent,
        text: &str,
        slots: &SlotState,
        cancel: &CancellationToken,
    ) -> Vec<ToolOutput> {
        // The mode gate is the single entry check; nothing below runs in
        // chat mode.
        if mode != ConversationMode::Agent {
            return vec![];
        }

        let selected = plan(intent);
        if selected.is_empty() {
            return vec![];
        }

        let futures: Vec<ToolFuture> = selected
            .iter()
            .map(|kind| self.tool_future(*kind, text, slots))
            .collect();

        let gathered = futures::future::join_all(futures);

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("enrichment cancelled, dropping in-flight tool calls");
                vec![]
            }
            settled = tokio::time::timeout(self.config.overall_timeout, gathered) => {
                match settled {
                    Ok(outputs) => {
                        let outputs: Vec<ToolOutput> = outputs
                            .into_iter()
                            .flatten()
                            .filter(|o| !o.is_empty())
                            .collect();
                        debug!(tools = selected.len(), surviving = outputs.len(), "enrichment settled");
                        outputs
                    }
                    Err(_) => {
                        warn!(timeout = ?self.config.overall_timeout, "overall enrichment timeout");
                        vec![]
                    }
                }
            }
        }
    }

    /// Wraps one tool call with its timeout and error boundary.
    fn tool_future(&self, kind: ToolKind, text: &str, slots: &SlotState) -> ToolFuture {
        let per_tool_timeout = self.config.per_tool_timeout;

        let call: Pin<Box<dyn Future<Output = Result<ToolOutput, HearthError>> + Send>> = match kind
        {
            ToolKind::Search => {
                let search = Arc::clone(&self.search);
                let query = text.to_string();
                Box::pin(async move {
                    let hits = search.search(&query, None).await?;
                    Ok(ToolOutput::Search { hits })
                })
            }
            ToolKind::Video => {
                let search = Arc::clone(&self.search);
                let query = format!("{text} tutorial {}", self.config.video_site_filter);
                Box::pin(async move {
                    let hits = search.search(&query, None).await?;
                    Ok(ToolOutput::Video { hits })
                })
            }
            ToolKind::Image => {
                let image = Arc::clone(&self.image);
                let prompt = text.to_string();
                let style = slots.style.clone();
                Box::pin(async move {
                    let locators = image.generate_image(&prompt, style.as_deref()).await?;
                    Ok(ToolOutput::Image { locators })
                })
            }
            ToolKind::Contractor => {
                let contractors = Arc::clone(&self.contractors);
                let job_type = slots
                    .job_type
                    .clone()
                    .unwrap_or_else(|| "general contractor".to_string());
                let location = slots
                    .location
                    .clone()
                    .unwrap_or_else(|| self.config.default_location.clone());
                Box::pin(async move {
                    let hits = contractors.find_nearby(&job_type, &location).await?;
                    Ok(ToolOutput::Contractor { hits })
                })
            }
        };

        Box::pin(async move {
            match tokio::time::timeout(per_tool_timeout, call).await {
                Ok(Ok(output)) => Some(output),
                Ok(Err(e)) => {
                    warn!(tool = kind.name(), error = %e, "tool failed, omitting its content");
                    None
                }
                Err(_) => {
                    warn!(tool = kind.name(), timeout = ?per_tool_timeout, "tool timed out, omitting its content");
                    None
                }
            }
        })
    }
}
