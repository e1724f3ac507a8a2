// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapter for the web/product grounding search capability.

use async_trait::async_trait;
use hearth_config::model::SearchConfig;
use hearth_core::types::SearchHit;
use hearth_core::{
    AdapterKind, CapabilityAdapter, GroundingSearch, HealthStatus, HearthError,
};
use serde::Deserialize;
use tracing::debug;

/// Wire format of one search result.
#[derive(Debug, Deserialize)]
struct ApiSearchResult {
    title: String,
    url: String,
    #[serde(default)]
    price: Option<String>,
    source: String,
}

/// Wire format of a search response.
#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    results: Vec<ApiSearchResult>,
}

/// Grounding search over an HTTP search service.
pub struct HttpGroundingSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_hits: usize,
}

impl HttpGroundingSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, HearthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| HearthError::Tool {
                tool: "search".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            max_hits: config.max_hits,
        })
    }
}

#[async_trait]
impl CapabilityAdapter for HttpGroundingSearch {
    fn name(&self) -> &str {
        "http-search"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
        if self.api_key.is_none() {
            return Ok(HealthStatus::Degraded("no API key configured".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HearthError> {
        Ok(())
    }
}

#[async_trait]
impl GroundingSearch for HttpGroundingSearch {
    async fn search(
        &self,
        query: &str,
        region_hint: Option<&str>,
    ) -> Result<Vec<SearchHit>, HearthError> {
        let mut request = self.client.get(&self.endpoint).query(&[("q", query)]);
        if let Some(region) = region_hint {
            request = request.query(&[("region", region)]);
        }
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| HearthError::Tool {
            tool: "search".into(),
            message: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HearthError::Tool {
                tool: "search".into(),
                message: format!("search service returned {status}"),
            });
        }

        let body: ApiSearchResponse = response.json().await.map_err(|e| HearthError::Tool {
            tool: "search".into(),
            message: format!("failed to parse search response: {e}"),
        })?;

        debug!(query = %query, hits = body.results.len(), "grounding search complete");

        Ok(body
            .results
            .into_iter()
            .take(self.max_hits)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                price: r.price,
                source: r.source,
            })
            .collect())
    }
}
