// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapter for the maps/contractor lookup capability.

use async_trait::async_trait;
use hearth_config::model::MapsConfig;
use hearth_core::types::ContractorHit;
use hearth_core::{
    AdapterKind, CapabilityAdapter, ContractorLookup, HealthStatus, HearthError,
};
use serde::Deserialize;
use tracing::debug;

/// Wire format of one place result.
#[derive(Debug, Deserialize)]
struct ApiPlace {
    name: String,
    place_id: String,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    phone: Option<String>,
}

/// Wire format of a nearby-places response.
#[derive(Debug, Deserialize)]
struct ApiPlacesResponse {
    #[serde(default)]
    places: Vec<ApiPlace>,
}

/// Contractor lookup over an HTTP places service.
pub struct HttpContractorLookup {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpContractorLookup {
    pub fn new(config: &MapsConfig) -> Result<Self, HearthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| HearthError::Tool {
                tool: "contractor_lookup".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CapabilityAdapter for HttpContractorLookup {
    fn name(&self) -> &str {
        "http-maps"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Maps
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
impl ContractorLookup for HttpContractorLookup {
    async fn find_nearby(
        &self,
        job_type: &str,
        location: &str,
    ) -> Result<Vec<ContractorHit>, HearthError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("job_type", job_type), ("location", location)]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| HearthError::Tool {
            tool: "contractor_lookup".into(),
            message: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HearthError::Tool {
                tool: "contractor_lookup".into(),
                message: format!("places service returned {status}"),
            });
        }

        let body: ApiPlacesResponse = response.json().await.map_err(|e| HearthError::Tool {
            tool: "contractor_lookup".into(),
            message: format!("failed to parse places response: {e}"),
        })?;

        debug!(job_type = %job_type, location = %location, places = body.places.len(), "contractor lookup complete");

        Ok(body
            .places
            .into_iter()
            .map(|p| ContractorHit {
                name: p.name,
                locator: p.place_id,
                rating: p.rating,
                contact: p.phone,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(endpoint: &str) -> HttpContractorLookup {
        HttpContractorLookup::new(&MapsConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".into()),
            default_location: "Austin, TX".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn find_nearby_maps_places() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("job_type", "plumbing"))
            .and(query_param("location", "Austin, TX"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "places": [
                    {"name": "Ace Plumbing", "place_id": "place:123", "rating": 4.6, "phone": "+1-512-555-0101"},
                    {"name": "Budget Drains", "place_id": "place:456"}
                ]
            })))
            .mount(&server)
            .await;

        let hits = adapter(&server.uri())
            .find_nearby("plumbing", "Austin, TX")
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Ace Plumbing");
        assert_eq!(hits[0].rating, Some(4.6));
        assert_eq!(hits[0].locator, "place:123");
        assert!(hits[1].contact.is_none());
    }

    #[tokio::test]
    async fn empty_places_are_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"places": []})),
            )
            .mount(&server)
            .await;

        let hits = adapter(&server.uri())
            .find_nearby("thatching", "Nowhere, KS")
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn failure_status_becomes_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = adapter(&server.uri())
            .find_nearby("roofing", "Austin, TX")
            .await
            .unwrap_err();
        assert!(matches!(err, HearthError::Tool { ref tool, .. } if tool == "contractor_lookup"));
    }
}
