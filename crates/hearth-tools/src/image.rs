// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapter for the image generation capability.

use async_trait::async_trait;
use hearth_config::model::ImageConfig;
use hearth_core::types::ImageLocator;
use hearth_core::{
    AdapterKind, CapabilityAdapter, HealthStatus, HearthError, ImageGeneration,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire format of an image generation request.
#[derive(Debug, Serialize)]
struct ApiImageRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    n: u8,
}

/// Wire format of one generated image.
#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
    #[serde(default)]
    content_type: Option<String>,
}

/// Wire format of an image generation response.
#[derive(Debug, Deserialize)]
struct ApiImageResponse {
    #[serde(default)]
    images: Vec<ApiImage>,
}

/// Image generation over an HTTP image service.
pub struct HttpImageGeneration {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    count: u8,
}

impl HttpImageGeneration {
    pub fn new(config: &ImageConfig) -> Result<Self, HearthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| HearthError::Tool {
                tool: "image_generation".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            count: config.count,
        })
    }
}

#[async_trait]
impl CapabilityAdapter for HttpImageGeneration {
    fn name(&self) -> &str {
        "http-image"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Image
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
impl ImageGeneration for HttpImageGeneration {
    async fn generate_image(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<Vec<ImageLocator>, HearthError> {
        let body = ApiImageRequest {
            prompt,
            style,
            n: self.count,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| HearthError::Tool {
            tool: "image_generation".into(),
            message: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HearthError::Tool {
                tool: "image_generation".into(),
                message: format!("image service returned {status}"),
            });
        }

        let body: ApiImageResponse = response.json().await.map_err(|e| HearthError::Tool {
            tool: "image_generation".into(),
            message: format!("failed to parse image response: {e}"),
        })?;

        debug!(prompt_len = prompt.len(), images = body.images.len(), "image generation complete");

        Ok(body
            .images
            .into_iter()
            .map(|i| ImageLocator {
                url: i.url,
                content_type: i.content_type,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(endpoint: &str) -> HttpImageGeneration {
        HttpImageGeneration::new(&ImageConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".into()),
            count: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn generate_image_returns_locators() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "living room in soft gray",
                "n": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": [
                    {"url": "https://cdn.example.com/r1.png", "content_type": "image/png"},
                    {"url": "https://cdn.example.com/r2.png"}
                ]
            })))
            .mount(&server)
            .await;

        let locators = adapter(&server.uri())
            .generate_image("living room in soft gray", None)
            .await
            .unwrap();
        assert_eq!(locators.len(), 2);
        assert_eq!(locators[0].content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn style_is_forwarded_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"style": "photorealistic"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"images": []})),
            )
            .mount(&server)
            .await;

        let locators = adapter(&server.uri())
            .generate_image("bathroom remodel", Some("photorealistic"))
            .await
            .unwrap();
        assert!(locators.is_empty());
    }

    #[tokio::test]
    async fn failure_status_becomes_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = adapter(&server.uri())
            .generate_image("deck", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HearthError::Tool { ref tool, .. } if tool == "image_generation"));
    }
}
