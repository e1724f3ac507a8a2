// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-tier intent classification.
//!
//! The primary classifier asks the generation capability for a
//! constrained-output label; the fallback applies deterministic keyword
//! rules over the raw text. Both implement the same interface and are
//! composed by a try/fallback combinator, so classification can never fail
//! a turn.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use hearth_core::types::{
    GenerationRequest, Intent, IntentSource, PromptMessage,
};
use hearth_core::{HearthError, TextGeneration};
use tracing::{debug, warn};

/// A classified intent with its confidence and origin tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    pub source: IntentSource,
}

/// Common interface for both classifier tiers.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify a turn. `recent` holds the last few message texts, oldest
    /// first, for conversational context.
    async fn classify(&self, text: &str, recent: &[String])
        -> Result<Classification, HearthError>;
}

/// Primary tier: constrained-output classification via the generation
/// capability.
pub struct ModelClassifier {
    generation: Arc<dyn TextGeneration>,
}

impl ModelClassifier {
    pub fn new(generation: Arc<dyn TextGeneration>) -> Self {
        Self { generation }
    }

    fn build_prompt(text: &str, recent: &[String]) -> GenerationRequest {
        let labels: Vec<String> = Intent::ALL.iter().map(|i| i.to_string()).collect();
        let mut prompt = String::new();
        if !recent.is_empty() {
            prompt.push_str("Recent conversation:\n");
            for line in recent.iter().rev().take(4).rev() {
                prompt.push_str(line);
                prompt.push('\n');
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!(
            "Classify the user's latest message into exactly one of these labels:\n{}\n\n\
             Message: {text}\n\n\
             Respond with only the label, nothing else.",
            labels.join(", ")
        ));

        GenerationRequest {
            system: Some(
                "You classify home-improvement assistant messages. \
                 Respond with a single taxonomy label."
                    .to_string(),
            ),
            messages: vec![PromptMessage::text("user", prompt)],
            max_tokens: 16,
        }
    }
}

#[async_trait]
impl IntentClassifier for ModelClassifier {
    async fn classify(
        &self,
        text: &str,
        recent: &[String],
    ) -> Result<Classification, HearthError> {
        let request = Self::build_prompt(text, recent);
        let response = self.generation.complete(request).await?;
        let label = response.text.trim().to_lowercase();

        // An out-of-taxonomy answer is treated as a failure so the fallback
        // tier takes over.
        let intent = Intent::from_str(&label).map_err(|_| HearthError::Provider {
            message: format!("classifier returned out-of-taxonomy label: {label:?}"),
            source: None,
        })?;

        Ok(Classification {
            intent,
            confidence: 0.9,
            source: IntentSource::Model,
        })
    }
}

/// Keyword rules, checked in priority order. The first matching rule wins.
const KEYWORD_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::PdfExportRequest,
        &["pdf", "export", "print the plan", "download the plan"],
    ),
    (
        Intent::ContractorQuotes,
        &["contractor", "quote", "hire a pro", "professional", "someone to do it"],
    ),
    (
        Intent::CostEstimate,
        &["cost", "how much", "price", "estimate", "budget for"],
    ),
    (
        Intent::DesignVisualization,
        &["visualize", "look like", "render", "mock up", "mockup", "paint my", "redesign"],
    ),
    (
        Intent::DiyGuide,
        &["how do i", "how to", "diy", "step by step", "install", "myself", "tutorial"],
    ),
    (
        Intent::ProductSearch,
        &["buy", "where can i get", "shop", "product", "recommend a"],
    ),
];

/// Fallback tier: deterministic keyword matching. Always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify without async or failure: substring rules over the raw text.
    pub fn classify_text(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();
        for (intent, keywords) in KEYWORD_RULES {
            if keywords.iter().any(|k| lower.contains(k)) {
                return Classification {
                    intent: *intent,
                    confidence: 0.7,
                    source: IntentSource::Keyword,
                };
            }
        }
        Classification {
            intent: Intent::GeneralQuestion,
            confidence: 0.4,
            source: IntentSource::Keyword,
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(
        &self,
        text: &str,
        _recent: &[String],
    ) -> Result<Classification, HearthError> {
        Ok(self.classify_text(text))
    }
}

/// Try/fallback combinator over the two tiers.
///
/// The primary tier is optional (no generation capability configured means
/// keyword-only classification). A primary failure is logged and absorbed;
/// the combinator itself never fails.
pub struct TieredClassifier {
    primary: Option<Box<dyn IntentClassifier>>,
    fallback: KeywordClassifier,
}

impl TieredClassifier {
    pub fn new(primary: Option<Box<dyn IntentClassifier>>) -> Self {
        Self {
            primary,
            fallback: KeywordClassifier::new(),
        }
    }

    /// Classify a turn. Never fails: a failing primary degrades to the
    /// deterministic fallback.
    pub async fn classify(&self, text: &str, recent: &[String]) -> Classification {
        if let Some(primary) = &self.primary {
            match primary.classify(text, recent).await {
                Ok(classification) => {
                    debug!(intent = %classification.intent, "model classification");
                    return classification;
                }
                Err(e) => {
                    warn!(error = %e, "primary classifier failed, using keyword fallback");
                }
            }
        }
        let classification = self.fallback.classify_text(text);
        debug!(intent = %classification.intent, "keyword classification");
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::types::{AdapterKind, GenerationEvent, GenerationResponse, HealthStatus};
    use hearth_core::CapabilityAdapter;
    use std::pin::Pin;

    #[test]
    fn keyword_rules_cover_the_taxonomy() {
        let c = KeywordClassifier::new();
        assert_eq!(
            c.classify_text("paint my living room soft gray").intent,
            Intent::DesignVisualization
        );
        assert_eq!(
            c.classify_text("how do I fix a leaky faucet").intent,
            Intent::DiyGuide
        );
        assert_eq!(
            c.classify_text("how much would new counters cost").intent,
            Intent::CostEstimate
        );
        assert_eq!(
            c.classify_text("find me a contractor for the roof").intent,
            Intent::ContractorQuotes
        );
        assert_eq!(
            c.classify_text("where can i get matching tiles").intent,
            Intent::ProductSearch
        );
        assert_eq!(
            c.classify_text("export this as a pdf").intent,
            Intent::PdfExportRequest
        );
        assert_eq!(
            c.classify_text("is my house haunted").intent,
            Intent::GeneralQuestion
        );
    }

    #[test]
    fn keyword_classification_is_deterministic() {
        let c = KeywordClassifier::new();
        let a = c.classify_text("how much does tile cost");
        let b = c.classify_text("how much does tile cost");
        assert_eq!(a, b);
        assert_eq!(a.source, IntentSource::Keyword);
    }

    struct ScriptedGeneration {
        reply: String,
        fail: bool,
    }

    #[async_trait]
    impl CapabilityAdapter for ScriptedGeneration {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn kind(&self) -> AdapterKind {
            AdapterKind::Generation
        }
        async fn health_check(&self) -> Result<HealthStatus, HearthError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), HearthError> {
            Ok(())
        }
    }

    #[async_trait]
    impl TextGeneration for ScriptedGeneration {
        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, HearthError> {
            if self.fail {
                return Err(HearthError::Provider {
                    message: "provider down".into(),
                    source: None,
                });
            }
            Ok(GenerationResponse {
                text: self.reply.clone(),
                stop_reason: Some("end_turn".into()),
            })
        }
        async fn stream(
            &self,
            _request: GenerationRequest,
        ) -> Result<
            Pin<Box<dyn futures_core::Stream<Item = Result<GenerationEvent, HearthError>> + Send>>,
            HearthError,
        > {
            unimplemented!("classifier only uses complete()")
        }
    }

    fn tiered(reply: &str, fail: bool) -> TieredClassifier {
        TieredClassifier::new(Some(Box::new(ModelClassifier::new(Arc::new(
            ScriptedGeneration {
                reply: reply.to_string(),
                fail,
            },
        )))))
    }

    #[tokio::test]
    async fn model_label_is_used_when_valid() {
        let c = tiered("design_visualization", false);
        let result = c.classify("make my kitchen look coastal", &[]).await;
        assert_eq!(result.intent, Intent::DesignVisualization);
        assert_eq!(result.source, IntentSource::Model);
    }

    #[tokio::test]
    async fn out_of_taxonomy_label_falls_back_to_keywords() {
        let c = tiered("order_pizza", false);
        let result = c.classify("how do I install a ceiling fan", &[]).await;
        assert_eq!(result.intent, Intent::DiyGuide);
        assert_eq!(result.source, IntentSource::Keyword);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_keywords() {
        let c = tiered("unused", true);
        let result = c.classify("how much would a deck cost", &[]).await;
        assert_eq!(result.intent, Intent::CostEstimate);
        assert_eq!(result.source, IntentSource::Keyword);
    }

    #[tokio::test]
    async fn no_primary_means_keyword_only() {
        let c = TieredClassifier::new(None);
        let result = c.classify("export the plan to pdf", &[]).await;
        assert_eq!(result.intent, Intent::PdfExportRequest);
    }

    #[tokio::test]
    async fn model_label_is_trimmed_and_lowercased() {
        let c = tiered("  Cost_Estimate \n", false);
        let result = c.classify("whatever", &[]).await;
        assert_eq!(result.intent, Intent::CostEstimate);
        assert_eq!(result.source, IntentSource::Model);
    }
}
