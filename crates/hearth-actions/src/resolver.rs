// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The action resolver: a separate entry point from the turn pipeline.
//!
//! Given an action id and the conversation's accumulated state, the resolver
//! fills the action's required parameters by scanning recent message
//! metadata and slot-filling state. Fully resolved actions execute against
//! the capability adapters; a missing parameter produces a structured
//! needs-input outcome whose prompt offers to synthesize the missing
//! prerequisite, never a rigid field-name error list.
//!
//! Resolution is a pure function of the conversation state up front: the
//! same state always yields the same completed-or-needs-input
//! classification.

use std::str::FromStr;
use std::sync::Arc;

use hearth_core::types::{Conversation, GenerationRequest, Intent, Message, PromptMessage, Role};
use hearth_core::{
    ContractorLookup, GroundingSearch, HearthError, ImageGeneration, TextGeneration,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::slots::SlotState;
use crate::taxonomy::ActionId;

/// Outcome of resolving an action. Needs-input is a first-class outcome,
/// not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionResolution {
    /// The action executed; `summary` is user-facing, `artifact` is the
    /// structured result.
    Completed {
        summary: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact: Option<serde_json::Value>,
    },
    /// A required parameter could not be resolved from the conversation.
    NeedsInput { prompt: String },
}

/// Everything the resolver may scan: the conversation row and its recent
/// messages, oldest first.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

impl ActionContext {
    fn slots(&self) -> SlotState {
        SlotState::scan(self.messages.iter().map(|m| m.content.as_str()))
    }

    /// The most recent user message, if any -- the default "project" parameter.
    fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Scans assistant metadata for a previously generated project plan.
    fn find_plan_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| {
            m.role == Role::Assistant
                && m.metadata
                    .as_ref()
                    .and_then(|meta| meta.intent)
                    .is_some_and(|intent| intent == Intent::DiyGuide)
        })
    }
}

/// Executes follow-up actions against the accumulated conversation state.
pub struct ActionResolver {
    generation: Arc<dyn TextGeneration>,
    image: Arc<dyn ImageGeneration>,
    search: Arc<dyn GroundingSearch>,
    contractors: Arc<dyn ContractorLookup>,
    default_location: String,
    max_tokens: u32,
}

impl ActionResolver {
    pub fn new(
        generation: Arc<dyn TextGeneration>,
        image: Arc<dyn ImageGeneration>,
        search: Arc<dyn GroundingSearch>,
        contractors: Arc<dyn ContractorLookup>,
        default_location: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            generation,
            image,
            search,
            contractors,
            default_location,
            max_tokens,
        }
    }

    /// Resolve and (when possible) execute an action.
    ///
    /// An unknown action id is a [`HearthError::NotFound`]; every id in the
    /// taxonomy resolves to either a result or a needs-input prompt.
    pub async fn resolve(
        &self,
        action_id: &str,
        ctx: &ActionContext,
    ) -> Result<ActionResolution, HearthError> {
        let action = ActionId::from_str(action_id).map_err(|_| HearthError::NotFound {
            entity: "action",
            id: action_id.to_string(),
        })?;

        debug!(action = %action, conversation_id = %ctx.conversation.id, "resolving action");

        let resolution = match action {
            ActionId::CreateDiyPlan => self.create_diy_plan(ctx).await?,
            ActionId::EstimateCost => self.estimate_cost(ctx).await?,
            ActionId::VisualizeRoom => self.visualize_room(ctx).await?,
            ActionId::FindProducts => self.find_products(ctx).await?,
            ActionId::RequestContractorQuotes => self.request_contractor_quotes(ctx).await?,
            ActionId::ExportPdf => self.export_pdf(ctx),
        };

        if let ActionResolution::Completed { .. } = resolution {
            info!(action = %action, "action completed");
        }
        Ok(resolution)
    }

    async fn create_diy_plan(&self, ctx: &ActionContext) -> Result<ActionResolution, HearthError> {
        let Some(project) = ctx.last_user_text() else {
            return Ok(ActionResolution::NeedsInput {
                prompt: "Tell me a little about the project first -- what would you like to \
                         build or fix? I'll draft a step-by-step plan from there."
                    .to_string(),
            });
        };

        let request = GenerationRequest {
            system: Some(
                "You are a home-improvement planner. Produce a concise, numbered \
                 step-by-step DIY plan with a tools-and-materials list."
                    .to_string(),
            ),
            messages: vec![PromptMessage::text(
                "user",
                format!("Create a DIY plan for: {project}"),
            )],
            max_tokens: self.max_tokens,
        };
        let response = self.generation.complete(request).await?;

        Ok(ActionResolution::Completed {
            summary: response.text,
            artifact: Some(serde_json::json!({ "kind": "diy_plan" })),
        })
    }

    async fn estimate_cost(&self, ctx: &ActionContext) -> Result<ActionResolution, HearthError> {
        let slots = ctx.slots();
        let Some(project) = ctx.last_user_text() else {
            return Ok(ActionResolution::NeedsInput {
                prompt: "What project should I price out? Describe it and I'll put an \
                         estimate together."
                    .to_string(),
            });
        };
        let Some(dimensions) = slots.dimensions else {
            return Ok(ActionResolution::NeedsInput {
                prompt: "I can estimate costs once I know the size of the space -- what are \
                         the dimensions? If you're not sure, give me a rough square footage \
                         and I'll work from that."
                    .to_string(),
            });
        };

        let request = GenerationRequest {
            system: Some(
                "You are a home-improvement cost estimator. Give a realistic range with a \
                 short breakdown of materials and labor."
                    .to_string(),
            ),
            messages: vec![PromptMessage::text(
                "user",
                format!("Estimate the cost of: {project} (dimensions: {dimensions})"),
            )],
            max_tokens: self.max_tokens,
        };
        let response = self.generation.complete(request).await?;

        Ok(ActionResolution::Completed {
            summary: response.text,
            artifact: Some(serde_json::json!({ "kind": "cost_estimate" })),
        })
    }

    async fn visualize_room(&self, ctx: &ActionContext) -> Result<ActionResolution, HearthError> {
        let Some(project) = ctx.last_user_text() else {
            return Ok(ActionResolution::NeedsInput {
                prompt: "Which room should I visualize, and what change do you have in \
                         mind? A sentence or two is plenty."
                    .to_string(),
            });
        };

        let style = ctx.slots().style;
        let locators = self
            .image
            .generate_image(project, style.as_deref())
            .await?;

        if locators.is_empty() {
            return Ok(ActionResolution::Completed {
                summary: "I couldn't produce a render this time -- try rephrasing the \
                          description or asking again in a moment."
                    .to_string(),
                artifact: None,
            });
        }

        let urls: Vec<&str> = locators.iter().map(|l| l.url.as_str()).collect();
        Ok(ActionResolution::Completed {
            summary: format!("Here {} your render.", if urls.len() == 1 { "is" } else { "are" }),
            artifact: Some(serde_json::json!({ "kind": "renders", "urls": urls })),
        })
    }

    async fn find_products(&self, ctx: &ActionContext) -> Result<ActionResolution, HearthError> {
        let slots = ctx.slots();
        let query = match (slots.materials, ctx.last_user_text()) {
            (Some(material), Some(text)) => format!("{material} {text}"),
            (None, Some(text)) => text.to_string(),
            (_, None) => {
                return Ok(ActionResolution::NeedsInput {
                    prompt: "What should I shop for? Name a product or material and I'll \
                             pull up options."
                        .to_string(),
                });
            }
        };

        let hits = self.search.search(&query, None).await?;
        Ok(ActionResolution::Completed {
            summary: if hits.is_empty() {
                "I didn't find matching products for that -- want to try a broader \
                 description?"
                    .to_string()
            } else {
                format!("Found {} matching products.", hits.len())
            },
            artifact: Some(serde_json::json!({ "kind": "products", "hits": hits })),
        })
    }

    async fn request_contractor_quotes(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionResolution, HearthError> {
        let slots = ctx.slots();
        let Some(job_type) = slots.job_type else {
            return Ok(ActionResolution::NeedsInput {
                prompt: "What kind of work do you need done -- plumbing, electrical, \
                         painting, something else? I'll find local pros for that trade."
                    .to_string(),
            });
        };

        let location = slots
            .location
            .unwrap_or_else(|| self.default_location.clone());
        let hits = self.contractors.find_nearby(&job_type, &location).await?;

        Ok(ActionResolution::Completed {
            summary: if hits.is_empty() {
                format!("I couldn't find {job_type} pros near {location} right now.")
            } else {
                format!("Found {} {job_type} pros near {location}.", hits.len())
            },
            artifact: Some(serde_json::json!({ "kind": "contractors", "hits": hits })),
        })
    }

    /// PDF export needs a plan artifact from earlier in the conversation.
    /// This never reports export as unsupported: with no plan present it
    /// offers to create one first.
    fn export_pdf(&self, ctx: &ActionContext) -> ActionResolution {
        match ctx.find_plan_message() {
            Some(plan) => ActionResolution::Completed {
                summary: "Your plan is ready to download as a PDF.".to_string(),
                artifact: Some(serde_json::json!({
                    "kind": "pdf",
                    "locator": format!("export://pdf/{}", plan.id),
                })),
            },
            None => ActionResolution::NeedsInput {
                prompt: "I don't see a project plan in this conversation yet -- want me to \
                         create one first and then export it as a PDF?"
                    .to_string(),
            },
        }
    }
}
