// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up suggestion computation with anti-repetition filtering.
//!
//! Candidates are computed per intent, filtered against the rolling window
//! of recently emitted ids, and topped up from a generic default set (itself
//! filtered) when the primary set empties. An exhausted outcome is reported
//! explicitly, never papered over by repeating a recent suggestion.
//!
//! The self-serve (DIY) and professional (contractor) pathways are both
//! offered whenever the user has not committed to one via the conversation
//! scenario. Persona only influences ordering, never availability.

use hearth_core::types::{
    ActionChip, ClarifyingQuestion, Intent, Persona, Scenario, SuggestionWindow,
};
use tracing::debug;

use crate::slots::SlotState;
use crate::taxonomy::{spec, ActionId};

/// The computed suggestions for one turn.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    pub actions: Vec<ActionChip>,
    pub questions: Vec<ClarifyingQuestion>,
    /// True when even the filtered defaults had nothing left to offer.
    pub actions_exhausted: bool,
    pub questions_exhausted: bool,
}

/// Generic fallbacks when the intent-specific candidates are all in the window.
const DEFAULT_ACTIONS: &[ActionId] = &[
    ActionId::CreateDiyPlan,
    ActionId::RequestContractorQuotes,
    ActionId::FindProducts,
];

/// Compute up to `max` follow-up actions and clarifying questions.
pub fn suggest(
    intent: Intent,
    scenario: Scenario,
    persona: Persona,
    slots: &SlotState,
    window: &SuggestionWindow,
    max: usize,
) -> SuggestionSet {
    let (actions, actions_exhausted) = pick_actions(intent, scenario, persona, window, max);
    let (questions, questions_exhausted) = pick_questions(intent, scenario, slots, window, max);

    debug!(
        intent = %intent,
        actions = actions.len(),
        questions = questions.len(),
        actions_exhausted,
        questions_exhausted,
        "suggestions computed"
    );

    SuggestionSet {
        actions,
        questions,
        actions_exhausted,
        questions_exhausted,
    }
}

fn pick_actions(
    intent: Intent,
    scenario: Scenario,
    persona: Persona,
    window: &SuggestionWindow,
    max: usize,
) -> (Vec<ActionChip>, bool) {
    let mut candidates = action_candidates(intent);

    // Commitment comes from the scenario alone; persona never gates.
    match scenario {
        Scenario::DiyProjectPlan => {
            candidates.retain(|a| *a != ActionId::RequestContractorQuotes);
        }
        Scenario::ContractorQuotes => {
            candidates.retain(|a| *a != ActionId::CreateDiyPlan);
        }
        Scenario::None => {
            for pathway in [ActionId::CreateDiyPlan, ActionId::RequestContractorQuotes] {
                if !candidates.contains(&pathway) {
                    candidates.push(pathway);
                }
            }
        }
    }

    // Persona is a ranking hint: float the matching pathway to the front.
    let favored = match persona {
        Persona::Contractor => Some(ActionId::RequestContractorQuotes),
        Persona::DiyWorker | Persona::Homeowner => Some(ActionId::CreateDiyPlan),
        Persona::None => None,
    };
    if let Some(favored) = favored
        && let Some(pos) = candidates.iter().position(|a| *a == favored)
    {
        let a = candidates.remove(pos);
        candidates.insert(0, a);
    }

    let filtered: Vec<ActionId> = candidates
        .into_iter()
        .filter(|a| !window.action_ids.contains(&a.to_string()))
        .take(max)
        .collect();

    if !filtered.is_empty() {
        return (filtered.into_iter().map(chip).collect(), false);
    }

    // Fall back to the generic defaults, also filtered so they do not repeat.
    let defaults: Vec<ActionId> = DEFAULT_ACTIONS
        .iter()
        .copied()
        .filter(|a| !window.action_ids.contains(&a.to_string()))
        .take(max)
        .collect();

    if defaults.is_empty() {
        (vec![], true)
    } else {
        (defaults.into_iter().map(chip).collect(), false)
    }
}

fn chip(id: ActionId) -> ActionChip {
    ActionChip {
        id: id.to_string(),
        label: spec(id).label.to_string(),
    }
}

/// Intent-specific follow-up actions, most relevant first.
fn action_candidates(intent: Intent) -> Vec<ActionId> {
    match intent {
        Intent::DesignVisualization => vec![
            ActionId::FindProducts,
            ActionId::CreateDiyPlan,
            ActionId::EstimateCost,
            ActionId::RequestContractorQuotes,
        ],
        Intent::DiyGuide => vec![
            ActionId::CreateDiyPlan,
            ActionId::EstimateCost,
            ActionId::FindProducts,
            ActionId::ExportPdf,
            ActionId::RequestContractorQuotes,
        ],
        Intent::CostEstimate => vec![
            ActionId::RequestContractorQuotes,
            ActionId::CreateDiyPlan,
            ActionId::FindProducts,
            ActionId::VisualizeRoom,
        ],
        Intent::ContractorQuotes => vec![
            ActionId::RequestContractorQuotes,
            ActionId::EstimateCost,
            ActionId::CreateDiyPlan,
        ],
        Intent::ProductSearch => vec![
            ActionId::FindProducts,
            ActionId::EstimateCost,
            ActionId::CreateDiyPlan,
            ActionId::RequestContractorQuotes,
        ],
        Intent::PdfExportRequest => vec![ActionId::ExportPdf, ActionId::CreateDiyPlan],
        Intent::GeneralQuestion => vec![
            ActionId::CreateDiyPlan,
            ActionId::RequestContractorQuotes,
            ActionId::VisualizeRoom,
            ActionId::EstimateCost,
        ],
    }
}

fn question(id: &str, text: &str) -> ClarifyingQuestion {
    ClarifyingQuestion {
        id: id.to_string(),
        text: text.to_string(),
    }
}

fn pick_questions(
    intent: Intent,
    scenario: Scenario,
    slots: &SlotState,
    window: &SuggestionWindow,
    max: usize,
) -> (Vec<ClarifyingQuestion>, bool) {
    let mut candidates = Vec::new();

    // Slot-aware candidates: never re-ask for what was already supplied.
    if slots.dimensions.is_none()
        && matches!(
            intent,
            Intent::CostEstimate | Intent::DiyGuide | Intent::DesignVisualization
        )
    {
        candidates.push(question("q_dimensions", "What are the room's dimensions?"));
    }
    if slots.budget.is_none()
        && matches!(
            intent,
            Intent::CostEstimate | Intent::ProductSearch | Intent::ContractorQuotes
        )
    {
        candidates.push(question("q_budget", "Do you have a budget in mind?"));
    }
    if slots.style.is_none()
        && matches!(intent, Intent::DesignVisualization | Intent::GeneralQuestion)
    {
        candidates.push(question("q_style", "What style are you going for?"));
    }
    if slots.materials.is_none()
        && matches!(
            intent,
            Intent::DiyGuide | Intent::CostEstimate | Intent::ProductSearch
        )
    {
        candidates.push(question("q_materials", "Any preferred materials?"));
    }
    if slots.location.is_none()
        && matches!(intent, Intent::ContractorQuotes | Intent::CostEstimate)
    {
        candidates.push(question("q_location", "What city or area are you in?"));
    }
    if scenario == Scenario::None && intent != Intent::PdfExportRequest {
        candidates.push(question(
            "q_diy_or_pro",
            "Are you planning to do this yourself, or would you rather bring in a pro?",
        ));
    }
    candidates.push(question("q_timeline", "When would you like this done?"));

    let filtered: Vec<ClarifyingQuestion> = candidates
        .into_iter()
        .filter(|q| !window.question_ids.contains(&q.id))
        .take(max)
        .collect();

    if !filtered.is_empty() {
        return (filtered, false);
    }

    let defaults = vec![
        question("q_goal", "What's the project you have in mind?"),
        question("q_timeline", "When would you like this done?"),
        question("q_budget", "Do you have a budget in mind?"),
    ];
    let defaults: Vec<ClarifyingQuestion> = defaults
        .into_iter()
        .filter(|q| !window.question_ids.contains(&q.id))
        .take(max)
        .collect();

    if defaults.is_empty() {
        (vec![], true)
    } else {
        (defaults, false)
    }
}
