// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed follow-up action taxonomy.
//!
//! Every action the assistant can offer or resolve is listed here with a
//! human label and its required parameters. The resolver matches on
//! [`ActionId`] exhaustively, so an implemented action can never be
//! misreported as unsupported.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a follow-up action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    CreateDiyPlan,
    EstimateCost,
    VisualizeRoom,
    FindProducts,
    RequestContractorQuotes,
    ExportPdf,
}

impl ActionId {
    /// All taxonomy entries.
    pub const ALL: &'static [ActionId] = &[
        ActionId::CreateDiyPlan,
        ActionId::EstimateCost,
        ActionId::VisualizeRoom,
        ActionId::FindProducts,
        ActionId::RequestContractorQuotes,
        ActionId::ExportPdf,
    ];
}

/// One required parameter of an action.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// A taxonomy entry: action id, human label, required parameters.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub id: ActionId,
    pub label: &'static str,
    pub params: &'static [ParamSpec],
}

/// Returns the spec for an action.
pub fn spec(id: ActionId) -> &'static ActionSpec {
    CATALOG
        .iter()
        .find(|s| s.id == id)
        .expect("every ActionId has a catalog entry")
}

/// The full action catalog.
pub const CATALOG: &[ActionSpec] = &[
    ActionSpec {
        id: ActionId::CreateDiyPlan,
        label: "Create a step-by-step DIY plan",
        params: &[ParamSpec {
            name: "project",
            description: "what the user wants to build or fix",
        }],
    },
    ActionSpec {
        id: ActionId::EstimateCost,
        label: "Estimate the cost",
        params: &[
            ParamSpec {
                name: "project",
                description: "what the user wants to build or fix",
            },
            ParamSpec {
                name: "dimensions",
                description: "room or surface dimensions",
            },
        ],
    },
    ActionSpec {
        id: ActionId::VisualizeRoom,
        label: "Visualize the result",
        params: &[ParamSpec {
            name: "project",
            description: "the room and change to render",
        }],
    },
    ActionSpec {
        id: ActionId::FindProducts,
        label: "Find matching products",
        params: &[ParamSpec {
            name: "query",
            description: "what to shop for",
        }],
    },
    ActionSpec {
        id: ActionId::RequestContractorQuotes,
        label: "Get quotes from local pros",
        params: &[
            ParamSpec {
                name: "job_type",
                description: "the trade needed (plumbing, roofing, ...)",
            },
            ParamSpec {
                name: "location",
                description: "where the work happens",
            },
        ],
    },
    ActionSpec {
        id: ActionId::ExportPdf,
        label: "Export the plan as a PDF",
        params: &[ParamSpec {
            name: "plan",
            description: "a previously generated project plan",
        }],
    },
];
