// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slot-filling state scanned from conversation text.
//!
//! Tracks which parameters (dimensions, budget, materials, ...) the user has
//! already supplied so clarifying questions never re-ask for them.

use std::sync::OnceLock;

use regex::Regex;

/// Parameters already supplied somewhere in the conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotState {
    pub dimensions: Option<String>,
    pub budget: Option<String>,
    pub materials: Option<String>,
    pub style: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
}

fn dimensions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d+\s*(?:x|by)\s*\d+(?:\s*(?:ft|feet|m|meters))?|\d+\s*(?:sq\.?\s?ft|square\s+feet))\b")
            .expect("dimensions regex compiles")
    })
}

fn budget_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\s?\d[\d,]*(?:\.\d+)?k?").expect("budget regex compiles")
    })
}

const MATERIAL_KEYWORDS: &[&str] = &[
    "paint", "tile", "hardwood", "laminate", "vinyl", "drywall", "lumber", "plywood",
    "granite", "quartz", "carpet", "wallpaper", "grout", "concrete",
];

const STYLE_KEYWORDS: &[&str] = &[
    "modern", "farmhouse", "minimalist", "industrial", "scandinavian", "rustic",
    "mid-century", "traditional", "bohemian", "coastal",
];

const JOB_TYPE_KEYWORDS: &[&str] = &[
    "plumbing", "plumber", "electrical", "electrician", "roofing", "roofer",
    "painting", "painter", "flooring", "hvac", "carpentry", "carpenter",
    "landscaping", "tiling", "drywall", "remodel",
];

/// Canonical trade name for a detected job-type keyword.
fn canonical_job_type(keyword: &str) -> &'static str {
    match keyword {
        "plumber" | "plumbing" => "plumbing",
        "electrician" | "electrical" => "electrical",
        "roofer" | "roofing" => "roofing",
        "painter" | "painting" => "painting",
        "carpenter" | "carpentry" => "carpentry",
        "flooring" => "flooring",
        "hvac" => "hvac",
        "landscaping" => "landscaping",
        "tiling" => "tiling",
        "drywall" => "drywall",
        _ => "general contractor",
    }
}

impl SlotState {
    /// Scans message texts (oldest to newest) and fills every detectable slot.
    /// Later mentions win.
    pub fn scan<'a, I: IntoIterator<Item = &'a str>>(texts: I) -> Self {
        let mut state = SlotState::default();
        for text in texts {
            state.absorb(text);
        }
        state
    }

    /// Absorbs one message text into the slot state.
    pub fn absorb(&mut self, text: &str) {
        let lower = text.to_lowercase();

        if let Some(m) = dimensions_re().find(text) {
            self.dimensions = Some(m.as_str().trim().to_string());
        }
        if let Some(m) = budget_re().find(text) {
            self.budget = Some(m.as_str().trim().to_string());
        }
        if let Some(material) = MATERIAL_KEYWORDS.iter().find(|k| lower.contains(*k)) {
            self.materials = Some((*material).to_string());
        }
        if let Some(style) = STYLE_KEYWORDS.iter().find(|k| lower.contains(*k)) {
            self.style = Some((*style).to_string());
        }
        if let Some(keyword) = JOB_TYPE_KEYWORDS.iter().find(|k| lower.contains(*k)) {
            self.job_type = Some(canonical_job_type(keyword).to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_detects_dimensions() {
        let s = SlotState::scan(["my bedroom is 12x14 feet"]);
        assert_eq!(s.dimensions.as_deref(), Some("12x14 feet"));

        let s = SlotState::scan(["about 200 sq ft of tile"]);
        assert!(s.dimensions.is_some());
        assert_eq!(s.materials.as_deref(), Some("tile"));
    }

    #[test]
    fn scan_detects_budget() {
        let s = SlotState::scan(["I can spend $1,500 on this"]);
        assert_eq!(s.budget.as_deref(), Some("$1,500"));
    }

    #[test]
    fn scan_detects_style_and_job_type() {
        let s = SlotState::scan(["thinking farmhouse style", "need a plumber for the sink"]);
        assert_eq!(s.style.as_deref(), Some("farmhouse"));
        assert_eq!(s.job_type.as_deref(), Some("plumbing"));
    }

    #[test]
    fn later_mentions_win() {
        let s = SlotState::scan(["budget is $500", "actually I can do $900"]);
        assert_eq!(s.budget.as_deref(), Some("$900"));
    }

    #[test]
    fn empty_scan_has_no_slots() {
        let s = SlotState::scan(["hello there"]);
        assert_eq!(s, SlotState::default());
    }
}
