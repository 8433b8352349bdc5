use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the five money-personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Category {
    Emotions,
    Outlook,
    Focus,
    Influence,
    RiskTolerance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Emotions,
        Category::Outlook,
        Category::Focus,
        Category::Influence,
        Category::RiskTolerance,
    ];

    /// Human-readable label, e.g. "Risk Tolerance".
    pub fn label(self) -> &'static str {
        match self {
            Category::Emotions => "Emotions",
            Category::Outlook => "Outlook",
            Category::Focus => "Focus",
            Category::Influence => "Influence",
            Category::RiskTolerance => "Risk Tolerance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A scored money-personality profile.
///
/// Derived from a completed questionnaire and never edited; a new set of
/// answers produces a new profile. The camelCase wire shape is what the SPA
/// renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Profile {
    pub emotions: u8,
    pub outlook: u8,
    pub focus: u8,
    pub influence: u8,
    pub risk_tolerance: u8,
    pub personalities: Vec<String>,
    /// Raw 1–7 answer average per category.
    #[serde(default)]
    pub personality_scores: BTreeMap<Category, f64>,
}

impl Profile {
    /// The 0–100 percentage for a category.
    pub fn percentage(&self, category: Category) -> u8 {
        match category {
            Category::Emotions => self.emotions,
            Category::Outlook => self.outlook,
            Category::Focus => self.focus,
            Category::Influence => self.influence,
            Category::RiskTolerance => self.risk_tolerance,
        }
    }

    pub fn raw_score(&self, category: Category) -> Option<f64> {
        self.personality_scores.get(&category).copied()
    }
}
