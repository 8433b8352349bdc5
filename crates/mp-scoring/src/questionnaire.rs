use mp_core::models::profile::Category;

use crate::scoring::{QuestionGroup, TagRule};
use crate::Questionnaire;

/// Number of questions in the money-personality questionnaire.
pub const QUESTION_COUNT: usize = 42;

/// The money-personality questionnaire: 42 statements rated 1–7, grouped
/// into Emotions, Outlook, Focus, Influence and Risk Tolerance.
pub struct MoneyPersonality;

impl Questionnaire for MoneyPersonality {
    fn id(&self) -> &str {
        "money_personality"
    }

    fn name(&self) -> &str {
        "Money Personality"
    }

    fn groups(&self) -> &[QuestionGroup] {
        static GROUPS: std::sync::LazyLock<Vec<QuestionGroup>> = std::sync::LazyLock::new(|| {
            vec![
                group(
                    Category::Emotions,
                    0..9,
                    "How calm or uneasy money makes you feel",
                ),
                group(
                    Category::Outlook,
                    9..17,
                    "Whether you expect scarcity or abundance",
                ),
                group(
                    Category::Focus,
                    17..26,
                    "Living for today versus planning for tomorrow",
                ),
                group(
                    Category::Influence,
                    26..34,
                    "How much others shape your money decisions",
                ),
                group(
                    Category::RiskTolerance,
                    34..42,
                    "Comfort with uncertainty in pursuit of gains",
                ),
            ]
        });
        &GROUPS
    }

    fn tag_rules(&self) -> &[TagRule] {
        static RULES: std::sync::LazyLock<Vec<TagRule>> = std::sync::LazyLock::new(|| {
            vec![
                rule(Category::Emotions, "anxious", "confident"),
                rule(Category::Outlook, "cautious", "optimistic"),
                rule(Category::Focus, "spontaneous", "planner"),
                rule(Category::Influence, "independent", "socially-influenced"),
                rule(Category::RiskTolerance, "risk-averse", "risk-taker"),
            ]
        });
        &RULES
    }
}

fn group(category: Category, indices: std::ops::Range<usize>, description: &str) -> QuestionGroup {
    QuestionGroup {
        category,
        name: category.label().to_string(),
        indices,
        description: Some(description.to_string()),
    }
}

// Means of 3 or less read as the low pole, 5 or more as the high pole.
fn rule(category: Category, low_tag: &str, high_tag: &str) -> TagRule {
    TagRule {
        category,
        low_at_most: 3.0,
        low_tag: low_tag.to_string(),
        high_at_least: 5.0,
        high_tag: high_tag.to_string(),
    }
}
