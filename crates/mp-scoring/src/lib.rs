//! mp-scoring
//!
//! Money-personality questionnaire definition, profile scoring and
//! two-profile compatibility. Pure data and arithmetic, no I/O.

pub mod compatibility;
pub mod error;
pub mod questionnaire;
pub mod scoring;

use std::collections::BTreeMap;

use mp_core::models::profile::{Category, Profile};

use error::ScoringError;
use scoring::{AnswerError, QuestionGroup, TagRule, LIKERT_MAX, LIKERT_MIN};

/// Tag assigned when no threshold rule fires.
pub const BALANCED_TAG: &str = "balanced";

/// Trait implemented by a Likert questionnaire that scores into a [`Profile`].
pub trait Questionnaire: Send + Sync {
    /// Unique identifier (e.g., "money_personality").
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Disjoint question groups, one per category, covering every index.
    fn groups(&self) -> &[QuestionGroup];

    /// Threshold rules deriving personality tags from category means.
    fn tag_rules(&self) -> &[TagRule];

    /// Total number of questions.
    fn question_count(&self) -> usize {
        self.groups().iter().map(QuestionGroup::len).sum()
    }

    /// Check every answer lies on the Likert scale.
    fn validate_answers(&self, answers: &[u8]) -> Vec<AnswerError> {
        answers
            .iter()
            .enumerate()
            .filter(|&(_, &value)| !(LIKERT_MIN..=LIKERT_MAX).contains(&value))
            .map(|(index, &value)| AnswerError {
                index,
                value,
                message: format!(
                    "{}: answer {} at question {} is outside [{}, {}]",
                    self.name(),
                    value,
                    index + 1,
                    LIKERT_MIN,
                    LIKERT_MAX,
                ),
            })
            .collect()
    }

    /// Score a complete answer list into a profile.
    fn score(&self, answers: &[u8]) -> Result<Profile, ScoringError> {
        let expected = self.question_count();
        if answers.len() != expected {
            return Err(ScoringError::WrongLength {
                expected,
                actual: answers.len(),
            });
        }
        if let Some(first) = self.validate_answers(answers).into_iter().next() {
            return Err(first.into());
        }

        let mut profile = Profile {
            emotions: 0,
            outlook: 0,
            focus: 0,
            influence: 0,
            risk_tolerance: 0,
            personalities: Vec::new(),
            personality_scores: BTreeMap::new(),
        };

        for group in self.groups() {
            let Some(mean) = group.mean(answers) else {
                continue;
            };
            let percentage = scoring::to_percentage(mean);
            match group.category {
                Category::Emotions => profile.emotions = percentage,
                Category::Outlook => profile.outlook = percentage,
                Category::Focus => profile.focus = percentage,
                Category::Influence => profile.influence = percentage,
                Category::RiskTolerance => profile.risk_tolerance = percentage,
            }
            profile.personality_scores.insert(group.category, mean);
        }

        for rule in self.tag_rules() {
            if let Some(mean) = profile.personality_scores.get(&rule.category)
                && let Some(tag) = rule.tag_for(*mean)
            {
                profile.personalities.push(tag.to_string());
            }
        }

        if profile.personalities.is_empty() {
            profile.personalities.push(BALANCED_TAG.to_string());
        }

        Ok(profile)
    }
}

/// Score 42 Likert answers with the money-personality questionnaire.
pub fn calculate_profile(answers: &[u8]) -> Result<Profile, ScoringError> {
    questionnaire::MoneyPersonality.score(answers)
}
