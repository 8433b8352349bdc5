use std::ops::Range;

use mp_core::models::profile::Category;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Lowest point on the Likert scale.
pub const LIKERT_MIN: u8 = 1;

/// Highest point on the Likert scale.
pub const LIKERT_MAX: u8 = 7;

/// A group of questions that together measure one category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionGroup {
    pub category: Category,
    pub name: String,
    /// Zero-based, half-open index range into the answer list.
    #[ts(type = "{ start: number, end: number }")]
    pub indices: Range<usize>,
    pub description: Option<String>,
}

impl QuestionGroup {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Arithmetic mean of this group's answers. `None` when out of bounds.
    pub fn mean(&self, answers: &[u8]) -> Option<f64> {
        let slice = answers.get(self.indices.clone())?;
        if slice.is_empty() {
            return None;
        }
        let sum: u32 = slice.iter().map(|&a| u32::from(a)).sum();
        Some(f64::from(sum) / slice.len() as f64)
    }
}

/// Threshold rule turning a raw category mean into personality tags.
///
/// A mean at or below `low_at_most` earns `low_tag`; at or above
/// `high_at_least` earns `high_tag`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TagRule {
    pub category: Category,
    pub low_at_most: f64,
    pub low_tag: String,
    pub high_at_least: f64,
    pub high_tag: String,
}

impl TagRule {
    pub fn tag_for(&self, mean: f64) -> Option<&str> {
        if mean <= self.low_at_most {
            Some(&self.low_tag)
        } else if mean >= self.high_at_least {
            Some(&self.high_tag)
        } else {
            None
        }
    }
}

/// Scale a 1–7 mean to a whole 0–100 percentage.
pub fn to_percentage(mean: f64) -> u8 {
    (mean / f64::from(LIKERT_MAX) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct AnswerError {
    pub index: usize,
    pub value: u8,
    pub message: String,
}
