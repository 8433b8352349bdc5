use thiserror::Error;

use crate::scoring::AnswerError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("expected {expected} answers, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("invalid answer: {0}")]
    InvalidAnswer(#[from] AnswerError),
}
