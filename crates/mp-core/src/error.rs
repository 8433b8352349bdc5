use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}
