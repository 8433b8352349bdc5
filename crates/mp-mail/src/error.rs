use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0}")]
    Validation(String),

    #[error("mail config error: {0}")]
    Config(String),

    #[error("mail provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("mail provider request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        MailError::Request(e.to_string())
    }
}
