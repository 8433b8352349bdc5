use thiserror::Error;
use uuid::Uuid;

use mp_storage::error::StorageError;

/// Failures talking to the payment provider.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("payment provider request failed: {0}")]
    Request(String),

    #[error("payment provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("payment provider response parsing failed: {0}")]
    ResponseParse(String),

    #[error("payment provider config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(e: reqwest::Error) -> Self {
        BillingError::Request(e.to_string())
    }
}

/// Failures of the checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout is not configured: {0}")]
    Config(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("assessment not found: {0}")]
    NotFound(Uuid),

    #[error("assessment {0} belongs to another advisor")]
    Forbidden(Uuid),

    #[error("assessment {0} has not been completed yet")]
    NotCompleted(Uuid),

    #[error("assessment {0} is already paid")]
    AlreadyPaid(Uuid),

    #[error(transparent)]
    Provider(#[from] BillingError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CheckoutError {
    fn from(e: StorageError) -> Self {
        CheckoutError::Storage(e)
    }
}

/// Failures verifying or decoding a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook signing secret is not configured")]
    MissingSecret,

    #[error("missing stripe-signature header")]
    MissingSignature,

    #[error("webhook signature verification failed")]
    InvalidSignature,

    #[error("webhook timestamp outside tolerance ({age_secs}s)")]
    StaleTimestamp { age_secs: i64 },

    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}
