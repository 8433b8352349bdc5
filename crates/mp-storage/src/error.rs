use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{table} row not found: {key}")]
    NotFound { table: String, key: String },

    #[error("{table} row already exists: {key}")]
    Conflict { table: String, key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("data store request error: {0}")]
    Request(String),

    #[error("data store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("data store config error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn not_found(table: &str, key: impl std::fmt::Display) -> Self {
        StorageError::NotFound {
            table: table.to_string(),
            key: key.to_string(),
        }
    }

    pub fn conflict(table: &str, key: impl std::fmt::Display) -> Self {
        StorageError::Conflict {
            table: table.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Request(e.to_string())
    }
}
