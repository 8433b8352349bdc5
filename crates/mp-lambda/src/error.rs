use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use mp_auth::error::AuthError;
use mp_billing::error::{CheckoutError, WebhookError};
use mp_mail::error::MailError;
use mp_scoring::error::ScoringError;
use mp_storage::error::StorageError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    /// A third-party service failed; its status is passed through.
    Upstream { status: u16, message: String },
    /// A required setting is missing.
    Config(String),
    Internal(String),
}

/// Client-facing text for any missing setting.
pub const CONFIG_ERROR_MESSAGE: &str = "service is not configured";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream { status, message } => {
                tracing::warn!(status, "upstream error: {message}");
                (
                    StatusCode::from_u16(status)
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::BAD_GATEWAY),
                    message,
                )
            }
            ApiError::Config(msg) => {
                tracing::error!("configuration error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, CONFIG_ERROR_MESSAGE.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { table, key } => {
                ApiError::NotFound(format!("{table} row not found: {key}"))
            }
            StorageError::Conflict { table, key } => {
                ApiError::Conflict(format!("{table} row already exists: {key}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Config(msg) => ApiError::Config(msg),
            CheckoutError::BadRequest(msg) => ApiError::BadRequest(msg),
            e @ CheckoutError::NotFound(_) => ApiError::NotFound(e.to_string()),
            e @ CheckoutError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            e @ (CheckoutError::NotCompleted(_) | CheckoutError::AlreadyPaid(_)) => {
                ApiError::Conflict(e.to_string())
            }
            CheckoutError::Provider(e) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: e.to_string(),
            },
            CheckoutError::Storage(e) => e.into(),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::MissingSecret => ApiError::Config(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::Validation(msg) => ApiError::BadRequest(msg),
            MailError::Config(msg) => ApiError::Config(msg),
            MailError::Upstream { status, message } => ApiError::Upstream { status, message },
            MailError::Request(msg) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: msg,
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Config(msg) => ApiError::Config(msg),
            AuthError::Supabase { status, message } => ApiError::Upstream { status, message },
            AuthError::Request(msg) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: msg,
            },
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status(e: impl Into<ApiError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn checkout_errors_map_to_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(status(CheckoutError::Config("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(CheckoutError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(CheckoutError::NotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status(CheckoutError::Forbidden(id)), StatusCode::FORBIDDEN);
        assert_eq!(status(CheckoutError::NotCompleted(id)), StatusCode::CONFLICT);
        assert_eq!(status(CheckoutError::AlreadyPaid(id)), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_status_is_propagated() {
        let e = MailError::Upstream {
            status: 422,
            message: "bad from".into(),
        };
        assert_eq!(status(e), StatusCode::UNPROCESSABLE_ENTITY);

        let odd = ApiError::Upstream {
            status: 200,
            message: "?".into(),
        };
        assert_eq!(odd.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn config_errors_hide_the_setting_name() {
        let resp = ApiError::Config("SUPABASE_JWT_SECRET is not set".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], CONFIG_ERROR_MESSAGE);
    }

    #[test]
    fn webhook_errors_map_to_statuses() {
        assert_eq!(status(WebhookError::MissingSecret), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(WebhookError::MissingSignature), StatusCode::BAD_REQUEST);
        assert_eq!(status(WebhookError::InvalidSignature), StatusCode::BAD_REQUEST);
    }
}
