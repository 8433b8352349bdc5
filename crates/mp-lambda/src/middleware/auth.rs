use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use mp_auth::jwt::{bearer_token, validate_token};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT validation middleware.
///
/// Extracts the `Authorization: Bearer <token>` header and validates it
/// against the Supabase JWT secret. On success, inserts `AuthUser` into
/// request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let secret = state
        .config
        .supabase_jwt_secret
        .as_deref()
        .ok_or_else(|| ApiError::Config("SUPABASE_JWT_SECRET is not set".to_string()))?;

    let user = {
        let header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let claims = validate_token(bearer_token(header)?, secret)?;
        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ApiError::Unauthorized("token has no email claim".to_string()))?;
        AuthUser {
            sub: claims.sub,
            email: mp_core::models::assessment::normalize_email(&email),
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Authenticated user extracted from JWT claims.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub sub: String,
    /// Lowercased.
    pub email: String,
}
