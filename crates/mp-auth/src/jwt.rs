use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Audience Supabase puts on tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims extracted from a Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    pub aud: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Validate an HS256 access token signed with the project's JWT secret.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<SupabaseClaims, AuthError> {
    if jwt_secret.is_empty() {
        return Err(AuthError::Config("JWT secret is empty".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.validate_exp = true;

    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let token_data = decode::<SupabaseClaims>(token, &key, &validation)?;

    if token_data.claims.sub.is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }

    Ok(token_data.claims)
}

/// Extract the token from an `Authorization: Bearer ...` header value.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}
