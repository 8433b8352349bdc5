use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use mp_auth::client::SupabaseAuthClient;
use mp_auth::flows::{self, Session, SignUpResult};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

fn client(state: &AppState) -> Result<&SupabaseAuthClient, ApiError> {
    state
        .auth
        .as_ref()
        .ok_or_else(|| ApiError::Config("SUPABASE_URL and SUPABASE_ANON_KEY are required".to_string()))
}

fn require_credentials(c: &Credentials) -> Result<(), ApiError> {
    if c.email.trim().is_empty() || c.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }
    Ok(())
}

pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Credentials>,
) -> Result<Json<Session>, ApiError> {
    require_credentials(&req)?;
    let session = flows::sign_in_with_password(client(&state)?, req.email.trim(), &req.password).await?;
    Ok(Json(session))
}

pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<Session>, ApiError> {
    if req.refresh_token.is_empty() {
        return Err(ApiError::BadRequest("refreshToken is required".to_string()));
    }
    let session = flows::refresh_session(client(&state)?, &req.refresh_token).await?;
    Ok(Json(session))
}

pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Credentials>,
) -> Result<Json<SignUpResult>, ApiError> {
    require_credentials(&req)?;
    let result = flows::sign_up(
        client(&state)?,
        req.email.trim(),
        &req.password,
        req.name.as_deref(),
    )
    .await?;
    Ok(Json(result))
}
