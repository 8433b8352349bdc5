use axum::extract::State;
use axum::Json;
use serde::Serialize;

use mp_mail::mailer::SendEmailRequest;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SendEmailResponse {
    message: String,
    id: String,
}

pub async fn send_email(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let mailer = state
        .mailer
        .as_deref()
        .ok_or_else(|| ApiError::Config("RESEND_API_KEY is not set".to_string()))?;
    let email = req.into_email(state.mail_from().as_ref())?;
    let sent = mailer.send(&email).await?;
    Ok(Json(SendEmailResponse {
        message: "Email sent successfully".to_string(),
        id: sent.id,
    }))
}
