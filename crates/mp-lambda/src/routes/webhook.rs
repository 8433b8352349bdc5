use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use mp_billing::unlock::{handle_event, WebhookAction};
use mp_billing::webhook::construct_event;
use mp_mail::notifications;

use crate::error::ApiError;
use crate::state::AppState;

/// Stripe delivers here. Anything past signature verification is
/// acknowledged, whatever the downstream writes did.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let event = construct_event(
        &body,
        signature,
        state.config.stripe_webhook_secret.as_deref(),
    )
    .inspect_err(|e| warn!(error = %e, "rejected stripe webhook"))?;

    let action = handle_event(state.repo.as_ref(), &event).await;

    if let WebhookAction::Unlocked(outcome) = &action
        && outcome.result_unlocked
    {
        match state.repo.get_assessment(outcome.assessment_id).await {
            Ok(assessment) => state.notify("unlock_receipt", |from, links| {
                notifications::unlock_receipt(from, links, &assessment)
            }),
            Err(e) => warn!(assessment_id = %outcome.assessment_id, error = %e, "no receipt sent"),
        }
    }

    Ok(Json(json!({ "received": true })))
}
