use axum::extract::State;
use axum::Json;

use mp_billing::checkout::{create_checkout, CheckoutRequest, CheckoutResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn create_checkout_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let payments = state
        .payments
        .as_deref()
        .ok_or_else(|| ApiError::Config("STRIPE_SECRET_KEY is not set".to_string()))?;
    let resp = create_checkout(
        state.repo.as_ref(),
        payments,
        &state.checkout_settings(),
        req,
    )
    .await?;
    Ok(Json(resp))
}
