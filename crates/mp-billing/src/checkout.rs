//! Checkout orchestration: validate the assessment, resolve the Stripe
//! customer, open a checkout session and remember it on the assessment.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use mp_audit::events::AuditEvent;
use mp_core::models::order::Order;
use mp_storage::AssessmentRepository;

use crate::error::CheckoutError;
use crate::events::metadata;
use crate::stripe::{NewCheckoutSession, PaymentProvider};

/// Checkout settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub price_id: Option<String>,
    /// Origin of the SPA, used for default redirect URLs.
    pub app_base_url: String,
}

impl CheckoutSettings {
    pub fn default_success_url(&self, assessment_id: Uuid) -> String {
        format!(
            "{}/dashboard?checkout=success&assessment={assessment_id}",
            self.app_base_url.trim_end_matches('/')
        )
    }

    pub fn default_cancel_url(&self, assessment_id: Uuid) -> String {
        format!(
            "{}/dashboard?checkout=cancelled&assessment={assessment_id}",
            self.app_base_url.trim_end_matches('/')
        )
    }
}

/// Body of `POST /create-checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub assessment_id: String,
    #[serde(default)]
    pub advisor_email: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

/// Create a checkout session that will unlock one completed assessment.
///
/// No retry: a provider failure is returned to the caller, who may resubmit.
pub async fn create_checkout(
    repo: &dyn AssessmentRepository,
    payments: &dyn PaymentProvider,
    settings: &CheckoutSettings,
    req: CheckoutRequest,
) -> Result<CheckoutResponse, CheckoutError> {
    let price_id = settings
        .price_id
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CheckoutError::Config("price id is not set".to_string()))?;

    let assessment_id = req.assessment_id.trim();
    let advisor_email = req.advisor_email.trim();
    if assessment_id.is_empty() || advisor_email.is_empty() {
        return Err(CheckoutError::BadRequest(
            "assessmentId and advisorEmail are required".to_string(),
        ));
    }
    let assessment_id: Uuid = assessment_id
        .parse()
        .map_err(|_| CheckoutError::BadRequest(format!("invalid assessmentId: {assessment_id}")))?;

    let assessment = match repo.get_assessment(assessment_id).await {
        Ok(a) => a,
        Err(mp_storage::error::StorageError::NotFound { .. }) => {
            return Err(CheckoutError::NotFound(assessment_id));
        }
        Err(e) => return Err(e.into()),
    };

    if !assessment.is_owned_by(advisor_email) {
        return Err(CheckoutError::Forbidden(assessment_id));
    }
    if !assessment.is_completed() {
        return Err(CheckoutError::NotCompleted(assessment_id));
    }
    if assessment.is_paid {
        return Err(CheckoutError::AlreadyPaid(assessment_id));
    }

    let customer_id = payments.resolve_customer(&assessment.advisor_email).await?;

    let params = NewCheckoutSession {
        price_id: price_id.to_string(),
        customer_id: customer_id.clone(),
        client_reference_id: assessment_id.to_string(),
        success_url: req
            .success_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| settings.default_success_url(assessment_id)),
        cancel_url: req
            .cancel_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| settings.default_cancel_url(assessment_id)),
        metadata: vec![
            (metadata::ASSESSMENT_ID.to_string(), assessment_id.to_string()),
            (
                metadata::ADVISOR_EMAIL.to_string(),
                assessment.advisor_email.clone(),
            ),
        ],
    };
    let session = payments.create_checkout_session(&params).await?;
    let url = session.url.clone().ok_or_else(|| {
        CheckoutError::Provider(crate::error::BillingError::ResponseParse(
            "checkout session has no url".to_string(),
        ))
    })?;

    repo.set_checkout_session(assessment_id, &session.id).await?;

    let mut order = Order::pending(&session.id, assessment_id);
    order.customer_id = Some(customer_id);
    order.amount = session.amount_total;
    order.currency = session.currency.clone();
    order.metadata = serde_json::json!({ "advisor_email": assessment.advisor_email });
    if let Err(e) = repo.upsert_order(&order).await {
        warn!(session_id = %session.id, error = %e, "failed to record pending order");
    }

    info!(assessment_id = %assessment_id, session_id = %session.id, "checkout session created");
    AuditEvent::new(
        "checkout_created",
        "assessment",
        assessment_id.to_string(),
        &assessment.advisor_email,
    )
    .with_details(serde_json::json!({ "checkout_session_id": session.id }))
    .emit();

    Ok(CheckoutResponse {
        session_id: session.id,
        url,
    })
}
