//! The subset of Stripe's event model the unlock flow reads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";
pub const CHECKOUT_SESSION_ASYNC_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";
pub const CHECKOUT_SESSION_ASYNC_FAILED: &str = "checkout.session.async_payment_failed";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

/// Metadata keys attached to checkout sessions and their payment intents.
pub mod metadata {
    pub const ASSESSMENT_ID: &str = "assessment_id";
    pub const ADVISOR_EMAIL: &str = "advisor_email";
    pub const CHECKOUT_SESSION_ID: &str = "checkout_session_id";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Event types the unlock flow acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CheckoutCompleted,
    CheckoutExpired,
    /// A delayed payment method settled after the session completed.
    AsyncPaymentSucceeded,
    AsyncPaymentFailed,
    PaymentFailed,
    Other,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => EventKind::CheckoutCompleted,
            CHECKOUT_SESSION_EXPIRED => EventKind::CheckoutExpired,
            CHECKOUT_SESSION_ASYNC_SUCCEEDED => EventKind::AsyncPaymentSucceeded,
            CHECKOUT_SESSION_ASYNC_FAILED => EventKind::AsyncPaymentFailed,
            PAYMENT_INTENT_FAILED => EventKind::PaymentFailed,
            _ => EventKind::Other,
        }
    }

    pub fn checkout_session(&self) -> Result<CheckoutSessionObject, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    pub fn payment_intent(&self) -> Result<PaymentIntentObject, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub mode: Option<String>,
    pub payment_status: Option<String>,
    pub client_reference_id: Option<String>,
    pub customer: Option<String>,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionObject {
    /// Assessment id from metadata, falling back to `client_reference_id`.
    pub fn assessment_id(&self) -> Option<Uuid> {
        self.metadata
            .get(metadata::ASSESSMENT_ID)
            .or(self.client_reference_id.as_ref())
            .and_then(|s| s.parse().ok())
    }

    /// Payer email from metadata, then the customer fields Stripe fills in.
    pub fn payer_email(&self) -> Option<&str> {
        self.metadata
            .get(metadata::ADVISOR_EMAIL)
            .map(String::as_str)
            .or(self.customer_email.as_deref())
            .or(self
                .customer_details
                .as_ref()
                .and_then(|d| d.email.as_deref()))
    }

    pub fn is_payment_mode(&self) -> bool {
        self.mode.as_deref().is_none_or(|m| m == "payment")
    }

    /// `paid` and `no_payment_required` both settle the order. A missing
    /// status does not.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.payment_status.as_deref(),
            Some("paid") | Some("no_payment_required")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    pub customer: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentObject {
    pub fn assessment_id(&self) -> Option<Uuid> {
        self.metadata
            .get(metadata::ASSESSMENT_ID)
            .and_then(|s| s.parse().ok())
    }

    pub fn checkout_session_id(&self) -> Option<&str> {
        self.metadata
            .get(metadata::CHECKOUT_SESSION_ID)
            .map(String::as_str)
    }
}
