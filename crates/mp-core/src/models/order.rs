use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Audit record of one payment attempt, keyed by its checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub checkout_session_id: String,
    pub payment_intent_id: Option<String>,
    pub customer_id: Option<String>,
    /// Minor currency units (cents).
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub status: OrderStatus,
    pub assessment_id: Uuid,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Order {
    pub fn pending(checkout_session_id: impl Into<String>, assessment_id: Uuid) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            checkout_session_id: checkout_session_id.into(),
            payment_intent_id: None,
            customer_id: None,
            amount: None,
            currency: None,
            status: OrderStatus::Pending,
            assessment_id,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Expired => "expired",
            OrderStatus::Failed => "failed",
        }
    }
}
