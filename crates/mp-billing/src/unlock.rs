//! Apply verified payment events to orders, assessments and results.
//!
//! Each write is awaited on its own and a failure is logged without
//! aborting independent writes. The one dependency kept is that a result is
//! unlocked only after its assessment was marked paid.

use jiff::Timestamp;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use mp_audit::events::AuditEvent;
use mp_core::models::order::{Order, OrderStatus};
use mp_storage::AssessmentRepository;

use crate::events::{CheckoutSessionObject, Event, EventKind, PaymentIntentObject};

/// Which writes a settled checkout delivery achieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockOutcome {
    pub assessment_id: Uuid,
    pub checkout_session_id: String,
    pub payer_email: Option<String>,
    pub order_recorded: bool,
    pub assessment_paid: bool,
    pub result_unlocked: bool,
}

impl UnlockOutcome {
    pub fn is_complete(&self) -> bool {
        self.order_recorded && self.assessment_paid && self.result_unlocked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WebhookAction {
    Unlocked(UnlockOutcome),
    /// Session completed but payment is still settling; order kept pending.
    AwaitingPayment { checkout_session_id: String },
    OrderStatusUpdated {
        checkout_session_id: String,
        status: OrderStatus,
        applied: bool,
    },
    Skipped { reason: String },
    Ignored { event_type: String },
}

/// Dispatch a verified event. Never fails: problems are logged and reported
/// in the returned action.
pub async fn handle_event(repo: &dyn AssessmentRepository, event: &Event) -> WebhookAction {
    info!(event_id = %event.id, event_type = %event.event_type, "stripe webhook received");

    match event.kind() {
        EventKind::CheckoutCompleted | EventKind::AsyncPaymentSucceeded => {
            match event.checkout_session() {
                Ok(session) => checkout_completed(repo, &event.id, &session).await,
                Err(e) => skipped(&event.id, format!("malformed checkout session: {e}")),
            }
        }
        EventKind::CheckoutExpired => match event.checkout_session() {
            Ok(session) => set_order_status(repo, &session.id, OrderStatus::Expired).await,
            Err(e) => skipped(&event.id, format!("malformed checkout session: {e}")),
        },
        EventKind::AsyncPaymentFailed => match event.checkout_session() {
            Ok(session) => set_order_status(repo, &session.id, OrderStatus::Failed).await,
            Err(e) => skipped(&event.id, format!("malformed checkout session: {e}")),
        },
        EventKind::PaymentFailed => match event.payment_intent() {
            Ok(intent) => payment_failed(repo, &event.id, &intent).await,
            Err(e) => skipped(&event.id, format!("malformed payment intent: {e}")),
        },
        EventKind::Other => {
            info!(event_type = %event.event_type, "ignoring unhandled stripe event");
            WebhookAction::Ignored {
                event_type: event.event_type.clone(),
            }
        }
    }
}

fn skipped(event_id: &str, reason: String) -> WebhookAction {
    warn!(event_id, reason = %reason, "skipping stripe event");
    WebhookAction::Skipped { reason }
}

async fn checkout_completed(
    repo: &dyn AssessmentRepository,
    event_id: &str,
    session: &CheckoutSessionObject,
) -> WebhookAction {
    if !session.is_payment_mode() {
        return skipped(event_id, format!("session {} is not a one-time payment", session.id));
    }
    let Some(assessment_id) = session.assessment_id() else {
        return skipped(event_id, format!("session {} has no assessment id", session.id));
    };
    let payer_email = session.payer_email().map(str::to_string);

    let now = Timestamp::now();
    let settled = session.is_settled();
    let order = Order {
        checkout_session_id: session.id.clone(),
        payment_intent_id: session.payment_intent.clone(),
        customer_id: session.customer.clone(),
        amount: session.amount_total,
        currency: session.currency.clone(),
        status: if settled {
            OrderStatus::Paid
        } else {
            OrderStatus::Pending
        },
        assessment_id,
        metadata: serde_json::to_value(&session.metadata).unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    let order_recorded = match repo.upsert_order(&order).await {
        Ok(()) => true,
        Err(e) => {
            error!(session_id = %session.id, error = %e, "failed to upsert order");
            false
        }
    };

    if !settled {
        info!(session_id = %session.id, "checkout completed, payment not yet settled");
        return WebhookAction::AwaitingPayment {
            checkout_session_id: session.id.clone(),
        };
    }

    let assessment_paid = match repo.mark_assessment_paid(assessment_id, now).await {
        Ok(()) => true,
        Err(e) => {
            error!(assessment_id = %assessment_id, error = %e, "failed to mark assessment paid");
            false
        }
    };

    let result_unlocked = if assessment_paid {
        match repo.unlock_result(assessment_id, &session.id, now).await {
            Ok(()) => true,
            Err(e) => {
                error!(assessment_id = %assessment_id, error = %e, "failed to unlock result");
                false
            }
        }
    } else {
        warn!(assessment_id = %assessment_id, "result left locked because assessment is not marked paid");
        false
    };

    let outcome = UnlockOutcome {
        assessment_id,
        checkout_session_id: session.id.clone(),
        payer_email,
        order_recorded,
        assessment_paid,
        result_unlocked,
    };

    AuditEvent::new(
        "assessment_unlocked",
        "assessment",
        assessment_id.to_string(),
        outcome.payer_email.as_deref().unwrap_or("stripe"),
    )
    .with_details(serde_json::json!({
        "event_id": event_id,
        "checkout_session_id": session.id,
        "complete": outcome.is_complete(),
    }))
    .emit();

    WebhookAction::Unlocked(outcome)
}

async fn set_order_status(
    repo: &dyn AssessmentRepository,
    checkout_session_id: &str,
    status: OrderStatus,
) -> WebhookAction {
    let applied = match repo.update_order_status(checkout_session_id, status).await {
        Ok(()) => true,
        Err(e) => {
            error!(session_id = checkout_session_id, status = status.as_str(), error = %e, "failed to update order status");
            false
        }
    };
    WebhookAction::OrderStatusUpdated {
        checkout_session_id: checkout_session_id.to_string(),
        status,
        applied,
    }
}

async fn payment_failed(
    repo: &dyn AssessmentRepository,
    event_id: &str,
    intent: &PaymentIntentObject,
) -> WebhookAction {
    if let Some(session_id) = intent.checkout_session_id() {
        return set_order_status(repo, session_id, OrderStatus::Failed).await;
    }

    let Some(assessment_id) = intent.assessment_id() else {
        return skipped(
            event_id,
            format!("payment intent {} has no assessment id", intent.id),
        );
    };

    // The latest pending order for the assessment is the one that failed.
    let orders = match repo.list_orders(assessment_id).await {
        Ok(orders) => orders,
        Err(e) => {
            error!(assessment_id = %assessment_id, error = %e, "failed to list orders");
            return skipped(event_id, format!("could not load orders: {e}"));
        }
    };
    let target = orders
        .iter()
        .rev()
        .find(|o| o.payment_intent_id.as_deref() == Some(intent.id.as_str()))
        .or_else(|| orders.iter().rev().find(|o| o.status == OrderStatus::Pending));

    match target {
        Some(order) => set_order_status(repo, &order.checkout_session_id, OrderStatus::Failed).await,
        None => skipped(
            event_id,
            format!("no order found for payment intent {}", intent.id),
        ),
    }
}
