#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mp_billing::error::BillingError;
use mp_billing::stripe::{CheckoutSession, NewCheckoutSession, PaymentProvider};
use mp_core::models::assessment::{Assessment, AssessmentStatus};
use mp_core::models::profile::Profile;
use mp_core::models::result::AssessmentResult;
use mp_storage::{AssessmentRepository, MemoryRepository};

/// In-test payment provider recording what it was asked to do.
#[derive(Default)]
pub struct FakeStripe {
    pub existing_customer: Option<String>,
    pub fail_sessions: bool,
    pub created_customers: AtomicUsize,
    pub sessions: Mutex<Vec<NewCheckoutSession>>,
}

#[async_trait]
impl PaymentProvider for FakeStripe {
    async fn find_customer(&self, _email: &str) -> Result<Option<String>, BillingError> {
        Ok(self.existing_customer.clone())
    }

    async fn create_customer(&self, _email: &str) -> Result<String, BillingError> {
        let n = self.created_customers.fetch_add(1, Ordering::SeqCst);
        Ok(format!("cus_new_{n}"))
    }

    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> Result<CheckoutSession, BillingError> {
        if self.fail_sessions {
            return Err(BillingError::Api {
                status: 500,
                message: "stripe is down".to_string(),
            });
        }
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(params.clone());
        let id = format!("cs_test_{}", sessions.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.com/c/pay/{id}")),
            id,
            amount_total: Some(4900),
            currency: Some("usd".to_string()),
            customer: Some(params.customer_id.clone()),
        })
    }
}

pub fn profile() -> Profile {
    Profile {
        emotions: 57,
        outlook: 57,
        focus: 57,
        influence: 57,
        risk_tolerance: 57,
        personalities: vec!["balanced".to_string()],
        personality_scores: Default::default(),
    }
}

pub const ADVISOR: &str = "adv@firm.com";

/// A completed, unpaid assessment with its locked result.
pub async fn completed_assessment(repo: &MemoryRepository) -> Assessment {
    let mut assessment = Assessment::new_sent(ADVISOR, "Ada", "client@mail.com", "Cal");
    assessment.status = AssessmentStatus::Completed;
    assessment.completed_at = Some(jiff::Timestamp::now());
    repo.create_assessment(&assessment).await.unwrap();
    repo.insert_result(&AssessmentResult::new_locked(
        assessment.id,
        profile(),
        vec![4; 42],
    ))
    .await
    .unwrap();
    assessment
}
