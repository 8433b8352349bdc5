#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jiff::Timestamp;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use mp_billing::error::BillingError;
use mp_billing::stripe::{CheckoutSession, NewCheckoutSession, PaymentProvider};
use mp_core::models::assessment::{Assessment, AssessmentDetails};
use mp_core::models::friend_share::FriendAssessmentShare;
use mp_core::models::order::{Order, OrderStatus};
use mp_core::models::result::AssessmentResult;
use mp_lambda::config::Config;
use mp_lambda::state::AppState;
use mp_mail::error::MailError;
use mp_mail::mailer::SentEmail;
use mp_mail::{Mailer, OutgoingEmail};
use mp_storage::error::StorageError;
use mp_storage::{AssessmentRepository, MemoryRepository};

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough-for-hs256";
pub const WEBHOOK_SECRET: &str = "whsec_test";

#[derive(Default)]
pub struct FakeStripe {
    pub sessions: Mutex<Vec<NewCheckoutSession>>,
}

#[async_trait]
impl PaymentProvider for FakeStripe {
    async fn find_customer(&self, _email: &str) -> Result<Option<String>, BillingError> {
        Ok(Some("cus_1".to_string()))
    }

    async fn create_customer(&self, _email: &str) -> Result<String, BillingError> {
        Ok("cus_1".to_string())
    }

    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> Result<CheckoutSession, BillingError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(params.clone());
        let id = format!("cs_test_{}", sessions.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.com/{id}")),
            id,
            amount_total: Some(4900),
            currency: Some("usd".to_string()),
            customer: Some(params.customer_id.clone()),
        })
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub reject_with: Option<u16>,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        if let Some(status) = self.reject_with {
            return Err(MailError::Upstream {
                status,
                message: "rejected".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(SentEmail {
            id: "email_123".to_string(),
        })
    }
}

/// Delegates to a `MemoryRepository`. `pay_after_read` records a payment
/// right after the next assessment read hands out its copy, and
/// `fail_completions` fails that many completion writes.
pub struct HookedRepository {
    pub inner: Arc<MemoryRepository>,
    pub pay_after_read: AtomicBool,
    pub fail_completions: AtomicUsize,
}

impl HookedRepository {
    pub fn new(inner: Arc<MemoryRepository>) -> Self {
        Self {
            inner,
            pay_after_read: AtomicBool::new(false),
            fail_completions: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AssessmentRepository for HookedRepository {
    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError> {
        self.inner.create_assessment(assessment).await
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Assessment, StorageError> {
        let read = self.inner.get_assessment(id).await?;
        if self.pay_after_read.swap(false, Ordering::SeqCst) {
            self.inner.mark_assessment_paid(id, Timestamp::now()).await?;
        }
        Ok(read)
    }

    async fn list_assessments(&self, advisor_email: &str) -> Result<Vec<Assessment>, StorageError> {
        self.inner.list_assessments(advisor_email).await
    }

    async fn update_assessment_details(
        &self,
        id: Uuid,
        details: &AssessmentDetails,
    ) -> Result<Assessment, StorageError> {
        self.inner.update_assessment_details(id, details).await
    }

    async fn mark_assessment_completed(
        &self,
        id: Uuid,
        completed_at: Timestamp,
    ) -> Result<Assessment, StorageError> {
        let pending = self.fail_completions.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_completions.store(pending - 1, Ordering::SeqCst);
            return Err(StorageError::Status {
                status: 503,
                message: "connection reset".to_string(),
            });
        }
        self.inner.mark_assessment_completed(id, completed_at).await
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError> {
        self.inner.delete_assessment(id).await
    }

    async fn mark_assessment_paid(&self, id: Uuid, paid_at: Timestamp) -> Result<(), StorageError> {
        self.inner.mark_assessment_paid(id, paid_at).await
    }

    async fn set_checkout_session(
        &self,
        id: Uuid,
        checkout_session_id: &str,
    ) -> Result<(), StorageError> {
        self.inner.set_checkout_session(id, checkout_session_id).await
    }

    async fn insert_result(
        &self,
        result: &AssessmentResult,
    ) -> Result<AssessmentResult, StorageError> {
        self.inner.insert_result(result).await
    }

    async fn get_result_by_assessment(
        &self,
        assessment_id: Uuid,
    ) -> Result<AssessmentResult, StorageError> {
        self.inner.get_result_by_assessment(assessment_id).await
    }

    async fn unlock_result(
        &self,
        assessment_id: Uuid,
        checkout_session_id: &str,
        unlocked_at: Timestamp,
    ) -> Result<(), StorageError> {
        self.inner
            .unlock_result(assessment_id, checkout_session_id, unlocked_at)
            .await
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), StorageError> {
        self.inner.upsert_order(order).await
    }

    async fn get_order(&self, checkout_session_id: &str) -> Result<Order, StorageError> {
        self.inner.get_order(checkout_session_id).await
    }

    async fn list_orders(&self, assessment_id: Uuid) -> Result<Vec<Order>, StorageError> {
        self.inner.list_orders(assessment_id).await
    }

    async fn update_order_status(
        &self,
        checkout_session_id: &str,
        status: OrderStatus,
    ) -> Result<(), StorageError> {
        self.inner.update_order_status(checkout_session_id, status).await
    }

    async fn create_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        self.inner.create_friend_share(share).await
    }

    async fn get_friend_share(&self, id: Uuid) -> Result<FriendAssessmentShare, StorageError> {
        self.inner.get_friend_share(id).await
    }

    async fn update_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        self.inner.update_friend_share(share).await
    }

    async fn list_friend_shares(
        &self,
        sender_email: &str,
    ) -> Result<Vec<FriendAssessmentShare>, StorageError> {
        self.inner.list_friend_shares(sender_email).await
    }
}

pub struct TestApp {
    pub repo: Arc<MemoryRepository>,
    pub stripe: Arc<FakeStripe>,
    pub mailer: Arc<FakeMailer>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, FakeMailer::default())
    }

    pub fn build(config: Config, mailer: FakeMailer) -> Self {
        Self::assemble(config, mailer, |repo| repo as Arc<dyn AssessmentRepository>)
    }

    /// Serve through a repository wrapped around the in-memory one.
    pub fn with_repo(
        wrap: impl FnOnce(Arc<MemoryRepository>) -> Arc<dyn AssessmentRepository>,
    ) -> Self {
        Self::assemble(config(), FakeMailer::default(), wrap)
    }

    fn assemble(
        config: Config,
        mailer: FakeMailer,
        wrap: impl FnOnce(Arc<MemoryRepository>) -> Arc<dyn AssessmentRepository>,
    ) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let stripe = Arc::new(FakeStripe::default());
        let mailer = Arc::new(mailer);
        let state = AppState {
            repo: wrap(repo.clone()),
            payments: Some(stripe.clone()),
            mailer: Some(mailer.clone()),
            auth: None,
            config: Arc::new(config),
        };
        Self {
            repo,
            stripe,
            mailer,
            state,
        }
    }

    pub fn router(&self) -> Router {
        mp_lambda::app(self.state.clone())
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

pub fn config() -> Config {
    Config {
        stripe_price_id: Some("price_123".to_string()),
        stripe_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        supabase_jwt_secret: Some(JWT_SECRET.to_string()),
        mail_from: Some("Money Personality <hello@mp.app>".to_string()),
        app_base_url: "https://mp.app".to_string(),
        ..Default::default()
    }
}

pub fn token_for(email: &str) -> String {
    let exp = jiff::Timestamp::now().as_second() + 3600;
    encode(
        &Header::default(),
        &json!({
            "sub": format!("user-{email}"),
            "aud": "authenticated",
            "exp": exp,
            "email": email,
            "role": "authenticated"
        }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// 42 answers, all on the given value.
pub fn answers(value: u8) -> Value {
    json!(vec![value; 42])
}

/// Yield so background notification tasks can run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
