use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use tracing::info;

use crate::error::BillingError;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Parameters for a one-time-payment checkout session.
#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub price_id: String,
    pub customer_id: String,
    pub client_reference_id: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Attached to both the session and its payment intent.
    pub metadata: Vec<(String, String)>,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer: Option<String>,
}

/// The payment-provider operations checkout needs.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Id of an existing customer with this email, if any.
    async fn find_customer(&self, email: &str) -> Result<Option<String>, BillingError>;

    async fn create_customer(&self, email: &str) -> Result<String, BillingError>;

    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> Result<CheckoutSession, BillingError>;

    /// Find the customer with this email or create one.
    async fn resolve_customer(&self, email: &str) -> Result<String, BillingError> {
        match self.find_customer(email).await? {
            Some(id) => Ok(id),
            None => self.create_customer(email).await,
        }
    }
}

/// Stripe REST client (form-encoded requests, bearer secret key).
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct List<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct Customer {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, BillingError> {
        Self::with_base_url(secret_key, STRIPE_API)
    }

    pub fn with_base_url(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, BillingError> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            return Err(BillingError::Config("Stripe secret key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| BillingError::Config(e.to_string()))?;
        Ok(Self {
            http,
            secret_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// Map a Stripe error response to `BillingError::Api` using its message.
async fn check_status(resp: Response) -> Result<Response, BillingError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or(text);
    Err(BillingError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, BillingError> {
    check_status(resp)
        .await?
        .json()
        .await
        .map_err(|e| BillingError::ResponseParse(e.to_string()))
}

/// Form fields for a checkout session, in Stripe's bracket notation.
pub fn checkout_form(params: &NewCheckoutSession) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("line_items[0][price]".to_string(), params.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("customer".to_string(), params.customer_id.clone()),
        (
            "client_reference_id".to_string(),
            params.client_reference_id.clone(),
        ),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
    ];
    for (key, value) in &params.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
        form.push((
            format!("payment_intent_data[metadata][{key}]"),
            value.clone(),
        ));
    }
    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn find_customer(&self, email: &str) -> Result<Option<String>, BillingError> {
        let resp = self
            .http
            .get(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await?;
        let list: List<Customer> = parse(resp).await?;
        Ok(list.data.into_iter().next().map(|c| c.id))
    }

    async fn create_customer(&self, email: &str) -> Result<String, BillingError> {
        let resp = self
            .http
            .post(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .form(&[("email", email)])
            .send()
            .await?;
        let customer: Customer = parse(resp).await?;
        info!(customer_id = %customer.id, "created stripe customer");
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        params: &NewCheckoutSession,
    ) -> Result<CheckoutSession, BillingError> {
        let resp = self
            .http
            .post(self.url("checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(params))
            .send()
            .await?;
        parse(resp).await
    }
}
