use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::address::{AddressInput, Mailbox, Recipients};
use crate::error::MailError;

const RESEND_API: &str = "https://api.resend.com";

/// A validated message ready to hand to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Body of `POST /send-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub from: Option<AddressInput>,
    pub to: Option<Recipients>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html: String,
}

impl SendEmailRequest {
    /// Validate the request; `default_from` is used when `from` is absent.
    pub fn into_email(self, default_from: Option<&Mailbox>) -> Result<OutgoingEmail, MailError> {
        let from = match (&self.from, default_from) {
            (Some(from), _) => from.to_mailbox()?,
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(MailError::Validation("from is required".to_string()));
            }
        };
        let to = self
            .to
            .as_ref()
            .ok_or_else(|| MailError::Validation("to is required".to_string()))?
            .to_mailboxes()?;
        if self.subject.trim().is_empty() {
            return Err(MailError::Validation("subject is required".to_string()));
        }
        if self.html.trim().is_empty() {
            return Err(MailError::Validation("html is required".to_string()));
        }
        Ok(OutgoingEmail {
            from,
            to,
            subject: self.subject,
            html: self.html,
        })
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError>;
}

/// Resend REST client (JSON body, bearer API key).
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        Self::with_base_url(api_key, RESEND_API)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, MailError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(MailError::Config("Resend API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| MailError::Config(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Resend's JSON shape for a message.
pub fn resend_body(email: &OutgoingEmail) -> serde_json::Value {
    json!({
        "from": email.from.to_string(),
        "to": email.to.iter().map(Mailbox::to_string).collect::<Vec<_>>(),
        "subject": email.subject,
        "html": email.html,
    })
}

#[derive(Deserialize)]
struct ResendError {
    message: Option<String>,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        let resp = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&resend_body(email))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendError>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(MailError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SentEmail = resp
            .json()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;
        info!(email_id = %sent.id, recipients = email.to.len(), "email sent");
        Ok(sent)
    }
}
