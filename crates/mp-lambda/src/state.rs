use std::sync::Arc;

use tracing::{info, warn};

use mp_auth::client::SupabaseAuthClient;
use mp_billing::checkout::CheckoutSettings;
use mp_billing::stripe::{PaymentProvider, StripeClient};
use mp_mail::error::MailError;
use mp_mail::notifications::{self, Links};
use mp_mail::{Mailbox, Mailer, OutgoingEmail, ResendMailer};
use mp_storage::{AssessmentRepository, MemoryRepository, PostgrestRepository};

use crate::config::Config;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AssessmentRepository>,
    pub payments: Option<Arc<dyn PaymentProvider>>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub auth: Option<SupabaseAuthClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the real backends for whatever the config provides.
    pub fn from_config(config: Config) -> eyre::Result<Self> {
        let repo: Arc<dyn AssessmentRepository> =
            match (&config.supabase_url, &config.supabase_service_role_key) {
                (Some(url), Some(key)) => {
                    info!(url = %url, "using Supabase data store");
                    Arc::new(PostgrestRepository::new(url, key)?)
                }
                _ => {
                    warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY not set, using in-memory store");
                    Arc::new(MemoryRepository::new())
                }
            };

        let payments = match &config.stripe_secret_key {
            Some(key) => Some(Arc::new(StripeClient::new(key.clone())?) as Arc<dyn PaymentProvider>),
            None => {
                warn!("STRIPE_SECRET_KEY not set, checkout disabled");
                None
            }
        };

        let mailer = match &config.resend_api_key {
            Some(key) => Some(Arc::new(ResendMailer::new(key.clone())?) as Arc<dyn Mailer>),
            None => {
                warn!("RESEND_API_KEY not set, email disabled");
                None
            }
        };

        let auth = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(SupabaseAuthClient::new(url, key.clone())?),
            _ => None,
        };

        Ok(Self {
            repo,
            payments,
            mailer,
            auth,
            config: Arc::new(config),
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            price_id: self.config.stripe_price_id.clone(),
            app_base_url: self.config.app_base_url.clone(),
        }
    }

    pub fn links(&self) -> Links {
        Links {
            app_base_url: self.config.app_base_url.clone(),
        }
    }

    /// Sender for outgoing mail, from `MAIL_FROM`.
    pub fn mail_from(&self) -> Option<Mailbox> {
        let raw = self.config.mail_from.as_deref()?;
        match raw.parse() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                warn!(mail_from = raw, error = %e, "MAIL_FROM is not a valid address");
                None
            }
        }
    }

    /// Fire-and-forget notification. Skipped when mail is not configured.
    pub fn notify<F>(&self, kind: &'static str, build: F)
    where
        F: FnOnce(&Mailbox, &Links) -> Result<OutgoingEmail, MailError>,
    {
        let (Some(mailer), Some(from)) = (self.mailer.clone(), self.mail_from()) else {
            info!(kind, "mail not configured, skipping notification");
            return;
        };
        notifications::send_in_background(mailer, build(&from, &self.links()), kind);
    }
}
