use std::env;

/// Origin used for redirect and email links when `APP_BASE_URL` is unset.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";

/// Settings read once at startup. Every value is optional; an endpoint whose
/// settings are missing answers with a configuration error.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub stripe_secret_key: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_jwt_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub mail_from: Option<String>,
    pub app_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            stripe_price_id: get("STRIPE_PRICE_ID"),
            stripe_webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            supabase_url: get("SUPABASE_URL"),
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_anon_key: get("SUPABASE_ANON_KEY"),
            supabase_jwt_secret: get("SUPABASE_JWT_SECRET"),
            resend_api_key: get("RESEND_API_KEY"),
            mail_from: get("MAIL_FROM"),
            app_base_url: get("APP_BASE_URL").unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string()),
        }
    }
}
