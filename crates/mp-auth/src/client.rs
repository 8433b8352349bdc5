use std::time::Duration;

use crate::error::AuthError;

/// HTTP client for a project's `/auth/v1` endpoints, keyed with the public
/// anon key.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
}

impl SupabaseAuthClient {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Result<Self, AuthError> {
        let anon_key = anon_key.into();
        if project_url.trim().is_empty() || anon_key.is_empty() {
            return Err(AuthError::Config(
                "Supabase URL and anon key are required".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: project_url.trim().trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }
}
