use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::client::SupabaseAuthClient;
use crate::error::AuthError;

/// Tokens returned by a successful sign-in or refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outcome of a sign-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignUpResult {
    /// Email confirmation is disabled; the user is signed in.
    SignedIn { session: Session },
    /// A confirmation email was sent before the account can sign in.
    ConfirmationRequired { user_id: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "msg", alias = "message")]
    error_description: Option<String>,
}

async fn check_status(resp: Response) -> Result<Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error_description)
        .unwrap_or(text);
    if status.as_u16() == 400 || status.as_u16() == 401 {
        return Err(AuthError::AuthFailed(message));
    }
    Err(AuthError::Supabase {
        status: status.as_u16(),
        message,
    })
}

async fn token_grant(
    client: &SupabaseAuthClient,
    grant_type: &str,
    body: serde_json::Value,
) -> Result<Session, AuthError> {
    let resp = client
        .http
        .post(client.url("token"))
        .query(&[("grant_type", grant_type)])
        .header("apikey", &client.anon_key)
        .json(&body)
        .send()
        .await?;
    check_status(resp)
        .await?
        .json()
        .await
        .map_err(|e| AuthError::Request(e.to_string()))
}

/// Email/password sign-in.
pub async fn sign_in_with_password(
    client: &SupabaseAuthClient,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    info!(email, "password sign-in");
    token_grant(
        client,
        "password",
        json!({ "email": email, "password": password }),
    )
    .await
}

/// Exchange a refresh token for a new session.
pub async fn refresh_session(
    client: &SupabaseAuthClient,
    refresh_token: &str,
) -> Result<Session, AuthError> {
    token_grant(
        client,
        "refresh_token",
        json!({ "refresh_token": refresh_token }),
    )
    .await
}

/// Register a new account. The display name is stored as user metadata.
pub async fn sign_up(
    client: &SupabaseAuthClient,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<SignUpResult, AuthError> {
    info!(email, "sign-up");
    let mut body = json!({ "email": email, "password": password });
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        body["data"] = json!({ "name": name.trim() });
    }
    let resp = client
        .http
        .post(client.url("signup"))
        .header("apikey", &client.anon_key)
        .json(&body)
        .send()
        .await?;
    let body: serde_json::Value = check_status(resp)
        .await?
        .json()
        .await
        .map_err(|e| AuthError::Request(e.to_string()))?;
    parse_sign_up(body)
}

/// GoTrue answers sign-up with a session when auto-confirm is on and with a
/// bare user object otherwise.
pub fn parse_sign_up(body: serde_json::Value) -> Result<SignUpResult, AuthError> {
    if body.get("access_token").is_some() {
        let session: Session =
            serde_json::from_value(body).map_err(|e| AuthError::Request(e.to_string()))?;
        return Ok(SignUpResult::SignedIn { session });
    }
    let user_id = body
        .get("id")
        .or_else(|| body.get("user").and_then(|u| u.get("id")))
        .and_then(|v| v.as_str())
        .ok_or_else(|| AuthError::AuthFailed("sign-up returned no user".to_string()))?;
    Ok(SignUpResult::ConfirmationRequired {
        user_id: user_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_with_session_signs_in() {
        let body = json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "u1", "email": "a@b.com" }
        });
        let SignUpResult::SignedIn { session } = parse_sign_up(body).unwrap() else {
            panic!("expected session");
        };
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.expires_in, 3600);
    }

    #[test]
    fn sign_up_without_session_requires_confirmation() {
        let body = json!({ "id": "u2", "email": "a@b.com", "confirmation_sent_at": "x" });
        assert_eq!(
            parse_sign_up(body).unwrap(),
            SignUpResult::ConfirmationRequired {
                user_id: "u2".to_string()
            }
        );
    }

    #[test]
    fn sign_up_without_user_fails() {
        assert!(matches!(
            parse_sign_up(json!({})),
            Err(AuthError::AuthFailed(_))
        ));
    }
}
