//! Stripe webhook signature verification.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`. The
//! signed payload is `"{t}.{raw body}"` under HMAC-SHA256 with the endpoint's
//! signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::WebhookError;
use crate::events::Event;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed delivery, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a delivery against the current time and decode the event.
pub fn construct_event(
    payload: &[u8],
    signature_header: Option<&str>,
    webhook_secret: Option<&str>,
) -> Result<Event, WebhookError> {
    let now = jiff::Timestamp::now().as_second();
    construct_event_at(payload, signature_header, webhook_secret, now)
}

/// Same as [`construct_event`] with an explicit clock.
pub fn construct_event_at(
    payload: &[u8],
    signature_header: Option<&str>,
    webhook_secret: Option<&str>,
    now: i64,
) -> Result<Event, WebhookError> {
    let secret = webhook_secret
        .filter(|s| !s.is_empty())
        .ok_or(WebhookError::MissingSecret)?;
    let header = signature_header
        .filter(|h| !h.trim().is_empty())
        .ok_or(WebhookError::MissingSignature)?;

    verify_signature(payload, header, secret, now, DEFAULT_TOLERANCE_SECS)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Check that one of the header's `v1` signatures matches the payload and
/// that its timestamp is within `tolerance_secs` of `now`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::InvalidSignature)?;
    if signatures.is_empty() {
        return Err(WebhookError::InvalidSignature);
    }

    let expected = sign(payload, timestamp, secret)?;
    let matched = signatures
        .iter()
        .any(|sig| bool::from(expected.as_bytes().ct_eq(sig.as_bytes())));
    if !matched {
        return Err(WebhookError::InvalidSignature);
    }

    let age_secs = now - timestamp;
    if age_secs.abs() > tolerance_secs {
        return Err(WebhookError::StaleTimestamp { age_secs });
    }

    Ok(())
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> Result<String, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a `stripe-signature` header value for `payload`.
pub fn signature_header(payload: &[u8], timestamp: i64, secret: &str) -> Result<String, WebhookError> {
    Ok(format!("t={timestamp},v1={}", sign(payload, timestamp, secret)?))
}
