use jsonwebtoken::{encode, EncodingKey, Header};

use mp_auth::error::AuthError;
use mp_auth::jwt::{bearer_token, validate_token, SupabaseClaims};

const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

fn claims(aud: &str, exp_offset: i64) -> SupabaseClaims {
    let now = jiff::Timestamp::now().as_second();
    SupabaseClaims {
        sub: "user-1".to_string(),
        aud: aud.to_string(),
        exp: (now + exp_offset) as u64,
        iat: Some(now as u64),
        email: Some("adv@firm.com".to_string()),
        role: Some("authenticated".to_string()),
    }
}

fn token(claims: &SupabaseClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn accepts_valid_token() {
    let t = token(&claims("authenticated", 3600), SECRET);
    let c = validate_token(&t, SECRET).unwrap();
    assert_eq!(c.sub, "user-1");
    assert_eq!(c.email.as_deref(), Some("adv@firm.com"));
}

#[test]
fn rejects_wrong_secret() {
    let t = token(&claims("authenticated", 3600), "another-secret-that-is-also-long-enough");
    assert!(matches!(
        validate_token(&t, SECRET),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn rejects_expired_token() {
    let t = token(&claims("authenticated", -3600), SECRET);
    assert!(matches!(
        validate_token(&t, SECRET),
        Err(AuthError::TokenExpired)
    ));
}

#[test]
fn rejects_anon_audience() {
    let t = token(&claims("anon", 3600), SECRET);
    assert!(matches!(
        validate_token(&t, SECRET),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn empty_secret_is_config_error() {
    let t = token(&claims("authenticated", 3600), SECRET);
    assert!(matches!(validate_token(&t, ""), Err(AuthError::Config(_))));
}

#[test]
fn bearer_prefix_is_required() {
    assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
    assert!(matches!(bearer_token("abc"), Err(AuthError::MissingToken)));
    assert!(matches!(bearer_token("Bearer  "), Err(AuthError::MissingToken)));
}
