mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use mp_billing::webhook::signature_header;
use mp_core::models::assessment::{Assessment, AssessmentStatus};
use mp_core::models::result::AssessmentResult;
use mp_lambda::config::Config;
use mp_storage::AssessmentRepository;

use common::*;

const ADVISOR: &str = "adv@firm.com";

async fn completed(app: &TestApp) -> Assessment {
    let mut a = Assessment::new_sent(ADVISOR, "Ada", "cal@mail.com", "Cal");
    a.status = AssessmentStatus::Completed;
    a.completed_at = Some(jiff::Timestamp::now());
    app.repo.create_assessment(&a).await.unwrap();
    let profile = mp_scoring::calculate_profile(&[4; 42]).unwrap();
    app.repo
        .insert_result(&AssessmentResult::new_locked(a.id, profile, vec![4; 42]))
        .await
        .unwrap();
    a
}

fn webhook(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/stripe-webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn completed_payload(a: &Assessment) -> String {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "mode": "payment",
            "payment_status": "paid",
            "client_reference_id": a.id.to_string(),
            "amount_total": 4900,
            "currency": "usd",
            "metadata": { "assessment_id": a.id.to_string(), "advisor_email": ADVISOR }
        }}
    })
    .to_string()
}

fn sign(payload: &str) -> String {
    signature_header(payload.as_bytes(), jiff::Timestamp::now().as_second(), WEBHOOK_SECRET).unwrap()
}

#[tokio::test]
async fn checkout_returns_session_url() {
    let app = TestApp::new();
    let a = completed(&app).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/create-checkout",
            None,
            json!({ "assessmentId": a.id, "advisorEmail": "ADV@firm.com" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/cs_test_1");
    assert_eq!(
        app.repo.get_assessment(a.id).await.unwrap().last_checkout_session_id.as_deref(),
        Some("cs_test_1")
    );
}

#[tokio::test]
async fn checkout_for_incomplete_assessment_is_rejected() {
    let app = TestApp::new();
    let a = Assessment::new_sent(ADVISOR, "Ada", "cal@mail.com", "Cal");
    app.repo.create_assessment(&a).await.unwrap();

    let (status, body) = app
        .send(json_request(
            "POST",
            "/create-checkout",
            None,
            json!({ "assessmentId": a.id, "advisorEmail": ADVISOR }),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not been completed"));
    assert!(app.stripe.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_requires_fields_and_price() {
    let app = TestApp::new();
    let (status, _) = app
        .send(json_request("POST", "/create-checkout", None, json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let app = TestApp::with_config(Config {
        stripe_price_id: None,
        ..config()
    });
    let a = completed(&app).await;
    let (status, _) = app
        .send(json_request(
            "POST",
            "/create-checkout",
            None,
            json!({ "assessmentId": a.id, "advisorEmail": ADVISOR }),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn checkout_with_mistyped_body_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(json_request("POST", "/create-checkout", None, json!({ "assessmentId": 5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let req = Request::builder()
        .method("POST")
        .uri("/create-checkout")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(app.stripe.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_without_signature_is_rejected_untouched() {
    let app = TestApp::new();
    let a = completed(&app).await;

    let (status, _) = app.send(webhook(&completed_payload(&a), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.repo.get_assessment(a.id).await.unwrap().is_paid);
    assert_eq!(app.repo.order_count().await, 0);
}

#[tokio::test]
async fn webhook_with_tampered_payload_is_rejected() {
    let app = TestApp::new();
    let a = completed(&app).await;
    let signature = sign(&completed_payload(&a));
    let tampered = completed_payload(&a).replace("4900", "1");

    let (status, _) = app.send(webhook(&tampered, Some(signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.repo.get_result_by_assessment(a.id).await.unwrap().is_unlocked);
}

#[tokio::test]
async fn webhook_without_secret_is_server_error() {
    let app = TestApp::with_config(Config {
        stripe_webhook_secret: None,
        ..config()
    });
    let a = completed(&app).await;
    let payload = completed_payload(&a);

    let (status, body) = app.send(webhook(&payload, Some(sign(&payload)))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "service is not configured");
}

#[tokio::test]
async fn signed_completion_unlocks_and_is_idempotent() {
    let app = TestApp::new();
    let a = completed(&app).await;
    let payload = completed_payload(&a);

    for _ in 0..2 {
        let (status, body) = app.send(webhook(&payload, Some(sign(&payload)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "received": true }));
    }

    assert!(app.repo.get_assessment(a.id).await.unwrap().is_paid);
    assert!(app.repo.get_result_by_assessment(a.id).await.unwrap().is_unlocked);
    assert_eq!(app.repo.order_count().await, 1);

    settle().await;
    let sent = app.mailer.sent.lock().unwrap();
    assert!(sent.iter().any(|e| e.subject.starts_with("Report unlocked")));
}

#[tokio::test]
async fn unhandled_event_is_acknowledged() {
    let app = TestApp::new();
    let payload = json!({ "id": "evt_2", "type": "customer.created", "data": { "object": {} } })
        .to_string();

    let (status, body) = app.send(webhook(&payload, Some(sign(&payload)))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn send_email_accepts_named_and_object_addresses() {
    let app = TestApp::new();
    let (status, body) = app
        .send(json_request(
            "POST",
            "/send-email",
            None,
            json!({
                "from": "MP <hello@mp.app>",
                "to": ["Cal <cal@mail.com>", { "email": "ada@firm.com", "name": "Ada" }],
                "subject": "Your results",
                "html": "<p>Hi</p>"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Email sent successfully", "id": "email_123" }));
    let sent = app.mailer.sent.lock().unwrap();
    assert_eq!(sent[0].to.len(), 2);
    assert_eq!(sent[0].to[1].to_string(), "Ada <ada@firm.com>");
}

#[tokio::test]
async fn send_email_rejects_bad_addresses() {
    let app = TestApp::new();
    let (status, _) = app
        .send(json_request(
            "POST",
            "/send-email",
            None,
            json!({ "to": "not an email", "subject": "s", "html": "h" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_email_propagates_provider_status() {
    let app = TestApp::build(
        config(),
        FakeMailer {
            reject_with: Some(422),
            ..Default::default()
        },
    );
    let (status, body) = app
        .send(json_request(
            "POST",
            "/send-email",
            None,
            json!({ "to": "cal@mail.com", "subject": "s", "html": "h" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "rejected");
}
