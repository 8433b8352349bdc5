use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mp_core::models::assessment::Assessment;
use mp_mail::error::MailError;
use mp_mail::mailer::SentEmail;
use mp_mail::notifications::{completion_notice, send_in_background, Links};
use mp_mail::{Mailbox, Mailer, OutgoingEmail};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, MailError> {
        if self.fail {
            return Err(MailError::Upstream {
                status: 422,
                message: "domain not verified".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(SentEmail {
            id: "email_1".to_string(),
        })
    }
}

fn setup() -> (Mailbox, Links, Assessment) {
    (
        "MP <hello@mp.app>".parse().unwrap(),
        Links {
            app_base_url: "http://localhost:5173".to_string(),
        },
        Assessment::new_sent("adv@firm.com", "Ada", "cal@mail.com", "Cal"),
    )
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn background_send_delivers() {
    let (from, links, assessment) = setup();
    let mailer = Arc::new(RecordingMailer::default());

    send_in_background(
        mailer.clone(),
        completion_notice(&from, &links, &assessment),
        "completion_notice",
    );
    settle().await;

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to[0].email, "adv@firm.com");
}

#[tokio::test]
async fn background_failure_is_swallowed() {
    let (from, links, assessment) = setup();
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });

    send_in_background(
        mailer.clone(),
        completion_notice(&from, &links, &assessment),
        "completion_notice",
    );
    settle().await;

    assert!(mailer.sent.lock().unwrap().is_empty());
}
