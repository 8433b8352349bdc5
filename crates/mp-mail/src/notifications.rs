//! Messages sent on assessment events. Delivery is fire-and-forget: a
//! failure is logged and never affects the triggering request.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use mp_core::models::assessment::Assessment;
use mp_core::models::friend_share::FriendAssessmentShare;

use crate::address::Mailbox;
use crate::error::MailError;
use crate::mailer::{Mailer, OutgoingEmail};

/// Links in notification bodies point at the SPA.
#[derive(Debug, Clone)]
pub struct Links {
    pub app_base_url: String,
}

impl Links {
    fn base(&self) -> &str {
        self.app_base_url.trim_end_matches('/')
    }

    pub fn assessment(&self, id: Uuid) -> String {
        format!("{}/assessment/{id}", self.base())
    }

    pub fn friend_share(&self, id: Uuid) -> String {
        format!("{}/friend/{id}", self.base())
    }

    pub fn dashboard(&self) -> String {
        format!("{}/dashboard", self.base())
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn display_name(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

fn recipient(email: &str, name: &str) -> Result<Mailbox, MailError> {
    Mailbox::new(email, Some(name))
}

/// Invitation to the client named on a freshly shared assessment.
pub fn assessment_invitation(
    from: &Mailbox,
    links: &Links,
    assessment: &Assessment,
) -> Result<OutgoingEmail, MailError> {
    let advisor = escape(&display_name(&assessment.advisor_name, "Your advisor"));
    let client = escape(&display_name(&assessment.client_name, "there"));
    Ok(OutgoingEmail {
        from: from.clone(),
        to: vec![recipient(&assessment.client_email, &assessment.client_name)?],
        subject: format!("{advisor} invited you to discover your Money Personality"),
        html: format!(
            "<p>Hi {client},</p>\
             <p>{advisor} would like you to take the Money Personality assessment. \
             It has 42 short questions and takes about ten minutes.</p>\
             <p><a href=\"{}\">Start the assessment</a></p>",
            links.assessment(assessment.id)
        ),
    })
}

/// Tells the advisor their client has finished.
pub fn completion_notice(
    from: &Mailbox,
    links: &Links,
    assessment: &Assessment,
) -> Result<OutgoingEmail, MailError> {
    let client = escape(&display_name(&assessment.client_name, &assessment.client_email));
    Ok(OutgoingEmail {
        from: from.clone(),
        to: vec![recipient(&assessment.advisor_email, &assessment.advisor_name)?],
        subject: format!("{client} completed their Money Personality assessment"),
        html: format!(
            "<p>{client} has completed the assessment you shared.</p>\
             <p>Unlock the full report from your <a href=\"{}\">dashboard</a>.</p>",
            links.dashboard()
        ),
    })
}

/// Receipt sent once a payment has unlocked a report.
pub fn unlock_receipt(
    from: &Mailbox,
    links: &Links,
    assessment: &Assessment,
) -> Result<OutgoingEmail, MailError> {
    let client = escape(&display_name(&assessment.client_name, &assessment.client_email));
    Ok(OutgoingEmail {
        from: from.clone(),
        to: vec![recipient(&assessment.advisor_email, &assessment.advisor_name)?],
        subject: format!("Report unlocked for {client}"),
        html: format!(
            "<p>Thank you for your purchase.</p>\
             <p>The full Money Personality report for {client} is now available on your \
             <a href=\"{}\">dashboard</a>.</p>",
            links.dashboard()
        ),
    })
}

/// Invitation from one user to a friend for a compatibility comparison.
pub fn share_invitation(
    from: &Mailbox,
    links: &Links,
    share: &FriendAssessmentShare,
) -> Result<OutgoingEmail, MailError> {
    let sender = escape(&display_name(&share.sender_name, &share.sender_email));
    let friend = escape(&display_name(&share.friend_name, "there"));
    Ok(OutgoingEmail {
        from: from.clone(),
        to: vec![recipient(&share.friend_email, &share.friend_name)?],
        subject: format!("{sender} wants to compare Money Personalities with you"),
        html: format!(
            "<p>Hi {friend},</p>\
             <p>{sender} took the Money Personality assessment and invited you to take it too, \
             so you can see how your money styles line up.</p>\
             <p><a href=\"{}\">Take the assessment</a></p>",
            links.friend_share(share.id)
        ),
    })
}

/// Tells the sender their friend finished and the comparison is ready.
pub fn share_completed(
    from: &Mailbox,
    links: &Links,
    share: &FriendAssessmentShare,
) -> Result<OutgoingEmail, MailError> {
    let friend = escape(&display_name(&share.friend_name, &share.friend_email));
    Ok(OutgoingEmail {
        from: from.clone(),
        to: vec![recipient(&share.sender_email, &share.sender_name)?],
        subject: format!("{friend} finished their Money Personality assessment"),
        html: format!(
            "<p>{friend} completed the assessment you shared.</p>\
             <p><a href=\"{}\">See your compatibility</a></p>",
            links.friend_share(share.id)
        ),
    })
}

/// Send on a background task. Must be called inside a Tokio runtime.
pub fn send_in_background(
    mailer: Arc<dyn Mailer>,
    email: Result<OutgoingEmail, MailError>,
    kind: &'static str,
) {
    let email = match email {
        Ok(email) => email,
        Err(e) => {
            error!(kind, error = %e, "could not build notification");
            return;
        }
    };
    tokio::spawn(async move {
        match mailer.send(&email).await {
            Ok(sent) => info!(kind, email_id = %sent.id, "notification sent"),
            Err(e) => error!(kind, error = %e, "notification failed"),
        }
    });
}
