//! mp-mail
//!
//! Transactional email: address parsing, the Resend-backed `Mailer`, and the
//! notification messages the app sends on assessment events.

pub mod address;
pub mod error;
pub mod mailer;
pub mod notifications;

pub use address::Mailbox;
pub use mailer::{Mailer, OutgoingEmail, ResendMailer};
