pub mod assessments;
pub mod auth;
pub mod checkout;
pub mod email;
pub mod friend_shares;
pub mod health;
pub mod questionnaire;
pub mod webhook;
