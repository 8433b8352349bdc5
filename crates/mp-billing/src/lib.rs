//! mp-billing
//!
//! Stripe checkout and the payment-gated unlock of assessment results.
//! The Stripe REST API sits behind [`stripe::PaymentProvider`] so the
//! orchestration can run against a fake in tests.

pub mod checkout;
pub mod error;
pub mod events;
pub mod stripe;
pub mod unlock;
pub mod webhook;
