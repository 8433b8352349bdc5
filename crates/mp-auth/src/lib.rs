//! mp-auth
//!
//! Supabase authentication: password and refresh-token flows against the
//! GoTrue API, and validation of the access tokens it issues.

pub mod client;
pub mod error;
pub mod flows;
pub mod jwt;
