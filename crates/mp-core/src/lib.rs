//! mp-core
//!
//! Pure domain types and data store table conventions.
//! No network dependency. This is the shared vocabulary of the Money
//! Personality backend.

pub mod error;
pub mod models;
pub mod tables;
