//! mp-audit
//!
//! Application-level audit events for payment and sharing actions, emitted
//! through `tracing` so they land in the structured log stream.

pub mod events;
