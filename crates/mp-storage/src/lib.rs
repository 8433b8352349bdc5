//! mp-storage
//!
//! Persistence for assessments, results, orders and friend shares.
//! A typed repository trait with a Supabase PostgREST backend and an
//! in-memory backend.

pub mod error;
pub mod memory;
pub mod postgrest;
pub mod repository;

pub use memory::MemoryRepository;
pub use postgrest::PostgrestRepository;
pub use repository::AssessmentRepository;
