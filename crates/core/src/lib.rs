//! VTT Tools Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for VTT Tools.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod ai;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod library;
pub mod media;
pub mod prompt_templates;
pub mod users;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
