//! SQLite storage implementation for VTT Tools.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `vtt-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for prompt templates, library content, users and ingest
//! - The media store (metadata rows plus files under a root directory)
//! - Database-specific model types (with Diesel derives)
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//!
//! ```text
//!   core (domain)
//!        │
//!        ▼
//!   storage-sqlite (this crate)
//!        │
//!        ▼
//!    SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod ingest;
pub mod library;
pub mod media;
pub mod prompt_templates;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use ingest::IngestRepository;
pub use library::LibraryRepository;
pub use media::MediaStore;
pub use prompt_templates::PromptTemplateRepository;
pub use users::UserRepository;

// Re-export from vtt-core for convenience
pub use vtt_core::errors::{DatabaseError, Error, Result};
