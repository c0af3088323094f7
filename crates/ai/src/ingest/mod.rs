//! Bulk asset ingest: draft assets, queued portrait/token generation and review.

mod service;
mod worker;

pub use service::IngestService;
pub use worker::{spawn_ingest_worker, IngestQueue};
