//! SQLite storage implementation for ingest state and generation jobs.

mod model;
mod repository;

pub use model::{IngestAssetDB, IngestJobDB, IngestJobItemDB};
pub use repository::IngestRepository;
