//! Filesystem-backed media store with its metadata kept in SQLite.

mod model;
mod store;

pub use model::MediaResourceDB;
pub use store::MediaStore;
