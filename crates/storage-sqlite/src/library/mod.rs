//! SQLite storage implementation for library content.

mod model;
mod repository;

pub use model::LibraryContentDB;
pub use repository::LibraryRepository;
