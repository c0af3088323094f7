//! SQLite storage implementation for user accounts and their roles.

mod model;
mod repository;

pub use model::{UserDB, UserRoleDB};
pub use repository::UserRepository;
