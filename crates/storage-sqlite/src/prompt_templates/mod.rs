//! SQLite storage implementation for prompt templates.

mod model;
mod repository;

pub use model::PromptTemplateDB;
pub use repository::PromptTemplateRepository;
