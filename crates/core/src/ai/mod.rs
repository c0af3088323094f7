//! AI module - content types and provider identifiers shared by the
//! generation layer, prompt templates, and configuration.

mod ai_model;

pub use ai_model::{AiProviderType, GeneratedContentType, Modality};
