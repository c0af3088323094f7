//! Prompt templates module - versioned templates and placeholder resolution.

mod prompt_templates_model;
mod prompt_templates_service;
mod prompt_templates_traits;
mod template_resolver;

pub use prompt_templates_model::{
    compare_versions, is_draft_version, NewPromptTemplate, PromptTemplate, PromptTemplatePage,
    PromptTemplateSearch, PromptTemplateUpdate, TemplateScope,
};
pub use prompt_templates_service::PromptTemplateService;
pub use prompt_templates_traits::{PromptTemplateRepositoryTrait, PromptTemplateServiceTrait};
pub use template_resolver::{placeholders, resolve, resolve_template};
