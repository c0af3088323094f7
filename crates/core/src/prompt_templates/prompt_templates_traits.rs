use crate::errors::Result;
use crate::prompt_templates::prompt_templates_model::{
    NewPromptTemplate, PromptTemplate, PromptTemplatePage, PromptTemplateSearch,
    PromptTemplateUpdate,
};
use async_trait::async_trait;

/// Trait for prompt template repository operations
#[async_trait]
pub trait PromptTemplateRepositoryTrait: Send + Sync {
    fn get_by_id(&self, template_id: &str) -> Result<Option<PromptTemplate>>;
    fn list_by_name(&self, template_name: &str) -> Result<Vec<PromptTemplate>>;
    /// True when another template (not `excluding_id`) already uses `(name, version)`.
    fn exists(&self, template_name: &str, template_version: &str, excluding_id: Option<&str>)
        -> Result<bool>;
    fn search(&self, query: &PromptTemplateSearch) -> Result<PromptTemplatePage>;
    async fn insert(&self, template: PromptTemplate) -> Result<PromptTemplate>;
    async fn update(&self, template: PromptTemplate) -> Result<PromptTemplate>;
    async fn delete(&self, template_id: String) -> Result<usize>;
}

/// Trait for prompt template service operations
#[async_trait]
pub trait PromptTemplateServiceTrait: Send + Sync {
    fn get_template(&self, template_id: &str) -> Result<PromptTemplate>;

    /// Latest version of the named template, or `None` when no version matches.
    fn get_latest_by_name(
        &self,
        template_name: &str,
        include_drafts: bool,
    ) -> Result<Option<PromptTemplate>>;

    fn search_templates(&self, query: PromptTemplateSearch) -> Result<PromptTemplatePage>;

    async fn create_template(&self, new_template: NewPromptTemplate) -> Result<PromptTemplate>;

    async fn update_template(
        &self,
        template_id: &str,
        update: PromptTemplateUpdate,
    ) -> Result<PromptTemplate>;

    async fn delete_template(&self, template_id: &str) -> Result<()>;
}
