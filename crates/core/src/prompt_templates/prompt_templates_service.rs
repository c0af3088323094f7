use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use super::prompt_templates_model::{
    compare_versions, NewPromptTemplate, PromptTemplate, PromptTemplatePage,
    PromptTemplateSearch, PromptTemplateUpdate,
};
use super::prompt_templates_traits::{PromptTemplateRepositoryTrait, PromptTemplateServiceTrait};
use crate::constants::{
    DEFAULT_TEMPLATE_VERSION, MAX_NAME_LENGTH, MAX_NEGATIVE_PROMPT_LENGTH, MAX_PROMPT_LENGTH,
    MAX_VERSION_LENGTH,
};
use crate::errors::{DatabaseError, Error, FieldError, Result, ValidationError};

const ENTITY: &str = "PromptTemplate";

/// Service for managing versioned prompt templates
pub struct PromptTemplateService {
    repository: Arc<dyn PromptTemplateRepositoryTrait>,
}

impl PromptTemplateService {
    pub fn new(repository: Arc<dyn PromptTemplateRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn ensure_unique(&self, name: &str, version: &str, excluding_id: Option<&str>) -> Result<()> {
        if self.repository.exists(name, version, excluding_id)? {
            return Err(duplicate_error(name, version));
        }
        Ok(())
    }
}

fn duplicate_error(name: &str, version: &str) -> Error {
    Error::field(
        "version",
        format!(
            "Prompt template '{}' version '{}' already exists",
            name, version
        ),
    )
}

/// A concurrent writer can claim `(name, version)` between the existence
/// check and the write; the unique index then reports the same conflict.
fn map_unique_violation(
    result: Result<PromptTemplate>,
    name: &str,
    version: &str,
) -> Result<PromptTemplate> {
    match result {
        Err(Error::Database(DatabaseError::UniqueViolation(detail))) => {
            debug!(
                "Unique index rejected '{}' version '{}': {}",
                name, version, detail
            );
            Err(duplicate_error(name, version))
        }
        other => other,
    }
}

/// Collects every field problem of a template before it is persisted.
fn validate(template: &PromptTemplate) -> Result<()> {
    let mut errors = Vec::new();

    if template.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if template.name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }

    if template.version.trim().is_empty() {
        errors.push(FieldError::new("version", "Version is required"));
    } else if template.version.chars().count() > MAX_VERSION_LENGTH {
        errors.push(FieldError::new(
            "version",
            format!("Version must be at most {} characters", MAX_VERSION_LENGTH),
        ));
    }

    if template.system_prompt.chars().count() > MAX_PROMPT_LENGTH {
        errors.push(FieldError::new(
            "systemPrompt",
            format!("System prompt must be at most {} characters", MAX_PROMPT_LENGTH),
        ));
    }

    if template.user_prompt_template.trim().is_empty() {
        errors.push(FieldError::new(
            "userPromptTemplate",
            "User prompt template is required",
        ));
    } else if template.user_prompt_template.chars().count() > MAX_PROMPT_LENGTH {
        errors.push(FieldError::new(
            "userPromptTemplate",
            format!(
                "User prompt template must be at most {} characters",
                MAX_PROMPT_LENGTH
            ),
        ));
    }

    if let Some(negative) = &template.negative_prompt_template {
        if negative.chars().count() > MAX_NEGATIVE_PROMPT_LENGTH {
            errors.push(FieldError::new(
                "negativePromptTemplate",
                format!(
                    "Negative prompt template must be at most {} characters",
                    MAX_NEGATIVE_PROMPT_LENGTH
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::Fields(errors)))
    }
}

/// Blank optional strings are stored as `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait::async_trait]
impl PromptTemplateServiceTrait for PromptTemplateService {
    fn get_template(&self, template_id: &str) -> Result<PromptTemplate> {
        self.repository
            .get_by_id(template_id)?
            .ok_or_else(|| Error::not_found(ENTITY, template_id))
    }

    fn get_latest_by_name(
        &self,
        template_name: &str,
        include_drafts: bool,
    ) -> Result<Option<PromptTemplate>> {
        let latest = self
            .repository
            .list_by_name(template_name)?
            .into_iter()
            .filter(|t| include_drafts || !t.is_draft())
            .max_by(|a, b| compare_versions(&a.version, &b.version));

        debug!(
            "Latest template for '{}' (drafts: {}): {:?}",
            template_name,
            include_drafts,
            latest.as_ref().map(|t| t.version.as_str())
        );
        Ok(latest)
    }

    fn search_templates(&self, query: PromptTemplateSearch) -> Result<PromptTemplatePage> {
        let (skip, take) = query.pagination();
        let query = PromptTemplateSearch {
            skip: Some(skip),
            take: Some(take),
            ..query
        };
        self.repository.search(&query)
    }

    async fn create_template(&self, new_template: NewPromptTemplate) -> Result<PromptTemplate> {
        let now = Utc::now().naive_utc();
        let version = non_blank(new_template.version)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_VERSION.to_string());

        let template = PromptTemplate {
            id: Uuid::now_v7().to_string(),
            name: new_template.name.trim().to_string(),
            category: new_template.category,
            version,
            system_prompt: new_template.system_prompt,
            user_prompt_template: new_template.user_prompt_template,
            negative_prompt_template: non_blank(new_template.negative_prompt_template),
            reference_image_id: non_blank(new_template.reference_image_id),
            created_at: now,
            updated_at: now,
        };

        validate(&template)?;
        self.ensure_unique(&template.name, &template.version, None)?;

        info!(
            "Creating prompt template '{}' version '{}'",
            template.name, template.version
        );
        let (name, version) = (template.name.clone(), template.version.clone());
        map_unique_violation(self.repository.insert(template).await, &name, &version)
    }

    async fn update_template(
        &self,
        template_id: &str,
        update: PromptTemplateUpdate,
    ) -> Result<PromptTemplate> {
        let existing = self.get_template(template_id)?;
        if update.is_empty() {
            return Ok(existing);
        }

        let mut template = existing.clone();
        if let Some(name) = update.name {
            template.name = name.trim().to_string();
        }
        if let Some(category) = update.category {
            template.category = category;
        }
        if let Some(version) = update.version {
            template.version = version.trim().to_string();
        }
        if let Some(system_prompt) = update.system_prompt {
            template.system_prompt = system_prompt;
        }
        if let Some(user_prompt_template) = update.user_prompt_template {
            template.user_prompt_template = user_prompt_template;
        }
        if update.negative_prompt_template.is_some() {
            template.negative_prompt_template = non_blank(update.negative_prompt_template);
        }
        if update.reference_image_id.is_some() {
            template.reference_image_id = non_blank(update.reference_image_id);
        }

        validate(&template)?;
        if template.name != existing.name || template.version != existing.version {
            self.ensure_unique(&template.name, &template.version, Some(template_id))?;
        }

        template.updated_at = Utc::now().naive_utc();
        debug!("Updating prompt template {}", template_id);
        let (name, version) = (template.name.clone(), template.version.clone());
        map_unique_violation(self.repository.update(template).await, &name, &version)
    }

    async fn delete_template(&self, template_id: &str) -> Result<()> {
        let deleted = self.repository.delete(template_id.to_string()).await?;
        if deleted == 0 {
            return Err(Error::not_found(ENTITY, template_id));
        }
        info!("Deleted prompt template {}", template_id);
        Ok(())
    }
}
