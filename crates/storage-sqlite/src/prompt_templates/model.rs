//! Database models for prompt templates.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::errors::StorageError;
use vtt_core::prompt_templates::PromptTemplate;

/// Database model for prompt templates
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::prompt_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PromptTemplateDB {
    pub id: String,
    pub name: String,
    pub category: String,
    pub version: String,
    pub system_prompt: String,
    pub user_prompt_template: String,
    pub negative_prompt_template: Option<String>,
    pub reference_image_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PromptTemplateDB> for PromptTemplate {
    type Error = StorageError;

    fn try_from(db: PromptTemplateDB) -> Result<Self, Self::Error> {
        let category = db.category.parse().map_err(|_| {
            StorageError::InvalidStoredValue(format!(
                "prompt template {} has unknown category '{}'",
                db.id, db.category
            ))
        })?;
        Ok(Self {
            id: db.id,
            name: db.name,
            category,
            version: db.version,
            system_prompt: db.system_prompt,
            user_prompt_template: db.user_prompt_template,
            negative_prompt_template: db.negative_prompt_template,
            reference_image_id: db.reference_image_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<PromptTemplate> for PromptTemplateDB {
    fn from(domain: PromptTemplate) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            category: domain.category.as_str().to_string(),
            version: domain.version,
            system_prompt: domain.system_prompt,
            user_prompt_template: domain.user_prompt_template,
            negative_prompt_template: domain.negative_prompt_template,
            reference_image_id: domain.reference_image_id,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
