//! Database models for library content.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::errors::StorageError;
use vtt_core::library::LibraryContent;

/// Database model for worlds, campaigns, adventures, encounters and assets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::library_contents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct LibraryContentDB {
    pub id: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<LibraryContentDB> for LibraryContent {
    type Error = StorageError;

    fn try_from(db: LibraryContentDB) -> Result<Self, Self::Error> {
        let kind = db.kind.parse().map_err(|_| {
            StorageError::InvalidStoredValue(format!(
                "library content {} has unknown kind '{}'",
                db.id, db.kind
            ))
        })?;
        Ok(Self {
            id: db.id,
            kind,
            parent_id: db.parent_id,
            owner_id: db.owner_id,
            name: db.name,
            description: db.description,
            is_published: db.is_published,
            is_public: db.is_public,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<LibraryContent> for LibraryContentDB {
    fn from(domain: LibraryContent) -> Self {
        Self {
            id: domain.id,
            kind: domain.kind.as_str().to_string(),
            parent_id: domain.parent_id,
            owner_id: domain.owner_id,
            name: domain.name,
            description: domain.description,
            is_published: domain.is_published,
            is_public: domain.is_public,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
