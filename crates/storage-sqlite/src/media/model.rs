//! Database models for stored media.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::errors::StorageError;
use vtt_core::media::MediaResource;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::media_resources)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MediaResourceDB {
    pub id: String,
    pub owner_id: String,
    pub role: String,
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub created_at: NaiveDateTime,
}

impl TryFrom<MediaResourceDB> for MediaResource {
    type Error = StorageError;

    fn try_from(db: MediaResourceDB) -> Result<Self, Self::Error> {
        let role = db.role.parse().map_err(|_| {
            StorageError::InvalidStoredValue(format!(
                "media resource {} has unknown role '{}'",
                db.id, db.role
            ))
        })?;
        Ok(Self {
            id: db.id,
            owner_id: db.owner_id,
            role,
            path: db.path,
            file_name: db.file_name,
            content_type: db.content_type,
            file_size: db.file_size.max(0) as u64,
            created_at: db.created_at,
        })
    }
}

impl From<MediaResource> for MediaResourceDB {
    fn from(domain: MediaResource) -> Self {
        Self {
            id: domain.id,
            owner_id: domain.owner_id,
            role: domain.role.as_str().to_string(),
            path: domain.path,
            file_name: domain.file_name,
            content_type: domain.content_type,
            file_size: i64::try_from(domain.file_size).unwrap_or(i64::MAX),
            created_at: domain.created_at,
        }
    }
}
