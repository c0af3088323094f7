//! Database models for ingest.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::errors::StorageError;
use vtt_core::ingest::{IngestAsset, IngestJob, IngestJobItem};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::ingest_assets)]
#[diesel(primary_key(asset_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct IngestAssetDB {
    pub asset_id: String,
    pub status: String,
    pub ai_prompt: Option<String>,
    pub category: Option<String>,
    pub asset_type: Option<String>,
    pub environment: Option<String>,
    pub portrait_id: Option<String>,
    pub token_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::ingest_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct IngestJobDB {
    pub id: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::ingest_job_items)]
#[diesel(primary_key(job_id, item_index))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct IngestJobItemDB {
    pub job_id: String,
    pub item_index: i32,
    pub asset_id: String,
    pub role: String,
    pub status: String,
    pub message: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

fn invalid(what: &str, id: &str, value: &str) -> StorageError {
    StorageError::InvalidStoredValue(format!("{} {} has unknown value '{}'", what, id, value))
}

impl TryFrom<IngestAssetDB> for IngestAsset {
    type Error = StorageError;

    fn try_from(db: IngestAssetDB) -> Result<Self, Self::Error> {
        let status = db
            .status
            .parse()
            .map_err(|_| invalid("ingest asset", &db.asset_id, &db.status))?;
        Ok(Self {
            asset_id: db.asset_id,
            status,
            ai_prompt: db.ai_prompt,
            category: db.category,
            asset_type: db.asset_type,
            environment: db.environment,
            portrait_id: db.portrait_id,
            token_id: db.token_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<IngestAsset> for IngestAssetDB {
    fn from(domain: IngestAsset) -> Self {
        Self {
            asset_id: domain.asset_id,
            status: domain.status.as_str().to_string(),
            ai_prompt: domain.ai_prompt,
            category: domain.category,
            asset_type: domain.asset_type,
            environment: domain.environment,
            portrait_id: domain.portrait_id,
            token_id: domain.token_id,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl TryFrom<IngestJobItemDB> for IngestJobItem {
    type Error = StorageError;

    fn try_from(db: IngestJobItemDB) -> Result<Self, Self::Error> {
        let role = db
            .role
            .parse()
            .map_err(|_| invalid("ingest job item of", &db.job_id, &db.role))?;
        let status = db
            .status
            .parse()
            .map_err(|_| invalid("ingest job item of", &db.job_id, &db.status))?;
        Ok(Self {
            index: db.item_index.max(0) as u32,
            asset_id: db.asset_id,
            role,
            status,
            message: db.message,
            started_at: db.started_at,
            completed_at: db.completed_at,
        })
    }
}

impl IngestJobItemDB {
    pub fn from_domain(job_id: &str, item: IngestJobItem) -> Self {
        Self {
            job_id: job_id.to_string(),
            item_index: i32::try_from(item.index).unwrap_or(i32::MAX),
            asset_id: item.asset_id,
            role: item.role.as_str().to_string(),
            status: item.status.as_str().to_string(),
            message: item.message,
            started_at: item.started_at,
            completed_at: item.completed_at,
        }
    }
}

impl IngestJobDB {
    pub fn into_domain(self, items: Vec<IngestJobItemDB>) -> Result<IngestJob, StorageError> {
        let status = self
            .status
            .parse()
            .map_err(|_| invalid("ingest job", &self.id, &self.status))?;
        let items = items
            .into_iter()
            .map(IngestJobItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IngestJob {
            id: self.id,
            status,
            items,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

impl From<&IngestJob> for IngestJobDB {
    fn from(domain: &IngestJob) -> Self {
        Self {
            id: domain.id.clone(),
            status: domain.status.as_str().to_string(),
            created_at: domain.created_at,
            started_at: domain.started_at,
            completed_at: domain.completed_at,
        }
    }
}
