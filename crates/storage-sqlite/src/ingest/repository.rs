use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use vtt_core::ingest::{
    IngestAsset, IngestAssetRows, IngestJob, IngestJobItem, IngestRepositoryTrait, IngestStatus,
    JobStatus,
};
use vtt_core::Result;

use super::model::{IngestAssetDB, IngestJobDB, IngestJobItemDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{ingest_assets, ingest_job_items, ingest_jobs};

pub struct IngestRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl IngestRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        IngestRepository { pool, writer }
    }
}

fn status_names(statuses: &[IngestStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn load_items(conn: &mut SqliteConnection, job_id: &str) -> Result<Vec<IngestJobItemDB>> {
    ingest_job_items::table
        .filter(ingest_job_items::job_id.eq(job_id))
        .order(ingest_job_items::item_index.asc())
        .select(IngestJobItemDB::as_select())
        .load::<IngestJobItemDB>(conn)
        .into_core()
}

#[async_trait]
impl IngestRepositoryTrait for IngestRepository {
    fn get_asset(&self, asset_id: &str) -> Result<Option<IngestAsset>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ingest_assets::table
            .find(asset_id)
            .select(IngestAssetDB::as_select())
            .first::<IngestAssetDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(|r| IngestAsset::try_from(r).map_err(Into::into))
            .transpose()
    }

    fn list_by_status(
        &self,
        statuses: &[IngestStatus],
        skip: u32,
        take: u32,
    ) -> Result<IngestAssetRows> {
        let mut conn = get_connection(&self.pool)?;
        let names = status_names(statuses);

        let total: i64 = ingest_assets::table
            .filter(ingest_assets::status.eq_any(&names))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        let rows = ingest_assets::table
            .filter(ingest_assets::status.eq_any(&names))
            .order((ingest_assets::updated_at.desc(), ingest_assets::asset_id.asc()))
            .offset(i64::from(skip))
            .limit(i64::from(take))
            .select(IngestAssetDB::as_select())
            .load::<IngestAssetDB>(&mut conn)
            .into_core()?;

        let items = rows
            .into_iter()
            .map(|row| IngestAsset::try_from(row).map_err(Into::into))
            .collect::<Result<Vec<_>>>()?;
        Ok(IngestAssetRows {
            items,
            total_count: total.max(0) as u64,
        })
    }

    fn get_job(&self, job_id: &str) -> Result<Option<IngestJob>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ingest_jobs::table
            .find(job_id)
            .select(IngestJobDB::as_select())
            .first::<IngestJobDB>(&mut conn)
            .optional()
            .into_core()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let items = load_items(&mut conn, job_id)?;
        Ok(Some(row.into_domain(items)?))
    }

    fn list_job_ids(&self, statuses: &[JobStatus]) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        ingest_jobs::table
            .filter(ingest_jobs::status.eq_any(names))
            .order((ingest_jobs::created_at.asc(), ingest_jobs::id.asc()))
            .select(ingest_jobs::id)
            .load::<String>(&mut conn)
            .into_core()
    }

    async fn insert_asset(&self, asset: IngestAsset) -> Result<IngestAsset> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<IngestAsset> {
                let row: IngestAssetDB = asset.into();
                let inserted = diesel::insert_into(ingest_assets::table)
                    .values(&row)
                    .returning(IngestAssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(IngestAsset::try_from(inserted)?)
            })
            .await
    }

    async fn update_asset(&self, asset: IngestAsset) -> Result<IngestAsset> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<IngestAsset> {
                let row: IngestAssetDB = asset.into();
                let updated = diesel::update(ingest_assets::table.find(row.asset_id.clone()))
                    .set(&row)
                    .returning(IngestAssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(IngestAsset::try_from(updated)?)
            })
            .await
    }

    async fn insert_job(&self, job: IngestJob) -> Result<IngestJob> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<IngestJob> {
                let row = IngestJobDB::from(&job);
                let items: Vec<IngestJobItemDB> = job
                    .items
                    .into_iter()
                    .map(|item| IngestJobItemDB::from_domain(&row.id, item))
                    .collect();
                let inserted = diesel::insert_into(ingest_jobs::table)
                    .values(&row)
                    .returning(IngestJobDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                for chunk in items.chunks(50) {
                    diesel::insert_into(ingest_job_items::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                let items = load_items(conn, &inserted.id)?;
                Ok(inserted.into_domain(items)?)
            })
            .await
    }

    async fn update_job(&self, job: IngestJob) -> Result<IngestJob> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<IngestJob> {
                let row = IngestJobDB::from(&job);
                let updated = diesel::update(ingest_jobs::table.find(row.id.clone()))
                    .set(&row)
                    .returning(IngestJobDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                let items = load_items(conn, &updated.id)?;
                Ok(updated.into_domain(items)?)
            })
            .await
    }

    async fn update_job_item(&self, job_id: &str, item: IngestJobItem) -> Result<()> {
        let row = IngestJobItemDB::from_domain(job_id, item);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(
                    ingest_job_items::table.find((row.job_id.clone(), row.item_index)),
                )
                .set(&row)
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
