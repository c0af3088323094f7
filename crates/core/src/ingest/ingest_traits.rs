use async_trait::async_trait;

use crate::errors::Result;
use crate::ingest::ingest_model::{
    IngestAsset, IngestAssetPage, IngestAssetRows, IngestBatchResponse, IngestJob, IngestJobItem,
    IngestJobResponse, IngestListRequest, IngestRequest, IngestStatus, JobStatus, RejectRequest,
};

/// Trait for ingest state and job persistence
#[async_trait]
pub trait IngestRepositoryTrait: Send + Sync {
    fn get_asset(&self, asset_id: &str) -> Result<Option<IngestAsset>>;
    /// Most recently updated first.
    fn list_by_status(
        &self,
        statuses: &[IngestStatus],
        skip: u32,
        take: u32,
    ) -> Result<IngestAssetRows>;
    fn get_job(&self, job_id: &str) -> Result<Option<IngestJob>>;
    fn list_job_ids(&self, statuses: &[JobStatus]) -> Result<Vec<String>>;
    async fn insert_asset(&self, asset: IngestAsset) -> Result<IngestAsset>;
    async fn update_asset(&self, asset: IngestAsset) -> Result<IngestAsset>;
    /// Inserts the job together with its items.
    async fn insert_job(&self, job: IngestJob) -> Result<IngestJob>;
    /// Updates status and timestamps; items are left alone.
    async fn update_job(&self, job: IngestJob) -> Result<IngestJob>;
    async fn update_job_item(&self, job_id: &str, item: IngestJobItem) -> Result<()>;
}

/// Trait for the asset ingest workflow
#[async_trait]
pub trait IngestServiceTrait: Send + Sync {
    /// Creates draft assets and a generation job for them.
    async fn ingest(&self, request: IngestRequest) -> Result<IngestJobResponse>;

    async fn approve(&self, asset_ids: Vec<String>) -> Result<IngestBatchResponse>;

    /// Clears the generated images and queues them again with a new prompt.
    async fn reject(&self, request: RejectRequest) -> Result<IngestJobResponse>;

    async fn discard(&self, asset_ids: Vec<String>) -> Result<IngestBatchResponse>;

    /// Regenerates whichever images failed.
    async fn retry_failed(&self, asset_ids: Vec<String>) -> Result<IngestJobResponse>;

    fn processing(&self, request: IngestListRequest) -> Result<IngestAssetPage>;

    fn review(&self, request: IngestListRequest) -> Result<IngestAssetPage>;

    fn history(&self, request: IngestListRequest) -> Result<IngestAssetPage>;

    fn get_job(&self, job_id: &str) -> Result<IngestJob>;

    /// Jobs that were queued or running, oldest first.
    fn unfinished_jobs(&self) -> Result<Vec<String>>;

    async fn cancel_job(&self, job_id: &str) -> Result<IngestJob>;

    /// Runs every pending item of the job in order.
    async fn process_job(&self, job_id: &str) -> Result<IngestJob>;
}
