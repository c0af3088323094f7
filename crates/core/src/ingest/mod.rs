//! Ingest module - bulk asset creation with generated portraits and tokens.

mod ingest_model;
mod ingest_traits;

pub use ingest_model::{
    asset_folder, build_prompt, AssetIdsRequest, IngestAsset, IngestAssetPage, IngestAssetRows,
    IngestAssetView, IngestBatchResponse, IngestFailure, IngestItemRequest, IngestJob,
    IngestJobItem, IngestJobResponse, IngestListRequest, IngestRequest, IngestStatus,
    JobItemStatus, JobStatus, RejectItem, RejectRequest,
};
pub use ingest_traits::{IngestRepositoryTrait, IngestServiceTrait};
