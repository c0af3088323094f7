use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use vtt_core::ingest::{
    AssetIdsRequest, IngestAssetPage, IngestBatchResponse, IngestJob, IngestJobResponse,
    IngestListRequest, IngestRequest, RejectRequest,
};

/// Hands a freshly queued job to the background worker.
fn accepted(
    state: &AppState,
    response: IngestJobResponse,
) -> (StatusCode, Json<IngestJobResponse>) {
    state.ingest_queue.enqueue(response.job_id.clone());
    (StatusCode::ACCEPTED, Json(response))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestJobResponse>)> {
    let response = state.ingest_service.ingest(payload).await?;
    Ok(accepted(&state, response))
}

async fn approve(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetIdsRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    Ok(Json(state.ingest_service.approve(payload.asset_ids).await?))
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RejectRequest>,
) -> ApiResult<(StatusCode, Json<IngestJobResponse>)> {
    let response = state.ingest_service.reject(payload).await?;
    Ok(accepted(&state, response))
}

async fn discard(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetIdsRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    Ok(Json(state.ingest_service.discard(payload.asset_ids).await?))
}

async fn retry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetIdsRequest>,
) -> ApiResult<(StatusCode, Json<IngestJobResponse>)> {
    let response = state.ingest_service.retry_failed(payload.asset_ids).await?;
    Ok(accepted(&state, response))
}

async fn processing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngestListRequest>,
) -> ApiResult<Json<IngestAssetPage>> {
    Ok(Json(state.ingest_service.processing(query)?))
}

async fn review(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngestListRequest>,
) -> ApiResult<Json<IngestAssetPage>> {
    Ok(Json(state.ingest_service.review(query)?))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngestListRequest>,
) -> ApiResult<Json<IngestAssetPage>> {
    Ok(Json(state.ingest_service.history(query)?))
}

async fn get_job(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<IngestJob>> {
    Ok(Json(state.ingest_service.get_job(&id)?))
}

async fn cancel_job(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<IngestJob>> {
    Ok(Json(state.ingest_service.cancel_job(&id).await?))
}

async fn get_media(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let (resource, data) = state.media_store.read(&id).await?;
    Ok(([(header::CONTENT_TYPE, resource.content_type)], data).into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/ingest", post(ingest))
        .route("/admin/ingest/approve", post(approve))
        .route("/admin/ingest/reject", post(reject))
        .route("/admin/ingest/discard", post(discard))
        .route("/admin/ingest/retry", post(retry))
        .route("/admin/ingest/processing", get(processing))
        .route("/admin/ingest/review", get(review))
        .route("/admin/ingest/history", get(history))
        .route("/admin/ingest/jobs/{id}", get(get_job))
        .route("/admin/ingest/jobs/{id}/cancel", post(cancel_job))
        .route("/media/{id}", get(get_media))
}
