use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use vtt_core::library::{
    LibraryConfig, LibraryContent, LibraryContentKind, LibraryContentPage, LibraryContentUpdate,
    LibrarySearchRequest, NewLibraryContent, TransferOwnershipRequest,
};

/// Unknown `{kind}` segments are reported as a missing route.
fn parse_kind(kind: &str) -> ApiResult<LibraryContentKind> {
    kind.parse().map_err(|_| ApiError::NotFound)
}

async fn get_config(State(state): State<Arc<AppState>>) -> ApiResult<Json<LibraryConfig>> {
    Ok(Json(state.library_service.config()))
}

async fn search_content(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryContentPage>> {
    let kind = parse_kind(&kind)?;
    let page = state.library_service.search(kind, query)?;
    Ok(Json(page))
}

async fn create_content(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewLibraryContent>,
) -> ApiResult<(StatusCode, Json<LibraryContent>)> {
    let kind = parse_kind(&kind)?;
    let created = state.library_service.create(kind, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_content(
    Path((kind, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LibraryContent>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.library_service.get(kind, &id)?))
}

async fn update_content(
    Path((kind, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LibraryContentUpdate>,
) -> ApiResult<Json<LibraryContent>> {
    let kind = parse_kind(&kind)?;
    let updated = state.library_service.update(kind, &id, payload).await?;
    Ok(Json(updated))
}

async fn delete_content(
    Path((kind, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    state.library_service.delete(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transfer_ownership(
    Path((kind, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransferOwnershipRequest>,
) -> ApiResult<Json<LibraryContent>> {
    let kind = parse_kind(&kind)?;
    let updated = state
        .library_service
        .transfer_ownership(kind, &id, payload)
        .await?;
    Ok(Json(updated))
}

async fn list_children(
    Path((kind, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<LibraryContent>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.library_service.children(kind, &id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/library/config", get(get_config))
        .route(
            "/admin/library/{kind}",
            get(search_content).post(create_content),
        )
        .route(
            "/admin/library/{kind}/{id}",
            get(get_content)
                .patch(update_content)
                .delete(delete_content),
        )
        .route(
            "/admin/library/{kind}/{id}/ownership",
            post(transfer_ownership),
        )
        .route("/admin/library/{kind}/{id}/children", get(list_children))
}
