use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use vtt_core::users::{
    NewUser, RoleChangeRequest, UserInfo, UserListResponse, UserSearchRequest, UserStats,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminQuery {
    admin_user_id: String,
}

async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserSearchRequest>,
) -> ApiResult<Json<UserListResponse>> {
    Ok(Json(state.user_service.search_users(query)?))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let created = state.user_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.user_service.stats()?))
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(state.user_service.get_user(&id)?))
}

async fn lock_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(state.user_service.lock_user(&id).await?))
}

async fn unlock_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(state.user_service.unlock_user(&id).await?))
}

async fn verify_email(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(state.user_service.verify_email(&id).await?))
}

async fn assign_role(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RoleChangeRequest>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(state.user_service.assign_role(&id, payload).await?))
}

async fn remove_role(
    Path((id, role)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
) -> ApiResult<Json<UserInfo>> {
    let updated = state
        .user_service
        .remove_role(&id, &role, &query.admin_user_id)
        .await?;
    Ok(Json(updated))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(search_users).post(create_user))
        .route("/admin/users/stats", get(get_stats))
        .route("/admin/users/{id}", get(get_user))
        .route("/admin/users/{id}/lock", post(lock_user))
        .route("/admin/users/{id}/unlock", post(unlock_user))
        .route("/admin/users/{id}/verify-email", post(verify_email))
        .route("/admin/users/{id}/roles", post(assign_role))
        .route("/admin/users/{id}/roles/{role}", delete(remove_role))
}
