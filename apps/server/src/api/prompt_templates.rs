use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{TemplatePreviewBody, TemplatePreviewResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use vtt_core::prompt_templates::{
    placeholders, resolve, NewPromptTemplate, PromptTemplate, PromptTemplatePage,
    PromptTemplateSearch, PromptTemplateUpdate,
};

async fn search_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PromptTemplateSearch>,
) -> ApiResult<Json<PromptTemplatePage>> {
    let page = state.prompt_template_service.search_templates(query)?;
    Ok(Json(page))
}

async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPromptTemplate>,
) -> ApiResult<(StatusCode, Json<PromptTemplate>)> {
    let created = state.prompt_template_service.create_template(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_template(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PromptTemplate>> {
    let template = state.prompt_template_service.get_template(&id)?;
    Ok(Json(template))
}

async fn update_template(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PromptTemplateUpdate>,
) -> ApiResult<Json<PromptTemplate>> {
    let updated = state
        .prompt_template_service
        .update_template(&id, payload)
        .await?;
    Ok(Json(updated))
}

async fn delete_template(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.prompt_template_service.delete_template(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/prompt-templates/preview",
    request_body = TemplatePreviewBody,
    responses((status = 200, body = TemplatePreviewResponse))
)]
pub async fn preview_template(
    Json(body): Json<TemplatePreviewBody>,
) -> ApiResult<Json<TemplatePreviewResponse>> {
    Ok(Json(TemplatePreviewResponse {
        result: resolve(&body.template, &body.context),
        placeholders: placeholders(&body.template),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/prompt-templates",
            get(search_templates).post(create_template),
        )
        .route("/prompt-templates/preview", post(preview_template))
        .route(
            "/prompt-templates/{id}",
            get(get_template)
                .patch(update_template)
                .put(update_template)
                .delete(delete_template),
        )
}
