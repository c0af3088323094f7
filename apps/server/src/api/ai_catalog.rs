use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ContentTypeInfo, ProviderInfo},
};
use axum::{extract::State, routing::get, Json, Router};
use vtt_core::ai::{GeneratedContentType, Modality};

const MODALITIES: [Modality; 4] = [
    Modality::Text,
    Modality::Image,
    Modality::Audio,
    Modality::Video,
];

#[utoipa::path(
    get,
    path = "/api/v1/ai/providers",
    responses((status = 200, body = [ProviderInfo]))
)]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ProviderInfo>>> {
    let factory = &state.provider_factory;
    let providers = factory
        .catalog()
        .providers
        .iter()
        .map(|entry| ProviderInfo {
            id: entry.id.to_string(),
            name: entry.name.clone(),
            base_url: entry.base_url.clone(),
            models: entry
                .models
                .iter()
                .map(|(modality, model)| (modality.to_string(), model.clone()))
                .collect(),
            available: MODALITIES
                .into_iter()
                .filter(|m| factory.registered(*m).contains(&entry.id))
                .map(|m| m.to_string())
                .collect(),
        })
        .collect();
    Ok(Json(providers))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/content-types",
    responses((status = 200, body = [ContentTypeInfo]))
)]
pub async fn list_content_types(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ContentTypeInfo>>> {
    let catalog = state.provider_factory.catalog();
    let content_types = GeneratedContentType::ALL
        .into_iter()
        .map(|ct| {
            let default = catalog.content_type_default(ct);
            ContentTypeInfo {
                content_type: ct.to_string(),
                modality: ct.modality().to_string(),
                provider: default.map(|d| d.provider.to_string()),
                model: default.map(|d| d.model.clone()),
            }
        })
        .collect();
    Ok(Json(content_types))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/providers", get(list_providers))
        .route("/ai/content-types", get(list_content_types))
}
