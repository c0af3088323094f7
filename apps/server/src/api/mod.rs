use std::sync::Arc;

use crate::{config::Config, main_lib::AppState, models};
use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub mod ai_catalog;
pub mod generation;
pub mod health;
pub mod ingest;
pub mod library;
pub mod prompt_templates;
pub mod users;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        prompt_templates::preview_template,
        generation::generate_text,
        generation::generate_image,
        generation::generate_audio,
        generation::generate_video,
        generation::analyze_media,
        ai_catalog::list_providers,
        ai_catalog::list_content_types,
    ),
    components(schemas(
        models::TemplateReferenceBody,
        models::TextGenerationBody,
        models::ImageGenerationBody,
        models::AudioGenerationBody,
        models::VideoGenerationBody,
        models::UsageDto,
        models::TextGenerationResponse,
        models::MediaGenerationResponse,
        models::MediaAnalysisBody,
        models::MediaAnalysisResponse,
        models::TemplatePreviewBody,
        models::TemplatePreviewResponse,
        models::ProviderInfo,
        models::ContentTypeInfo,
    )),
    tags((name = "vtt"))
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new().allow_origin(origins)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .merge(health::router())
        .merge(prompt_templates::router())
        .merge(generation::router())
        .merge(ai_catalog::router())
        .merge(library::router())
        .merge(users::router())
        .merge(ingest::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(move || async move { Json(openapi) }))
        .with_state(state)
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
