use std::sync::Arc;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{
        AudioGenerationBody, ImageGenerationBody, MediaAnalysisBody, MediaAnalysisResponse,
        MediaGenerationResponse, TextGenerationBody, TextGenerationResponse, VideoGenerationBody,
    },
};
use axum::{extract::State, routing::post, Json, Router};
use vtt_ai::{AudioGenerationRequest, MediaAnalysisRequest, VideoGenerationRequest};

#[utoipa::path(
    post,
    path = "/api/v1/ai/text",
    request_body = TextGenerationBody,
    responses((status = 200, body = TextGenerationResponse))
)]
pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextGenerationBody>,
) -> ApiResult<Json<TextGenerationResponse>> {
    let result = state.text_service.generate(body.into()).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/images",
    request_body = ImageGenerationBody,
    responses((status = 200, body = MediaGenerationResponse))
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageGenerationBody>,
) -> ApiResult<Json<MediaGenerationResponse>> {
    let result = state.image_service.generate(body.into()).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/audio",
    request_body = AudioGenerationBody,
    responses((status = 200, body = MediaGenerationResponse))
)]
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AudioGenerationBody>,
) -> ApiResult<Json<MediaGenerationResponse>> {
    let request = AudioGenerationRequest::try_from(body)?;
    let result = state.audio_service.generate(request).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/video",
    request_body = VideoGenerationBody,
    responses((status = 200, body = MediaGenerationResponse))
)]
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoGenerationBody>,
) -> ApiResult<Json<MediaGenerationResponse>> {
    let request = VideoGenerationRequest::try_from(body)?;
    let result = state.video_service.generate(request).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/analysis",
    request_body = MediaAnalysisBody,
    responses((status = 200, body = MediaAnalysisResponse))
)]
pub async fn analyze_media(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MediaAnalysisBody>,
) -> ApiResult<Json<MediaAnalysisResponse>> {
    let request = MediaAnalysisRequest::try_from(body)?;
    let result = state.media_analysis_service.analyze(request).await?;
    Ok(Json(result.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/text", post(generate_text))
        .route("/ai/images", post(generate_image))
        .route("/ai/audio", post(generate_audio))
        .route("/ai/video", post(generate_video))
        .route("/ai/analysis", post(analyze_media))
}
