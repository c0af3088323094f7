use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use vtt_ai::{
    AnalysisResult, AudioGenerationRequest, GenerationResult, ImageGenerationRequest,
    MediaAnalysisRequest, MediaType, TemplateReference, TextGenerationRequest,
    TextGenerationResult, Usage, VideoGenerationRequest,
};
use vtt_core::ai::{AiProviderType, GeneratedContentType};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReferenceBody {
    pub name: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(default)]
    pub include_drafts: bool,
}

impl From<TemplateReferenceBody> for TemplateReference {
    fn from(body: TemplateReferenceBody) -> Self {
        TemplateReference {
            name: body.name,
            context: body.context,
            include_drafts: body.include_drafts,
        }
    }
}

fn duration_from_seconds(field: &str, seconds: Option<f64>) -> ApiResult<Option<Duration>> {
    seconds
        .map(|s| {
            Duration::try_from_secs_f64(s)
                .map_err(|_| ApiError::BadRequest(format!("{} must be a positive number", field)))
        })
        .transpose()
}

fn decode_base64(field: &str, data: &str) -> ApiResult<Vec<u8>> {
    BASE64
        .decode(data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 in {}: {}", field, e)))
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationBody {
    #[schema(value_type = Option<String>)]
    pub content_type: Option<GeneratedContentType>,
    #[serde(default)]
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    #[schema(value_type = Option<String>)]
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReferenceBody>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl From<TextGenerationBody> for TextGenerationRequest {
    fn from(body: TextGenerationBody) -> Self {
        let defaults = TextGenerationRequest::default();
        TextGenerationRequest {
            content_type: body.content_type.unwrap_or(defaults.content_type),
            prompt: body.prompt,
            system_prompt: body.system_prompt,
            model: body.model,
            provider: body.provider,
            template: body.template.map(Into::into),
            max_tokens: body.max_tokens,
            temperature: body.temperature,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationBody {
    #[schema(value_type = Option<String>)]
    pub content_type: Option<GeneratedContentType>,
    #[serde(default)]
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model: Option<String>,
    #[schema(value_type = Option<String>)]
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReferenceBody>,
    pub aspect_ratio: Option<String>,
}

impl From<ImageGenerationBody> for ImageGenerationRequest {
    fn from(body: ImageGenerationBody) -> Self {
        let defaults = ImageGenerationRequest::default();
        ImageGenerationRequest {
            content_type: body.content_type.unwrap_or(defaults.content_type),
            prompt: body.prompt,
            negative_prompt: body.negative_prompt,
            model: body.model,
            provider: body.provider,
            template: body.template.map(Into::into),
            aspect_ratio: body.aspect_ratio,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AudioGenerationBody {
    #[schema(value_type = Option<String>)]
    pub content_type: Option<GeneratedContentType>,
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    #[schema(value_type = Option<String>)]
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReferenceBody>,
    pub duration_seconds: Option<f64>,
    pub voice: Option<String>,
}

impl TryFrom<AudioGenerationBody> for AudioGenerationRequest {
    type Error = ApiError;

    fn try_from(body: AudioGenerationBody) -> ApiResult<Self> {
        let defaults = AudioGenerationRequest::default();
        Ok(AudioGenerationRequest {
            content_type: body.content_type.unwrap_or(defaults.content_type),
            prompt: body.prompt,
            model: body.model,
            provider: body.provider,
            template: body.template.map(Into::into),
            duration: duration_from_seconds("durationSeconds", body.duration_seconds)?,
            voice: body.voice,
        })
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationBody {
    #[schema(value_type = Option<String>)]
    pub content_type: Option<GeneratedContentType>,
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    #[schema(value_type = Option<String>)]
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReferenceBody>,
    pub aspect_ratio: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl TryFrom<VideoGenerationBody> for VideoGenerationRequest {
    type Error = ApiError;

    fn try_from(body: VideoGenerationBody) -> ApiResult<Self> {
        let defaults = VideoGenerationRequest::default();
        Ok(VideoGenerationRequest {
            content_type: body.content_type.unwrap_or(defaults.content_type),
            prompt: body.prompt,
            model: body.model,
            provider: body.provider,
            template: body.template.map(Into::into),
            aspect_ratio: body.aspect_ratio,
            duration: duration_from_seconds("durationSeconds", body.duration_seconds)?,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageDto {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub total_cost: f64,
}

impl From<Usage> for UsageDto {
    fn from(u: Usage) -> Self {
        Self {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
            total_tokens: u.total_tokens,
            total_cost: u.total_cost,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationResponse {
    pub text: String,
    pub content_type: String,
    pub provider: String,
    pub model: String,
    pub elapsed_ms: u64,
    pub usage: UsageDto,
}

impl From<TextGenerationResult> for TextGenerationResponse {
    fn from(r: TextGenerationResult) -> Self {
        Self {
            text: r.payload,
            content_type: r.content_type,
            provider: r.provider.to_string(),
            model: r.model,
            elapsed_ms: r.elapsed.as_millis() as u64,
            usage: r.usage.into(),
        }
    }
}

/// Binary generation result; `data` is base64-encoded.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaGenerationResponse {
    pub data: String,
    pub content_type: String,
    pub provider: String,
    pub model: String,
    pub elapsed_ms: u64,
    pub duration_seconds: f64,
    pub usage: UsageDto,
}

impl From<GenerationResult<Vec<u8>>> for MediaGenerationResponse {
    fn from(r: GenerationResult<Vec<u8>>) -> Self {
        Self {
            data: BASE64.encode(&r.payload),
            content_type: r.content_type,
            provider: r.provider.to_string(),
            model: r.model,
            elapsed_ms: r.elapsed.as_millis() as u64,
            duration_seconds: r.duration.as_secs_f64(),
            usage: r.usage.into(),
        }
    }
}

/// Media analysis input; frames and audio are base64-encoded.
#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaAnalysisBody {
    #[schema(value_type = String)]
    pub media_type: MediaType,
    pub file_name: String,
    #[serde(default)]
    pub frames: Vec<String>,
    pub audio: Option<String>,
    pub context: Option<String>,
}

impl TryFrom<MediaAnalysisBody> for MediaAnalysisRequest {
    type Error = ApiError;

    fn try_from(body: MediaAnalysisBody) -> ApiResult<Self> {
        let frames = body
            .frames
            .iter()
            .map(|f| decode_base64("frames", f))
            .collect::<ApiResult<Vec<_>>>()?;
        let audio = body
            .audio
            .as_deref()
            .map(|a| decode_base64("audio", a))
            .transpose()?;
        Ok(MediaAnalysisRequest {
            media_type: body.media_type,
            file_name: body.file_name,
            frames,
            audio,
            context: body.context,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaAnalysisResponse {
    pub suggested_name: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl From<AnalysisResult> for MediaAnalysisResponse {
    fn from(r: AnalysisResult) -> Self {
        Self {
            suggested_name: r.suggested_name,
            description: r.description,
            tags: r.tags,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreviewBody {
    pub template: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreviewResponse {
    pub result: String,
    /// Placeholder names found in the template, in order of first use.
    pub placeholders: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub models: HashMap<String, String>,
    /// Modalities with a registered implementation.
    pub available: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInfo {
    pub content_type: String,
    pub modality: String,
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_duration_is_rejected() {
        assert!(duration_from_seconds("durationSeconds", Some(-1.0)).is_err());
        assert_eq!(
            duration_from_seconds("durationSeconds", Some(30.0)).unwrap(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(duration_from_seconds("durationSeconds", None).unwrap(), None);
    }

    #[test]
    fn test_analysis_body_decodes_frames() {
        let body = MediaAnalysisBody {
            media_type: MediaType::Image,
            file_name: "map.png".to_string(),
            frames: vec![BASE64.encode([1u8, 2, 3])],
            audio: None,
            context: None,
        };
        let request = MediaAnalysisRequest::try_from(body).unwrap();
        assert_eq!(request.frames, vec![vec![1, 2, 3]]);

        let bad = MediaAnalysisBody {
            media_type: MediaType::Audio,
            file_name: "rain.mp3".to_string(),
            frames: Vec::new(),
            audio: Some("not base64!".to_string()),
            context: None,
        };
        assert!(MediaAnalysisRequest::try_from(bad).is_err());
    }
}
