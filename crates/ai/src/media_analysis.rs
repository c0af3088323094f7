//! Media analysis: name, describe and tag uploaded images, audio and video.
//!
//! Frames (or audio) are sent to an OpenAI-compatible chat-completions
//! endpoint in a single request; the model answers with a JSON object.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AiError;
use crate::providers::openai::OpenAiClient;
use crate::providers::AiProviderFactory;
use vtt_core::ai::{AiProviderType, GeneratedContentType, Modality};
use vtt_core::errors::FieldError;

const SYSTEM_PROMPT: &str = "You catalogue assets for a virtual tabletop. \
Look at the media you are given and answer with a single JSON object and nothing else: \
{\"suggestedName\": string, \"description\": string, \"tags\": [string]}. \
The name is short and title-cased, the description is one or two sentences, \
and tags are lowercase single words or short phrases useful for search.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Audio,
    Video,
}

#[derive(Debug, Clone)]
pub struct MediaAnalysisRequest {
    pub media_type: MediaType,
    pub file_name: String,
    /// Image bytes, or sampled frames for video.
    pub frames: Vec<Vec<u8>>,
    pub audio: Option<Vec<u8>>,
    /// Free-text hint passed to the model.
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(alias = "suggested_name", default)]
    pub suggested_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[async_trait]
pub trait MediaAnalysisServiceTrait: Send + Sync {
    async fn analyze(&self, request: MediaAnalysisRequest) -> Result<AnalysisResult, AiError>;
}

pub struct MediaAnalysisService {
    factory: Arc<dyn AiProviderFactory>,
    client: Option<OpenAiClient>,
}

impl MediaAnalysisService {
    /// `client` is `None` when no OpenAI API key is available.
    pub fn new(factory: Arc<dyn AiProviderFactory>, client: Option<OpenAiClient>) -> Self {
        Self { factory, client }
    }

    fn provider_and_model(&self) -> Result<(AiProviderType, String), AiError> {
        if let Some(configured) = self
            .factory
            .provider_and_model(GeneratedContentType::MediaAnalysis)
        {
            return Ok(configured);
        }
        let provider = self
            .factory
            .default_provider(Modality::Text)
            .ok_or(AiError::NoDefaultProvider(Modality::Text))?;
        let model = self
            .factory
            .default_model(provider, Modality::Text)
            .ok_or_else(|| {
                AiError::field(
                    "model",
                    format!("No default text model is configured for {}", provider),
                )
            })?;
        Ok((provider, model))
    }

    fn validate(request: &MediaAnalysisRequest) -> Result<(), AiError> {
        let mut errors = Vec::new();
        match request.media_type {
            MediaType::Image | MediaType::Video => {
                if request.frames.iter().all(|f| f.is_empty()) {
                    errors.push(FieldError::new(
                        "frames",
                        "At least one image frame is required",
                    ));
                }
            }
            MediaType::Audio => {
                if request.audio.as_ref().map_or(true, |a| a.is_empty()) {
                    errors.push(FieldError::new("audio", "Audio data is required"));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AiError::Validation(errors))
        }
    }
}

#[async_trait]
impl MediaAnalysisServiceTrait for MediaAnalysisService {
    async fn analyze(&self, request: MediaAnalysisRequest) -> Result<AnalysisResult, AiError> {
        let (provider, model) = self.provider_and_model()?;
        if provider != AiProviderType::OpenAi {
            return Err(AiError::UnsupportedProvider(format!(
                "Media analysis only supports OpenAI, but {} is configured",
                provider
            )));
        }
        Self::validate(&request)?;
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AiError::MissingApiKey(AiProviderType::OpenAi.to_string()))?;

        debug!(
            "Analyzing {:?} '{}' with {} ({} frames)",
            request.media_type,
            request.file_name,
            model,
            request.frames.len()
        );
        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_content(&request) },
            ],
        });
        let content = client.chat_completion(&body).await?.into_content()?;
        let result = parse_analysis(&content)?;
        info!(
            "Analyzed '{}': {} ({} tags)",
            request.file_name,
            result.suggested_name,
            result.tags.len()
        );
        Ok(result)
    }
}

fn user_content(request: &MediaAnalysisRequest) -> Vec<Value> {
    let mut text = format!(
        "Analyze this {} file named \"{}\".",
        match request.media_type {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        },
        request.file_name
    );
    if request.media_type == MediaType::Video {
        text.push_str(" The images are frames sampled from the video in order.");
    }
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        text.push_str(&format!(" Context: {}", context));
    }

    let mut parts = vec![json!({ "type": "text", "text": text })];
    match request.media_type {
        MediaType::Image | MediaType::Video => {
            for frame in request.frames.iter().filter(|f| !f.is_empty()) {
                let url = format!(
                    "data:{};base64,{}",
                    sniff_image_mime(frame),
                    STANDARD.encode(frame)
                );
                parts.push(json!({
                    "type": "image_url",
                    "image_url": { "url": url },
                }));
            }
        }
        MediaType::Audio => {
            if let Some(audio) = &request.audio {
                parts.push(json!({
                    "type": "input_audio",
                    "input_audio": {
                        "data": STANDARD.encode(audio),
                        "format": audio_format(&request.file_name),
                    },
                }));
            }
        }
    }
    parts
}

/// MIME type from the leading magic bytes; PNG when unrecognised.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

fn audio_format(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".wav") {
        "wav"
    } else {
        "mp3"
    }
}

/// Strips a surrounding Markdown code fence together with its info string.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // The info string runs to the first newline unless the payload starts right away.
    let body = match inner.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with(['{', '[']) => rest,
        _ => strip_json_tag(inner),
    };
    body.trim()
}

/// Single-line fences: drops a leading `json` tag in any letter case.
fn strip_json_tag(inner: &str) -> &str {
    let inner = inner.trim_start();
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    }
}

fn parse_analysis(content: &str) -> Result<AnalysisResult, AiError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        AiError::provider(format!("Failed to parse media analysis response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AiCatalog, ContentTypeDefault};
    use crate::providers::ProviderFactory;
    use crate::test_support::spawn_stub;
    use axum::{routing::post, Json, Router};
    use reqwest::Client as HttpClient;
    use std::sync::Mutex;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn image_request() -> MediaAnalysisRequest {
        MediaAnalysisRequest {
            media_type: MediaType::Image,
            file_name: "dragon.png".to_string(),
            frames: vec![PNG.to_vec()],
            audio: None,
            context: None,
        }
    }

    fn service(base_url: &str) -> MediaAnalysisService {
        let factory = ProviderFactory::new(AiCatalog::embedded().unwrap());
        MediaAnalysisService::new(
            Arc::new(factory),
            Some(OpenAiClient::new(HttpClient::new(), base_url, "sk-test")),
        )
    }

    fn reply(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    const BARE: &str =
        r#"{"suggestedName": "Red Dragon", "description": "A wyrm.", "tags": ["dragon"]}"#;

    #[test]
    fn test_fenced_and_bare_json_parse_identically() {
        let bare = BARE;
        let fenced = format!("```json\n{}\n```", bare);
        let untagged = format!("```\n{}\n```", bare);
        let expected = parse_analysis(bare).unwrap();
        assert_eq!(parse_analysis(&fenced).unwrap(), expected);
        assert_eq!(parse_analysis(&untagged).unwrap(), expected);
        assert_eq!(expected.suggested_name, "Red Dragon");
    }

    #[test]
    fn test_fence_info_string_is_case_insensitive() {
        let expected = parse_analysis(BARE).unwrap();
        for fence in [
            format!("```JSON\n{}\n```", BARE),
            format!("``` json\n{}\n```", BARE),
            format!("```Json \r\n{}\r\n```", BARE),
            format!("```jsonc\n{}\n```", BARE),
            format!("```JSON {}```", BARE),
            format!("```{}```", BARE),
        ] {
            assert_eq!(parse_analysis(&fence).unwrap(), expected, "{}", fence);
        }
    }

    #[test]
    fn test_snake_case_and_missing_tags() {
        let parsed =
            parse_analysis(r#"{"suggested_name": "Tavern", "description": "Cozy."}"#).unwrap();
        assert_eq!(parsed.suggested_name, "Tavern");
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_sniff_image_mime() {
        assert_eq!(sniff_image_mime(&PNG), "image/png");
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_image_mime(b"GIF89a"), "image/gif");
        assert_eq!(sniff_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_image_mime(&[1, 2, 3]), "image/png");
    }

    #[test]
    fn test_audio_parts_use_extension_format() {
        let request = MediaAnalysisRequest {
            media_type: MediaType::Audio,
            file_name: "Rain.WAV".to_string(),
            frames: Vec::new(),
            audio: Some(vec![1, 2, 3]),
            context: Some("ambient loop".to_string()),
        };
        let parts = user_content(&request);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["input_audio"]["format"], "wav");
        assert!(parts[0]["text"].as_str().unwrap().contains("ambient loop"));
        assert_eq!(audio_format("storm.ogg"), "mp3");
    }

    #[tokio::test]
    async fn test_analyze_image_against_stub() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(reply(concat!(
                        "```json\n",
                        r#"{"suggestedName":"Red Dragon","description":"A wyrm.","#,
                        r#""tags":["dragon","boss"]}"#,
                        "\n```",
                    )))
                }
            }),
        );
        let base_url = spawn_stub(app).await;

        let result = service(&base_url).analyze(image_request()).await.unwrap();
        assert_eq!(result.suggested_name, "Red Dragon");
        assert_eq!(result.tags, vec!["dragon", "boss"]);

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-4o");
        let url = body["messages"][1]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_empty_choices_fail() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base_url = spawn_stub(app).await;

        let err = service(&base_url).analyze(image_request()).await.unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API returned no choices");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_provider_error() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(reply("I think this is a dragon.")) }),
        );
        let base_url = spawn_stub(app).await;

        let err = service(&base_url).analyze(image_request()).await.unwrap_err();
        assert_eq!(err.code(), "PROVIDER_ERROR");
        assert!(err
            .to_string()
            .starts_with("Failed to parse media analysis response"));
    }

    #[tokio::test]
    async fn test_non_openai_provider_is_rejected() {
        let mut catalog = AiCatalog::embedded().unwrap();
        catalog.content_types.insert(
            GeneratedContentType::MediaAnalysis,
            ContentTypeDefault {
                provider: AiProviderType::Anthropic,
                model: "claude-sonnet-4-5".to_string(),
            },
        );
        let svc = MediaAnalysisService::new(Arc::new(ProviderFactory::new(catalog)), None);

        let err = svc.analyze(image_request()).await.unwrap_err();
        assert!(err.to_string().contains("OpenAI"));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_missing_frames_are_rejected_before_any_call() {
        let svc = service("http://127.0.0.1:1");
        let err = svc
            .analyze(MediaAnalysisRequest {
                frames: Vec::new(),
                ..image_request()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "frames");
    }
}
