//! OpenAI REST client and the provider built on it.
//!
//! Talks to the chat-completions, image-generation and speech endpoints
//! directly with `reqwest`; the same client backs media analysis.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AudioProvider, ImageProvider, TextProvider};
use crate::error::AiError;
use crate::types::{AudioPrompt, ImagePrompt, TextPrompt};
use vtt_core::ai::AiProviderType;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_VOICE: &str = "alloy";

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    pub(crate) fn into_content(self) -> Result<String, AiError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::provider("OpenAI API returned no choices"))?;
        choice
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AiError::provider("OpenAI API returned empty content"))
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// Thin OpenAI HTTP client with bearer authentication.
#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, AiError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::provider(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::provider(format!(
                "OpenAI API error {}: {}",
                status.as_u16(),
                text
            )));
        }
        Ok(response)
    }

    pub(crate) async fn chat_completion(
        &self,
        body: &Value,
    ) -> Result<ChatCompletionResponse, AiError> {
        let response = self.post("chat/completions", body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| AiError::provider(format!("Network error: {}", e)))?;
        serde_json::from_str(&text).map_err(|e| {
            AiError::provider(format!("Failed to parse OpenAI response: {}", e))
        })
    }

    async fn generate_image(&self, body: &Value) -> Result<Vec<u8>, AiError> {
        let response = self.post("images/generations", body).await?;
        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| AiError::provider(format!("Failed to parse OpenAI response: {}", e)))?;
        let encoded = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AiError::provider("OpenAI API returned empty image data"))?;
        STANDARD
            .decode(encoded)
            .map_err(|e| AiError::provider(format!("Failed to decode image data: {}", e)))
    }

    async fn speech(&self, body: &Value) -> Result<Vec<u8>, AiError> {
        let response = self.post("audio/speech", body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AiError::provider(format!("Network error: {}", e)))?;
        if bytes.is_empty() {
            return Err(AiError::provider("OpenAI API returned empty audio data"));
        }
        Ok(bytes.to_vec())
    }
}

/// Maps an aspect ratio onto a supported image size.
pub(crate) fn image_size(aspect_ratio: Option<&str>) -> &'static str {
    match aspect_ratio {
        Some("2:3") | Some("9:16") => "1024x1536",
        Some("3:2") | Some("16:9") => "1536x1024",
        _ => "1024x1024",
    }
}

fn chat_body(request: &TextPrompt) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    let mut body = json!({ "model": request.model, "messages": messages });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

fn image_body(request: &ImagePrompt) -> Value {
    let prompt = match request.negative_prompt.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(negative) => format!("{}\n\nAvoid: {}", request.prompt, negative),
        None => request.prompt.clone(),
    };
    let mut body = json!({
        "model": request.model,
        "prompt": prompt,
        "n": 1,
        "size": image_size(request.aspect_ratio.as_deref()),
    });
    if request.model.starts_with("dall-e") {
        body["response_format"] = json!("b64_json");
    } else {
        body["output_format"] = json!("png");
    }
    body
}

fn speech_body(request: &AudioPrompt) -> Value {
    json!({
        "model": request.model,
        "input": request.prompt,
        "voice": request.voice.as_deref().unwrap_or(DEFAULT_VOICE),
        "response_format": "opus",
    })
}

/// OpenAI text, image and audio provider.
pub struct OpenAiProvider {
    client: OpenAiClient,
}

impl OpenAiProvider {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn provider_type(&self) -> AiProviderType {
        AiProviderType::OpenAi
    }

    async fn generate_text(&self, request: TextPrompt) -> Result<String, AiError> {
        debug!("OpenAI chat completion with model {}", request.model);
        self.client
            .chat_completion(&chat_body(&request))
            .await?
            .into_content()
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    fn provider_type(&self) -> AiProviderType {
        AiProviderType::OpenAi
    }

    async fn generate_image(&self, request: ImagePrompt) -> Result<Vec<u8>, AiError> {
        debug!("OpenAI image generation with model {}", request.model);
        self.client.generate_image(&image_body(&request)).await
    }
}

#[async_trait]
impl AudioProvider for OpenAiProvider {
    fn provider_type(&self) -> AiProviderType {
        AiProviderType::OpenAi
    }

    async fn generate_audio(&self, request: AudioPrompt) -> Result<Vec<u8>, AiError> {
        if let Some(duration) = request.duration {
            debug!(
                "OpenAI speech ignores the requested duration of {}s",
                duration.as_secs()
            );
        }
        self.client.speech(&speech_body(&request)).await
    }
}
