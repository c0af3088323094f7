//! Shared fakes for unit tests.

use async_trait::async_trait;
use axum::Router;
use std::sync::{Arc, Mutex};

use crate::error::AiError;
use crate::providers::{AudioProvider, ImageProvider, TextProvider, VideoProvider};
use crate::types::{AudioPrompt, ImagePrompt, TextPrompt, VideoPrompt};
use vtt_core::ai::AiProviderType;
use vtt_core::prompt_templates::{
    NewPromptTemplate, PromptTemplate, PromptTemplatePage, PromptTemplateSearch,
    PromptTemplateServiceTrait, PromptTemplateUpdate,
};
use vtt_core::Result as CoreResult;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Captured provider-level request.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text(TextPrompt),
    Image(ImagePrompt),
    Audio(AudioPrompt),
    Video(VideoPrompt),
}

/// Provider returning a canned payload (or error) for every modality.
pub struct FakeProvider {
    provider: AiProviderType,
    text: String,
    bytes: Vec<u8>,
    error: Option<String>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeProvider {
    pub fn text(provider: AiProviderType, text: &str) -> Self {
        Self {
            provider,
            text: text.to_string(),
            bytes: Vec::new(),
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn bytes(provider: AiProviderType, bytes: Vec<u8>) -> Self {
        Self {
            provider,
            text: String::new(),
            bytes,
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(provider: AiProviderType, message: &str) -> Self {
        Self {
            provider,
            text: String::new(),
            bytes: Vec::new(),
            error: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record<T>(&self, call: Call, payload: T) -> Result<T, AiError> {
        self.calls.lock().unwrap().push(call);
        match &self.error {
            Some(message) => Err(AiError::provider(message.clone())),
            None => Ok(payload),
        }
    }
}

#[async_trait]
impl TextProvider for FakeProvider {
    fn provider_type(&self) -> AiProviderType {
        self.provider
    }

    async fn generate_text(&self, request: TextPrompt) -> Result<String, AiError> {
        self.record(Call::Text(request), self.text.clone())
    }
}

#[async_trait]
impl ImageProvider for FakeProvider {
    fn provider_type(&self) -> AiProviderType {
        self.provider
    }

    async fn generate_image(&self, request: ImagePrompt) -> Result<Vec<u8>, AiError> {
        self.record(Call::Image(request), self.bytes.clone())
    }
}

#[async_trait]
impl AudioProvider for FakeProvider {
    fn provider_type(&self) -> AiProviderType {
        self.provider
    }

    async fn generate_audio(&self, request: AudioPrompt) -> Result<Vec<u8>, AiError> {
        self.record(Call::Audio(request), self.bytes.clone())
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    fn provider_type(&self) -> AiProviderType {
        self.provider
    }

    async fn generate_video(&self, request: VideoPrompt) -> Result<Vec<u8>, AiError> {
        self.record(Call::Video(request), self.bytes.clone())
    }
}

/// Template service serving a fixed list; only lookups by name are supported.
#[derive(Default)]
pub struct FakeTemplates {
    pub templates: Vec<PromptTemplate>,
}

impl FakeTemplates {
    pub fn with(templates: Vec<PromptTemplate>) -> Arc<Self> {
        Arc::new(Self { templates })
    }
}

pub fn template(name: &str, version: &str, system: &str, user: &str) -> PromptTemplate {
    let now = chrono::Utc::now().naive_utc();
    PromptTemplate {
        id: format!("{}-{}", name, version),
        name: name.to_string(),
        category: vtt_core::ai::GeneratedContentType::TextDescription,
        version: version.to_string(),
        system_prompt: system.to_string(),
        user_prompt_template: user.to_string(),
        negative_prompt_template: None,
        reference_image_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PromptTemplateServiceTrait for FakeTemplates {
    fn get_template(&self, id: &str) -> CoreResult<PromptTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| vtt_core::Error::not_found("PromptTemplate", id))
    }

    fn get_latest_by_name(
        &self,
        name: &str,
        include_drafts: bool,
    ) -> CoreResult<Option<PromptTemplate>> {
        Ok(self
            .templates
            .iter()
            .filter(|t| t.name == name && (include_drafts || !t.is_draft()))
            .max_by(|a, b| vtt_core::prompt_templates::compare_versions(&a.version, &b.version))
            .cloned())
    }

    fn search_templates(&self, _search: PromptTemplateSearch) -> CoreResult<PromptTemplatePage> {
        Ok(PromptTemplatePage {
            items: self.templates.clone(),
            total_count: self.templates.len() as u64,
            has_more: false,
        })
    }

    async fn create_template(&self, _new: NewPromptTemplate) -> CoreResult<PromptTemplate> {
        Err(vtt_core::Error::Unexpected("read-only fake".to_string()))
    }

    async fn update_template(
        &self,
        _id: &str,
        _update: PromptTemplateUpdate,
    ) -> CoreResult<PromptTemplate> {
        Err(vtt_core::Error::Unexpected("read-only fake".to_string()))
    }

    async fn delete_template(&self, _id: &str) -> CoreResult<()> {
        Err(vtt_core::Error::Unexpected("read-only fake".to_string()))
    }
}
