use log::{info, warn};
use reqwest::Client as HttpClient;
use std::collections::HashMap;
use std::sync::Arc;

use super::openai::{OpenAiClient, OpenAiProvider};
use super::rig_text::RigTextProvider;
use super::{AiProviderFactory, AudioProvider, ImageProvider, TextProvider, VideoProvider};
use crate::catalog::AiCatalog;
use crate::error::AiError;
use vtt_core::ai::{AiProviderType, GeneratedContentType, Modality};

/// Registry of provider implementations keyed by provider type.
pub struct ProviderFactory {
    catalog: AiCatalog,
    text: HashMap<AiProviderType, Arc<dyn TextProvider>>,
    image: HashMap<AiProviderType, Arc<dyn ImageProvider>>,
    audio: HashMap<AiProviderType, Arc<dyn AudioProvider>>,
    video: HashMap<AiProviderType, Arc<dyn VideoProvider>>,
}

impl ProviderFactory {
    /// Empty registry; providers are added with the `with_*` builders.
    pub fn new(catalog: AiCatalog) -> Self {
        Self {
            catalog,
            text: HashMap::new(),
            image: HashMap::new(),
            audio: HashMap::new(),
            video: HashMap::new(),
        }
    }

    /// Registers every catalog provider whose API key is available.
    pub fn from_catalog(catalog: AiCatalog, http: HttpClient) -> Self {
        let mut factory = Self::new(catalog.clone());

        for entry in &catalog.providers {
            let api_key = catalog.api_key(entry.id);
            match entry.id {
                AiProviderType::OpenAi => {
                    let Some(key) = api_key else { continue };
                    let provider = Arc::new(OpenAiProvider::new(OpenAiClient::new(
                        http.clone(),
                        entry.base_url.clone(),
                        key,
                    )));
                    factory = factory
                        .with_text_provider(provider.clone())
                        .with_image_provider(provider.clone())
                        .with_audio_provider(provider);
                }
                other => {
                    if other != AiProviderType::Ollama && api_key.is_none() {
                        continue;
                    }
                    match RigTextProvider::new(other, api_key, Some(entry.base_url.clone())) {
                        Ok(provider) => factory = factory.with_text_provider(Arc::new(provider)),
                        Err(e) => {
                            warn!("Skipping provider {}: {}", other, e);
                            continue;
                        }
                    }
                }
            }
            info!("Registered AI provider {}", entry.id);
        }
        factory
    }

    pub fn with_text_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.text.insert(provider.provider_type(), provider);
        self
    }

    pub fn with_image_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.image.insert(provider.provider_type(), provider);
        self
    }

    pub fn with_audio_provider(mut self, provider: Arc<dyn AudioProvider>) -> Self {
        self.audio.insert(provider.provider_type(), provider);
        self
    }

    pub fn with_video_provider(mut self, provider: Arc<dyn VideoProvider>) -> Self {
        self.video.insert(provider.provider_type(), provider);
        self
    }

    pub fn catalog(&self) -> &AiCatalog {
        &self.catalog
    }

    /// Provider types registered for a modality, in declaration order.
    pub fn registered(&self, modality: Modality) -> Vec<AiProviderType> {
        AiProviderType::ALL
            .into_iter()
            .filter(|p| match modality {
                Modality::Text => self.text.contains_key(p),
                Modality::Image => self.image.contains_key(p),
                Modality::Audio => self.audio.contains_key(p),
                Modality::Video => self.video.contains_key(p),
            })
            .collect()
    }

    fn select<T: ?Sized>(
        &self,
        registry: &HashMap<AiProviderType, Arc<T>>,
        requested: Option<AiProviderType>,
        modality: Modality,
    ) -> Result<Arc<T>, AiError> {
        let provider = match requested {
            Some(provider) => provider,
            None => self
                .catalog
                .default_provider(modality)
                .or_else(|| self.registered(modality).into_iter().next())
                .ok_or(AiError::NoDefaultProvider(modality))?,
        };
        registry
            .get(&provider)
            .cloned()
            .ok_or(AiError::ProviderNotConfigured { provider, modality })
    }
}

impl AiProviderFactory for ProviderFactory {
    fn text_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn TextProvider>, AiError> {
        self.select(&self.text, provider, Modality::Text)
    }

    fn image_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn ImageProvider>, AiError> {
        self.select(&self.image, provider, Modality::Image)
    }

    fn audio_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn AudioProvider>, AiError> {
        self.select(&self.audio, provider, Modality::Audio)
    }

    fn video_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn VideoProvider>, AiError> {
        self.select(&self.video, provider, Modality::Video)
    }

    fn provider_and_model(
        &self,
        content_type: GeneratedContentType,
    ) -> Option<(AiProviderType, String)> {
        self.catalog
            .content_type_default(content_type)
            .map(|d| (d.provider, d.model.clone()))
    }

    fn default_model(&self, provider: AiProviderType, modality: Modality) -> Option<String> {
        self.catalog
            .default_model(provider, modality)
            .map(str::to_string)
    }

    fn default_provider(&self, modality: Modality) -> Option<AiProviderType> {
        self.catalog.default_provider(modality)
    }
}
