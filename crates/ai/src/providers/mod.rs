//! Provider traits and the factory that resolves them.
//!
//! Each modality has its own provider trait. A provider receives a fully
//! resolved prompt (templates applied, model chosen) and returns the raw
//! payload. The factory maps an [`AiProviderType`] to a registered
//! implementation.

mod factory;
pub mod openai;
pub mod rig_text;

pub use factory::ProviderFactory;
pub use openai::OpenAiProvider;
pub use rig_text::RigTextProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AiError;
use crate::types::{AudioPrompt, ImagePrompt, TextPrompt, VideoPrompt};
use vtt_core::ai::{AiProviderType, GeneratedContentType, Modality};

#[async_trait]
pub trait TextProvider: Send + Sync {
    fn provider_type(&self) -> AiProviderType;

    async fn generate_text(&self, request: TextPrompt) -> Result<String, AiError>;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn provider_type(&self) -> AiProviderType;

    /// Returns the encoded image bytes.
    async fn generate_image(&self, request: ImagePrompt) -> Result<Vec<u8>, AiError>;
}

#[async_trait]
pub trait AudioProvider: Send + Sync {
    fn provider_type(&self) -> AiProviderType;

    async fn generate_audio(&self, request: AudioPrompt) -> Result<Vec<u8>, AiError>;
}

#[async_trait]
pub trait VideoProvider: Send + Sync {
    fn provider_type(&self) -> AiProviderType;

    async fn generate_video(&self, request: VideoPrompt) -> Result<Vec<u8>, AiError>;
}

/// Resolves providers and default models.
///
/// Passing `None` selects the default provider for the modality.
pub trait AiProviderFactory: Send + Sync {
    fn text_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn TextProvider>, AiError>;

    fn image_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn ImageProvider>, AiError>;

    fn audio_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn AudioProvider>, AiError>;

    fn video_provider(
        &self,
        provider: Option<AiProviderType>,
    ) -> Result<Arc<dyn VideoProvider>, AiError>;

    /// Configured `(provider, model)` for a content type, if any.
    fn provider_and_model(
        &self,
        content_type: GeneratedContentType,
    ) -> Option<(AiProviderType, String)>;

    fn default_model(&self, provider: AiProviderType, modality: Modality) -> Option<String>;

    fn default_provider(&self, modality: Modality) -> Option<AiProviderType>;
}
