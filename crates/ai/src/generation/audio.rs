use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use super::{envelope, GenerationContext, RequestValidator};
use crate::error::AiError;
use crate::providers::AiProviderFactory;
use crate::types::{
    AudioGenerationRequest, AudioGenerationResult, AudioPrompt, AUDIO_CONTENT_TYPE,
};
use vtt_core::ai::Modality;
use vtt_core::prompt_templates::PromptTemplateServiceTrait;

#[async_trait]
pub trait AudioGenerationServiceTrait: Send + Sync {
    async fn generate(
        &self,
        request: AudioGenerationRequest,
    ) -> Result<AudioGenerationResult, AiError>;
}

pub struct AudioGenerationService {
    ctx: GenerationContext,
}

impl AudioGenerationService {
    pub fn new(
        factory: Arc<dyn AiProviderFactory>,
        templates: Arc<dyn PromptTemplateServiceTrait>,
    ) -> Self {
        Self {
            ctx: GenerationContext { factory, templates },
        }
    }
}

#[async_trait]
impl AudioGenerationServiceTrait for AudioGenerationService {
    async fn generate(
        &self,
        request: AudioGenerationRequest,
    ) -> Result<AudioGenerationResult, AiError> {
        let mut validator = RequestValidator::new();
        validator.content_type(request.content_type, Modality::Audio);
        validator.prompt(&request.prompt, request.template.as_ref());
        validator.duration(request.duration);
        validator.finish()?;

        let prompts =
            self.ctx
                .resolve_prompts(request.template.as_ref(), &request.prompt, None, None)?;
        let provider = self.ctx.factory.audio_provider(
            self.ctx
                .requested_provider(request.content_type, request.provider),
        )?;
        let provider_type = provider.provider_type();
        let model =
            self.ctx
                .resolve_model(request.content_type, provider_type, request.model.as_deref())?;

        debug!(
            "Generating {} with {} model {}",
            request.content_type, provider_type, model
        );
        let started = Instant::now();
        let bytes = provider
            .generate_audio(AudioPrompt {
                model: model.clone(),
                prompt: prompts.user,
                voice: request.voice.clone(),
                duration: request.duration,
            })
            .await?;
        let elapsed = started.elapsed();
        info!(
            "Generated {} ({} bytes) with {} model {} in {}ms",
            request.content_type,
            bytes.len(),
            provider_type,
            model,
            elapsed.as_millis()
        );

        Ok(envelope(
            bytes,
            AUDIO_CONTENT_TYPE,
            provider_type,
            model,
            elapsed,
            request.duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AiCatalog;
    use crate::providers::ProviderFactory;
    use crate::test_support::{FakeProvider, FakeTemplates};
    use crate::types::Usage;
    use std::time::Duration;
    use vtt_core::ai::{AiProviderType, GeneratedContentType};

    fn service(provider: Arc<FakeProvider>) -> AudioGenerationService {
        let factory = ProviderFactory::new(AiCatalog::embedded().unwrap())
            .with_audio_provider(provider);
        AudioGenerationService::new(Arc::new(factory), FakeTemplates::with(Vec::new()))
    }

    #[tokio::test]
    async fn test_epic_battle_music_end_to_end() {
        let provider = Arc::new(FakeProvider::bytes(
            AiProviderType::OpenAi,
            vec![0x52, 0x49, 0x46, 0x46],
        ));
        let svc = service(provider);

        let result = svc
            .generate(AudioGenerationRequest {
                content_type: GeneratedContentType::AudioMusic,
                prompt: "Epic battle music".to_string(),
                model: Some("tts-1".to_string()),
                provider: Some(AiProviderType::OpenAi),
                duration: Some(Duration::from_secs(30)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.content_type, "audio/ogg");
        assert_eq!(result.duration, Duration::from_secs(30));
        assert_eq!(result.provider, AiProviderType::OpenAi);
        assert_eq!(result.model, "tts-1");
        assert_eq!(result.payload, vec![0x52, 0x49, 0x46, 0x46]);
        assert_eq!(result.usage, Usage::default());
    }

    #[tokio::test]
    async fn test_missing_duration_is_zero() {
        let svc = service(Arc::new(FakeProvider::bytes(AiProviderType::OpenAi, vec![7])));

        let result = svc
            .generate(AudioGenerationRequest {
                prompt: "Crackling campfire".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.duration, Duration::ZERO);
        assert_eq!(result.usage.total_cost, 0.0);
    }

    #[tokio::test]
    async fn test_provider_error_message_is_unchanged() {
        let svc = service(Arc::new(FakeProvider::failing(
            AiProviderType::OpenAi,
            "OpenAI API error 500: upstream exploded",
        )));

        let err = svc
            .generate(AudioGenerationRequest {
                prompt: "Thunder".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API error 500: upstream exploded");
    }

    #[tokio::test]
    async fn test_overlong_duration_is_rejected() {
        let provider = Arc::new(FakeProvider::bytes(AiProviderType::OpenAi, vec![7]));
        let svc = service(provider.clone());

        let err = svc
            .generate(AudioGenerationRequest {
                prompt: "Long ambience".to_string(),
                duration: Some(Duration::from_secs(600)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "duration");
        assert_eq!(provider.call_count(), 0);
    }
}
