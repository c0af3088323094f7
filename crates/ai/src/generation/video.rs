use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use super::{envelope, GenerationContext, RequestValidator};
use crate::error::AiError;
use crate::providers::AiProviderFactory;
use crate::types::{
    VideoGenerationRequest, VideoGenerationResult, VideoPrompt, VIDEO_CONTENT_TYPE,
};
use vtt_core::ai::Modality;
use vtt_core::prompt_templates::PromptTemplateServiceTrait;

#[async_trait]
pub trait VideoGenerationServiceTrait: Send + Sync {
    async fn generate(
        &self,
        request: VideoGenerationRequest,
    ) -> Result<VideoGenerationResult, AiError>;
}

pub struct VideoGenerationService {
    ctx: GenerationContext,
}

impl VideoGenerationService {
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
impl VideoGenerationServiceTrait for VideoGenerationService {
    async fn generate(
        &self,
        request: VideoGenerationRequest,
    ) -> Result<VideoGenerationResult, AiError> {
        let mut validator = RequestValidator::new();
        validator.content_type(request.content_type, Modality::Video);
        validator.prompt(&request.prompt, request.template.as_ref());
        validator.aspect_ratio(request.aspect_ratio.as_deref());
        validator.duration(request.duration);
        validator.finish()?;

        let prompts =
            self.ctx
                .resolve_prompts(request.template.as_ref(), &request.prompt, None, None)?;
        let provider = self.ctx.factory.video_provider(
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
            .generate_video(VideoPrompt {
                model: model.clone(),
                prompt: prompts.user,
                aspect_ratio: request.aspect_ratio.clone(),
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
            VIDEO_CONTENT_TYPE,
            provider_type,
            model,
            elapsed,
            request.duration,
        ))
    }
}
