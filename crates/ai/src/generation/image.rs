use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use super::{envelope, GenerationContext, RequestValidator};
use crate::error::AiError;
use crate::providers::AiProviderFactory;
use crate::types::{
    ImageGenerationRequest, ImageGenerationResult, ImagePrompt, IMAGE_CONTENT_TYPE,
};
use vtt_core::ai::Modality;
use vtt_core::prompt_templates::PromptTemplateServiceTrait;

#[async_trait]
pub trait ImageGenerationServiceTrait: Send + Sync {
    async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResult, AiError>;
}

pub struct ImageGenerationService {
    ctx: GenerationContext,
}

impl ImageGenerationService {
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
impl ImageGenerationServiceTrait for ImageGenerationService {
    async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResult, AiError> {
        let mut validator = RequestValidator::new();
        validator.content_type(request.content_type, Modality::Image);
        validator.prompt(&request.prompt, request.template.as_ref());
        validator.aspect_ratio(request.aspect_ratio.as_deref());
        validator.finish()?;

        let prompts = self.ctx.resolve_prompts(
            request.template.as_ref(),
            &request.prompt,
            None,
            request.negative_prompt.as_deref(),
        )?;
        let provider = self.ctx.factory.image_provider(
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
            .generate_image(ImagePrompt {
                model: model.clone(),
                prompt: prompts.user,
                negative_prompt: prompts.negative,
                aspect_ratio: request.aspect_ratio.clone(),
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
            IMAGE_CONTENT_TYPE,
            provider_type,
            model,
            elapsed,
            None,
        ))
    }
}
