use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use super::{envelope, GenerationContext, RequestValidator, MAX_TEMPERATURE};
use crate::error::AiError;
use crate::providers::AiProviderFactory;
use crate::types::{TextGenerationRequest, TextGenerationResult, TextPrompt, TEXT_CONTENT_TYPE};
use vtt_core::ai::Modality;
use vtt_core::prompt_templates::PromptTemplateServiceTrait;

#[async_trait]
pub trait TextGenerationServiceTrait: Send + Sync {
    async fn generate(
        &self,
        request: TextGenerationRequest,
    ) -> Result<TextGenerationResult, AiError>;
}

pub struct TextGenerationService {
    ctx: GenerationContext,
}

impl TextGenerationService {
    pub fn new(
        factory: Arc<dyn AiProviderFactory>,
        templates: Arc<dyn PromptTemplateServiceTrait>,
    ) -> Self {
        Self {
            ctx: GenerationContext { factory, templates },
        }
    }

    fn validate(request: &TextGenerationRequest) -> Result<(), AiError> {
        let mut validator = RequestValidator::new();
        validator.content_type(request.content_type, Modality::Text);
        validator.prompt(&request.prompt, request.template.as_ref());
        if request.max_tokens == Some(0) {
            validator.push("maxTokens", "Max tokens must be greater than zero");
        }
        if let Some(temperature) = request.temperature {
            if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
                validator.push(
                    "temperature",
                    format!("Temperature must be between 0 and {}", MAX_TEMPERATURE),
                );
            }
        }
        validator.finish()
    }
}

#[async_trait]
impl TextGenerationServiceTrait for TextGenerationService {
    async fn generate(
        &self,
        request: TextGenerationRequest,
    ) -> Result<TextGenerationResult, AiError> {
        Self::validate(&request)?;

        let prompts = self.ctx.resolve_prompts(
            request.template.as_ref(),
            &request.prompt,
            request.system_prompt.as_deref(),
            None,
        )?;
        let provider = self.ctx.factory.text_provider(
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
        let text = provider
            .generate_text(TextPrompt {
                model: model.clone(),
                system_prompt: prompts.system,
                prompt: prompts.user,
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            })
            .await?;
        let elapsed = started.elapsed();
        info!(
            "Generated {} with {} model {} in {}ms",
            request.content_type,
            provider_type,
            model,
            elapsed.as_millis()
        );

        Ok(envelope(
            text,
            TEXT_CONTENT_TYPE,
            provider_type,
            model,
            elapsed,
            None,
        ))
    }
}
