//! Generation services: validate, resolve template and provider, dispatch.
//!
//! Every service follows the same pipeline:
//! 1. validate the request, collecting every offending field
//! 2. resolve the named prompt template, if any
//! 3. pick provider and model (request > content-type default > provider default)
//! 4. call the provider and wrap the payload in a [`GenerationResult`]

mod audio;
mod image;
mod text;
mod video;

pub use audio::{AudioGenerationService, AudioGenerationServiceTrait};
pub use image::{ImageGenerationService, ImageGenerationServiceTrait};
pub use text::{TextGenerationService, TextGenerationServiceTrait};
pub use video::{VideoGenerationService, VideoGenerationServiceTrait};

use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AiError;
use crate::providers::AiProviderFactory;
use crate::types::{GenerationResult, TemplateReference, Usage};
use vtt_core::ai::{AiProviderType, GeneratedContentType, Modality};
use vtt_core::errors::FieldError;
use vtt_core::prompt_templates::{resolve, resolve_template, PromptTemplateServiceTrait};

pub const ASPECT_RATIOS: [&str; 5] = ["1:1", "2:3", "3:2", "16:9", "9:16"];
pub const MAX_DURATION: Duration = Duration::from_secs(300);
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Prompts after template resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ResolvedPrompts {
    pub system: Option<String>,
    pub user: String,
    pub negative: Option<String>,
}

/// Collects field errors for a single request.
#[derive(Default)]
pub(crate) struct RequestValidator {
    errors: Vec<FieldError>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn content_type(&mut self, content_type: GeneratedContentType, modality: Modality) {
        if content_type.modality() != modality {
            self.push(
                "contentType",
                format!("{} is not a {} content type", content_type, modality),
            );
        }
    }

    pub fn prompt(&mut self, prompt: &str, template: Option<&TemplateReference>) {
        match template {
            Some(reference) if reference.name.trim().is_empty() => {
                self.push("template", "Template name is required")
            }
            Some(_) => {}
            None if prompt.trim().is_empty() => self.push("prompt", "Prompt is required"),
            None => {}
        }
    }

    pub fn duration(&mut self, duration: Option<Duration>) {
        if let Some(duration) = duration {
            if duration.is_zero() {
                self.push("duration", "Duration must be greater than zero");
            } else if duration > MAX_DURATION {
                self.push(
                    "duration",
                    format!(
                        "Duration must not exceed {} seconds",
                        MAX_DURATION.as_secs()
                    ),
                );
            }
        }
    }

    pub fn aspect_ratio(&mut self, aspect_ratio: Option<&str>) {
        if let Some(ratio) = aspect_ratio {
            if !ASPECT_RATIOS.contains(&ratio) {
                self.push(
                    "aspectRatio",
                    format!(
                        "Aspect ratio '{}' is not supported; expected one of {}",
                        ratio,
                        ASPECT_RATIOS.join(", ")
                    ),
                );
            }
        }
    }

    pub fn finish(self) -> Result<(), AiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AiError::Validation(self.errors))
        }
    }
}

/// Dependencies shared by the generation services.
#[derive(Clone)]
pub(crate) struct GenerationContext {
    pub factory: Arc<dyn AiProviderFactory>,
    pub templates: Arc<dyn PromptTemplateServiceTrait>,
}

impl GenerationContext {
    /// Applies the referenced template, or passes the raw prompts through.
    pub fn resolve_prompts(
        &self,
        template: Option<&TemplateReference>,
        prompt: &str,
        system_prompt: Option<&str>,
        negative_prompt: Option<&str>,
    ) -> Result<ResolvedPrompts, AiError> {
        let raw_system = system_prompt
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        let raw_negative = negative_prompt
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        let Some(reference) = template else {
            return Ok(ResolvedPrompts {
                system: raw_system,
                user: prompt.to_string(),
                negative: raw_negative,
            });
        };

        let stored = self
            .templates
            .get_latest_by_name(&reference.name, reference.include_drafts)?
            .ok_or_else(|| AiError::TemplateNotFound(reference.name.clone()))?;
        debug!(
            "Resolving template '{}' version {}",
            stored.name, stored.version
        );

        let system = Some(resolve(&stored.system_prompt, &reference.context))
            .filter(|s| !s.trim().is_empty())
            .or(raw_system);
        let negative = resolve_template(
            stored.negative_prompt_template.as_deref(),
            &reference.context,
        )
        .filter(|s| !s.trim().is_empty())
        .or(raw_negative);

        Ok(ResolvedPrompts {
            system,
            user: resolve(&stored.user_prompt_template, &reference.context),
            negative,
        })
    }

    /// Provider requested for the call: explicit override, then content-type default.
    pub fn requested_provider(
        &self,
        content_type: GeneratedContentType,
        provider: Option<AiProviderType>,
    ) -> Option<AiProviderType> {
        provider.or_else(|| {
            self.factory
                .provider_and_model(content_type)
                .map(|(provider, _)| provider)
        })
    }

    /// Model for the resolved provider: explicit override, content-type
    /// default when it names the same provider, then the provider default.
    pub fn resolve_model(
        &self,
        content_type: GeneratedContentType,
        provider: AiProviderType,
        model: Option<&str>,
    ) -> Result<String, AiError> {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            return Ok(model.to_string());
        }
        if let Some((configured, model)) = self.factory.provider_and_model(content_type) {
            if configured == provider {
                return Ok(model);
            }
        }
        let modality = content_type.modality();
        self.factory
            .default_model(provider, modality)
            .ok_or_else(|| {
                AiError::field(
                    "model",
                    format!("No default {} model is configured for {}", modality, provider),
                )
            })
    }
}

pub(crate) fn envelope<P>(
    payload: P,
    mime: &str,
    provider: AiProviderType,
    model: String,
    elapsed: Duration,
    duration: Option<Duration>,
) -> GenerationResult<P> {
    GenerationResult {
        payload,
        content_type: mime.to_string(),
        provider,
        model,
        elapsed,
        duration: duration.unwrap_or(Duration::ZERO),
        usage: Usage::default(),
    }
}
