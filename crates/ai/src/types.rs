//! Generation request and result types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use vtt_core::ai::{AiProviderType, GeneratedContentType};

pub const TEXT_CONTENT_TYPE: &str = "text/plain";
pub const IMAGE_CONTENT_TYPE: &str = "image/png";
pub const AUDIO_CONTENT_TYPE: &str = "audio/ogg";
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Names a stored prompt template and the values for its placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReference {
    pub name: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(default)]
    pub include_drafts: bool,
}

impl TemplateReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TextGenerationRequest {
    pub content_type: GeneratedContentType,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReference>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for TextGenerationRequest {
    fn default() -> Self {
        Self {
            content_type: GeneratedContentType::TextDescription,
            prompt: String::new(),
            system_prompt: None,
            model: None,
            provider: None,
            template: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub content_type: GeneratedContentType,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub model: Option<String>,
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReference>,
    /// One of `1:1`, `2:3`, `3:2`, `16:9`, `9:16`.
    pub aspect_ratio: Option<String>,
}

impl Default for ImageGenerationRequest {
    fn default() -> Self {
        Self {
            content_type: GeneratedContentType::ImagePortrait,
            prompt: String::new(),
            negative_prompt: None,
            model: None,
            provider: None,
            template: None,
            aspect_ratio: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioGenerationRequest {
    pub content_type: GeneratedContentType,
    pub prompt: String,
    pub model: Option<String>,
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReference>,
    pub duration: Option<Duration>,
    pub voice: Option<String>,
}

impl Default for AudioGenerationRequest {
    fn default() -> Self {
        Self {
            content_type: GeneratedContentType::AudioAmbient,
            prompt: String::new(),
            model: None,
            provider: None,
            template: None,
            duration: None,
            voice: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoGenerationRequest {
    pub content_type: GeneratedContentType,
    pub prompt: String,
    pub model: Option<String>,
    pub provider: Option<AiProviderType>,
    pub template: Option<TemplateReference>,
    pub aspect_ratio: Option<String>,
    pub duration: Option<Duration>,
}

impl Default for VideoGenerationRequest {
    fn default() -> Self {
        Self {
            content_type: GeneratedContentType::VideoBackground,
            prompt: String::new(),
            model: None,
            provider: None,
            template: None,
            aspect_ratio: None,
            duration: None,
        }
    }
}

/// Token and cost accounting. Always zero until billing exists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub total_cost: f64,
}

/// Result envelope shared by every modality.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult<P> {
    pub payload: P,
    /// MIME type of `payload`.
    pub content_type: String,
    pub provider: AiProviderType,
    pub model: String,
    pub elapsed: Duration,
    /// Requested media length; zero for text, images and unspecified durations.
    pub duration: Duration,
    pub usage: Usage,
}

pub type TextGenerationResult = GenerationResult<String>;
pub type ImageGenerationResult = GenerationResult<Vec<u8>>;
pub type AudioGenerationResult = GenerationResult<Vec<u8>>;
pub type VideoGenerationResult = GenerationResult<Vec<u8>>;

// Provider-level requests: prompts are fully resolved and the model is fixed.

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrompt {
    pub model: String,
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrompt {
    pub model: String,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioPrompt {
    pub model: String,
    pub prompt: String,
    pub voice: Option<String>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoPrompt {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: Option<String>,
    pub duration: Option<Duration>,
}
