//! AI domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// Kind of content a generation request produces.
///
/// Used as the key for per-content-type provider/model defaults and as the
/// category of prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratedContentType {
    TextDescription,
    PromptEnhancement,
    ImagePortrait,
    ImageToken,
    ImageBackground,
    AudioAmbient,
    AudioEffect,
    AudioMusic,
    VideoBackground,
    MediaAnalysis,
}

impl GeneratedContentType {
    pub const ALL: [GeneratedContentType; 10] = [
        GeneratedContentType::TextDescription,
        GeneratedContentType::PromptEnhancement,
        GeneratedContentType::ImagePortrait,
        GeneratedContentType::ImageToken,
        GeneratedContentType::ImageBackground,
        GeneratedContentType::AudioAmbient,
        GeneratedContentType::AudioEffect,
        GeneratedContentType::AudioMusic,
        GeneratedContentType::VideoBackground,
        GeneratedContentType::MediaAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratedContentType::TextDescription => "TextDescription",
            GeneratedContentType::PromptEnhancement => "PromptEnhancement",
            GeneratedContentType::ImagePortrait => "ImagePortrait",
            GeneratedContentType::ImageToken => "ImageToken",
            GeneratedContentType::ImageBackground => "ImageBackground",
            GeneratedContentType::AudioAmbient => "AudioAmbient",
            GeneratedContentType::AudioEffect => "AudioEffect",
            GeneratedContentType::AudioMusic => "AudioMusic",
            GeneratedContentType::VideoBackground => "VideoBackground",
            GeneratedContentType::MediaAnalysis => "MediaAnalysis",
        }
    }

    /// The provider modality that produces this content type.
    pub fn modality(&self) -> Modality {
        match self {
            GeneratedContentType::TextDescription
            | GeneratedContentType::PromptEnhancement
            | GeneratedContentType::MediaAnalysis => Modality::Text,
            GeneratedContentType::ImagePortrait
            | GeneratedContentType::ImageToken
            | GeneratedContentType::ImageBackground => Modality::Image,
            GeneratedContentType::AudioAmbient
            | GeneratedContentType::AudioEffect
            | GeneratedContentType::AudioMusic => Modality::Audio,
            GeneratedContentType::VideoBackground => Modality::Video,
        }
    }
}

impl fmt::Display for GeneratedContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratedContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneratedContentType::ALL
            .iter()
            .find(|ct| ct.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown content type '{}'",
                    s
                )))
            })
    }
}

/// Output modality of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Video => "video",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an AI provider implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiProviderType {
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Ollama,
}

impl AiProviderType {
    pub const ALL: [AiProviderType; 5] = [
        AiProviderType::OpenAi,
        AiProviderType::Anthropic,
        AiProviderType::Google,
        AiProviderType::Groq,
        AiProviderType::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiProviderType::OpenAi => "OpenAi",
            AiProviderType::Anthropic => "Anthropic",
            AiProviderType::Google => "Google",
            AiProviderType::Groq => "Groq",
            AiProviderType::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for AiProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProviderType::OpenAi),
            "anthropic" => Ok(AiProviderType::Anthropic),
            "google" | "gemini" => Ok(AiProviderType::Google),
            "groq" => Ok(AiProviderType::Groq),
            "ollama" => Ok(AiProviderType::Ollama),
            _ => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown AI provider '{}'",
                s
            )))),
        }
    }
}
