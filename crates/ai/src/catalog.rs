//! AI provider catalog.
//!
//! The catalog lists the known providers (endpoint, API key variable, default
//! models per modality) and the provider/model pair used for each content
//! type. An embedded JSON document is the default; deployments may replace it
//! with their own file.

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::AiError;
use vtt_core::ai::{AiProviderType, GeneratedContentType, Modality};

/// Embedded catalog, parsed once.
static EMBEDDED_CATALOG: Lazy<Result<AiCatalog, String>> = Lazy::new(|| {
    let json = include_str!("ai_providers.json");
    serde_json::from_str(json).map_err(|e| e.to_string())
});

/// One provider entry of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProvider {
    pub id: AiProviderType,
    pub name: String,
    pub base_url: String,
    /// Environment variable holding the API key; `None` for keyless providers.
    #[serde(default)]
    pub env_key: Option<String>,
    /// Default model per modality.
    #[serde(default)]
    pub models: HashMap<Modality, String>,
}

/// Provider and model configured for a content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeDefault {
    pub provider: AiProviderType,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiCatalog {
    pub providers: Vec<CatalogProvider>,
    /// Provider used for a modality when neither request nor content type names one.
    #[serde(default)]
    pub default_providers: HashMap<Modality, AiProviderType>,
    #[serde(default)]
    pub content_types: HashMap<GeneratedContentType, ContentTypeDefault>,
}

impl AiCatalog {
    /// The catalog compiled into the crate.
    pub fn embedded() -> Result<Self, AiError> {
        EMBEDDED_CATALOG
            .as_ref()
            .map(Clone::clone)
            .map_err(|e| AiError::internal(format!("Failed to parse ai_providers.json: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, AiError> {
        serde_json::from_str(json)
            .map_err(|e| AiError::invalid_input(format!("Invalid AI catalog: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, AiError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AiError::invalid_input(format!(
                "Failed to read AI catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded AI catalog from {}", path.display());
        Self::from_json(&json)
    }

    /// Loads `path` when given, otherwise the embedded catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, AiError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn provider(&self, provider: AiProviderType) -> Option<&CatalogProvider> {
        self.providers.iter().find(|p| p.id == provider)
    }

    pub fn content_type_default(
        &self,
        content_type: GeneratedContentType,
    ) -> Option<&ContentTypeDefault> {
        self.content_types.get(&content_type)
    }

    pub fn default_provider(&self, modality: Modality) -> Option<AiProviderType> {
        self.default_providers.get(&modality).copied()
    }

    pub fn default_model(&self, provider: AiProviderType, modality: Modality) -> Option<&str> {
        self.provider(provider)
            .and_then(|p| p.models.get(&modality))
            .map(String::as_str)
    }

    /// API key for `provider` from its environment variable.
    ///
    /// Returns `None` for keyless providers and for unset or blank variables.
    pub fn api_key(&self, provider: AiProviderType) -> Option<String> {
        let env_key = self.provider(provider)?.env_key.as_deref()?;
        match std::env::var(env_key) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ => {
                warn!("{} is not set; {} will be unavailable", env_key, provider);
                None
            }
        }
    }
}
