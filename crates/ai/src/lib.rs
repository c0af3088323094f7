//! VTT Tools AI - content generation over pluggable providers.
//!
//! # Architecture
//!
//! - `catalog`: provider catalog and per-content-type defaults (embedded JSON)
//! - `providers`: provider traits, the provider factory, OpenAI and rig-core backends
//! - `generation`: text, image, audio and video generation services
//! - `ingest`: bulk asset ingest service and its background worker
//! - `media_analysis`: name/description/tag suggestions for uploaded media
//! - `types`: request and result envelopes
//!
//! # Example
//!
//! ```ignore
//! use vtt_ai::{AiCatalog, ProviderFactory, AudioGenerationService, AudioGenerationServiceTrait};
//!
//! let catalog = AiCatalog::load(None)?;
//! let factory = Arc::new(ProviderFactory::from_catalog(catalog, reqwest::Client::new()));
//! let audio = AudioGenerationService::new(factory, template_service);
//!
//! let result = audio.generate(AudioGenerationRequest {
//!     prompt: "Epic battle music".to_string(),
//!     duration: Some(Duration::from_secs(30)),
//!     ..Default::default()
//! }).await?;
//! ```

pub mod catalog;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod media_analysis;
pub mod providers;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;

pub use catalog::{AiCatalog, CatalogProvider, ContentTypeDefault};
pub use error::AiError;
pub use generation::{
    AudioGenerationService, AudioGenerationServiceTrait, ImageGenerationService,
    ImageGenerationServiceTrait, TextGenerationService, TextGenerationServiceTrait,
    VideoGenerationService, VideoGenerationServiceTrait, ASPECT_RATIOS, MAX_DURATION,
};
pub use ingest::{spawn_ingest_worker, IngestQueue, IngestService};
pub use media_analysis::{
    AnalysisResult, MediaAnalysisRequest, MediaAnalysisService, MediaAnalysisServiceTrait,
    MediaType,
};
pub use providers::openai::OpenAiClient;
pub use providers::{
    AiProviderFactory, AudioProvider, ImageProvider, OpenAiProvider, ProviderFactory,
    RigTextProvider, TextProvider, VideoProvider,
};
pub use types::{
    AudioGenerationRequest, AudioGenerationResult, GenerationResult, ImageGenerationRequest,
    ImageGenerationResult, TemplateReference, TextGenerationRequest, TextGenerationResult,
    Usage, VideoGenerationRequest, VideoGenerationResult, AUDIO_CONTENT_TYPE,
    IMAGE_CONTENT_TYPE, TEXT_CONTENT_TYPE, VIDEO_CONTENT_TYPE,
};
