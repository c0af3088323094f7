use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use vtt_ai::{
    spawn_ingest_worker, AiCatalog, AiProviderFactory, AudioGenerationService,
    AudioGenerationServiceTrait, ImageGenerationService, ImageGenerationServiceTrait,
    IngestQueue, IngestService, MediaAnalysisService,
    MediaAnalysisServiceTrait, OpenAiClient, ProviderFactory, TextGenerationService,
    TextGenerationServiceTrait, VideoGenerationService, VideoGenerationServiceTrait,
};
use vtt_core::ai::AiProviderType;
use vtt_core::{
    ingest::IngestServiceTrait,
    library::{LibraryService, LibraryServiceTrait},
    media::MediaStoreTrait,
    prompt_templates::{PromptTemplateService, PromptTemplateServiceTrait},
    users::{UserAdminService, UserAdminServiceTrait},
};
use vtt_storage_sqlite::{
    db, IngestRepository, LibraryRepository, MediaStore, PromptTemplateRepository, UserRepository,
};

pub struct AppState {
    pub prompt_template_service: Arc<dyn PromptTemplateServiceTrait>,
    pub library_service: Arc<dyn LibraryServiceTrait>,
    pub text_service: Arc<dyn TextGenerationServiceTrait>,
    pub image_service: Arc<dyn ImageGenerationServiceTrait>,
    pub audio_service: Arc<dyn AudioGenerationServiceTrait>,
    pub video_service: Arc<dyn VideoGenerationServiceTrait>,
    pub media_analysis_service: Arc<dyn MediaAnalysisServiceTrait>,
    pub user_service: Arc<dyn UserAdminServiceTrait>,
    pub ingest_service: Arc<dyn IngestServiceTrait>,
    pub ingest_queue: IngestQueue,
    pub media_store: Arc<dyn MediaStoreTrait>,
    pub provider_factory: Arc<ProviderFactory>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("VTT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(pool.clone());

    let template_repo = Arc::new(PromptTemplateRepository::new(pool.clone(), writer.clone()));
    let prompt_template_service: Arc<dyn PromptTemplateServiceTrait> =
        Arc::new(PromptTemplateService::new(template_repo));

    let user_repo = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let user_service: Arc<dyn UserAdminServiceTrait> = Arc::new(UserAdminService::new(user_repo));

    let media_store: Arc<dyn MediaStoreTrait> = Arc::new(MediaStore::new(
        pool.clone(),
        writer.clone(),
        config.media_dir.clone(),
    ));
    tracing::info!("Media directory in use: {}", config.media_dir.display());

    let library_repo = Arc::new(LibraryRepository::new(pool.clone(), writer.clone()));
    let library_service: Arc<dyn LibraryServiceTrait> = Arc::new(LibraryService::new(
        library_repo,
        config.master_user_id.clone(),
    ));

    let catalog = AiCatalog::load(config.ai_config.as_deref())?;
    if let Some(path) = &config.ai_config {
        tracing::info!("AI catalog loaded from {}", path.display());
    }
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let analysis_client = catalog
        .provider(AiProviderType::OpenAi)
        .zip(catalog.api_key(AiProviderType::OpenAi))
        .map(|(entry, key)| OpenAiClient::new(http.clone(), entry.base_url.clone(), key));

    let provider_factory = Arc::new(ProviderFactory::from_catalog(catalog, http));
    let factory: Arc<dyn AiProviderFactory> = provider_factory.clone();

    let text_service = Arc::new(TextGenerationService::new(
        factory.clone(),
        prompt_template_service.clone(),
    ));
    let image_service = Arc::new(ImageGenerationService::new(
        factory.clone(),
        prompt_template_service.clone(),
    ));
    let audio_service = Arc::new(AudioGenerationService::new(
        factory.clone(),
        prompt_template_service.clone(),
    ));
    let video_service = Arc::new(VideoGenerationService::new(
        factory.clone(),
        prompt_template_service.clone(),
    ));
    let media_analysis_service = Arc::new(MediaAnalysisService::new(factory, analysis_client));

    let ingest_service: Arc<dyn IngestServiceTrait> = Arc::new(IngestService::new(
        library_service.clone(),
        Arc::new(IngestRepository::new(pool.clone(), writer.clone())),
        media_store.clone(),
        image_service.clone(),
    ));
    let ingest_queue = spawn_ingest_worker(ingest_service.clone());
    let unfinished = ingest_service.unfinished_jobs()?;
    if !unfinished.is_empty() {
        tracing::info!("Resuming {} unfinished ingest job(s)", unfinished.len());
    }
    for job_id in unfinished {
        ingest_queue.enqueue(job_id);
    }

    Ok(Arc::new(AppState {
        prompt_template_service,
        library_service,
        text_service,
        image_service,
        audio_service,
        video_service,
        media_analysis_service,
        user_service,
        ingest_service,
        ingest_queue,
        media_store,
        provider_factory,
        db_path,
    }))
}
