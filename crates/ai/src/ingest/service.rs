use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::generation::ImageGenerationServiceTrait;
use crate::types::ImageGenerationRequest;
use vtt_core::errors::{Error, Result};
use vtt_core::ingest::{
    asset_folder, build_prompt, IngestAsset, IngestAssetPage, IngestAssetView,
    IngestBatchResponse, IngestFailure, IngestJob, IngestJobItem, IngestJobResponse,
    IngestListRequest, IngestRepositoryTrait, IngestRequest, IngestServiceTrait, IngestStatus,
    JobItemStatus, JobStatus, RejectRequest,
};
use vtt_core::library::{
    LibraryContentKind, LibraryContentUpdate, LibraryServiceTrait, NewLibraryContent,
};
use vtt_core::media::{MediaStoreTrait, NewMediaResource, ResourceRole};

const CANCELED_MESSAGE: &str = "Job canceled";

/// Drives the ingest workflow over the library, the media store and image generation.
pub struct IngestService {
    library: Arc<dyn LibraryServiceTrait>,
    repository: Arc<dyn IngestRepositoryTrait>,
    media: Arc<dyn MediaStoreTrait>,
    images: Arc<dyn ImageGenerationServiceTrait>,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn aspect_ratio(role: ResourceRole) -> &'static str {
    match role {
        ResourceRole::Portrait => "2:3",
        ResourceRole::Token => "1:1",
    }
}

fn require_ids(asset_ids: &[String]) -> Result<()> {
    if asset_ids.is_empty() {
        return Err(Error::field("assetIds", "At least one asset is required."));
    }
    Ok(())
}

impl IngestService {
    pub fn new(
        library: Arc<dyn LibraryServiceTrait>,
        repository: Arc<dyn IngestRepositoryTrait>,
        media: Arc<dyn MediaStoreTrait>,
        images: Arc<dyn ImageGenerationServiceTrait>,
    ) -> Self {
        Self {
            library,
            repository,
            media,
            images,
        }
    }

    /// Loads the asset when its status is one of `allowed`, otherwise the failure reason.
    fn load_in(
        &self,
        asset_id: &str,
        allowed: &[IngestStatus],
    ) -> Result<std::result::Result<IngestAsset, IngestFailure>> {
        Ok(match self.repository.get_asset(asset_id)? {
            None => Err(IngestFailure::new(asset_id, "Asset not found")),
            Some(asset) if !allowed.contains(&asset.status) => Err(IngestFailure::new(
                asset_id,
                format!("Invalid status: {}", asset.status),
            )),
            Some(asset) => Ok(asset),
        })
    }

    async fn clear_resources(&self, asset: &mut IngestAsset) -> Result<()> {
        for role in ResourceRole::ALL {
            if let Some(resource_id) = asset.resource_id(role).map(str::to_string) {
                self.media.delete(&resource_id).await?;
                asset.set_resource(role, None);
            }
        }
        Ok(())
    }

    async fn set_published(&self, asset_id: &str, is_published: bool) -> Result<()> {
        self.library
            .update(
                LibraryContentKind::Asset,
                asset_id,
                LibraryContentUpdate {
                    is_published: Some(is_published),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    async fn save_asset(&self, mut asset: IngestAsset) -> Result<IngestAsset> {
        asset.updated_at = now();
        self.repository.update_asset(asset).await
    }

    async fn queue_job(
        &self,
        assets: Vec<(String, Vec<ResourceRole>)>,
        failures: Vec<IngestFailure>,
    ) -> Result<IngestJobResponse> {
        let job = IngestJob::new(Uuid::now_v7().to_string(), &assets, now());
        let job = self.repository.insert_job(job).await?;
        info!(
            "Queued ingest job {} with {} item(s) for {} asset(s)",
            job.id,
            job.items.len(),
            assets.len()
        );
        Ok(IngestJobResponse {
            job_id: job.id,
            asset_ids: assets.into_iter().map(|(id, _)| id).collect(),
            item_count: job.items.len(),
            failures,
        })
    }

    fn list(
        &self,
        statuses: &[IngestStatus],
        request: IngestListRequest,
    ) -> Result<IngestAssetPage> {
        let (skip, take) = request.pagination();
        let rows = self.repository.list_by_status(statuses, skip, take)?;
        let items = rows
            .items
            .into_iter()
            .map(|asset| self.view(asset))
            .collect::<Result<Vec<_>>>()?;
        let has_more = u64::from(skip) + (items.len() as u64) < rows.total_count;
        Ok(IngestAssetPage {
            items,
            total_count: rows.total_count,
            has_more,
        })
    }

    fn view(&self, asset: IngestAsset) -> Result<IngestAssetView> {
        let content = self.library.get(LibraryContentKind::Asset, &asset.asset_id)?;
        let resource = |role| -> Result<_> {
            match asset.resource_id(role) {
                Some(id) => self.media.get(id),
                None => Ok(None),
            }
        };
        Ok(IngestAssetView {
            portrait: resource(ResourceRole::Portrait)?,
            token: resource(ResourceRole::Token)?,
            asset_id: asset.asset_id,
            name: content.name,
            description: content.description,
            is_published: content.is_published,
            status: asset.status,
            ai_prompt: asset.ai_prompt,
            category: asset.category,
            asset_type: asset.asset_type,
            environment: asset.environment,
            updated_at: asset.updated_at,
        })
    }

    /// Generates and stores one image, returning the new resource id.
    async fn generate_item(&self, item: &IngestJobItem) -> std::result::Result<String, String> {
        let asset = match self.repository.get_asset(&item.asset_id) {
            Ok(Some(asset)) => asset,
            Ok(None) => return Err("Asset not found".to_string()),
            Err(e) => return Err(e.to_string()),
        };
        let content = self
            .library
            .get(LibraryContentKind::Asset, &item.asset_id)
            .map_err(|e| e.to_string())?;
        let prompt = match asset.ai_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(prompt) => prompt.trim().to_string(),
            None => build_prompt(
                &content.name,
                Some(content.description.as_str()),
                asset.category.as_deref(),
                asset.asset_type.as_deref(),
                asset.environment.as_deref(),
            ),
        };

        let generated = self
            .images
            .generate(ImageGenerationRequest {
                content_type: item.role.content_type(),
                prompt,
                aspect_ratio: Some(aspect_ratio(item.role).to_string()),
                ..Default::default()
            })
            .await
            .map_err(|e| format!("Generation failed: {}", e))?;

        let resource = self
            .media
            .save(
                NewMediaResource {
                    owner_id: item.asset_id.clone(),
                    role: item.role,
                    folder: asset_folder(&item.asset_id),
                    file_name: format!("{}.png", item.role.as_str().to_lowercase()),
                    content_type: generated.content_type,
                },
                generated.payload,
            )
            .await
            .map_err(|e| format!("Storing image failed: {}", e))?;

        // Re-read so concurrent review actions on other roles are not overwritten.
        let stored = async {
            let mut asset = self
                .repository
                .get_asset(&item.asset_id)?
                .ok_or_else(|| Error::not_found("IngestAsset", item.asset_id.as_str()))?;
            if let Some(previous) = asset.resource_id(item.role).map(str::to_string) {
                self.media.delete(&previous).await?;
            }
            asset.set_resource(item.role, Some(resource.id.clone()));
            self.save_asset(asset).await
        }
        .await;
        if let Err(e) = stored {
            if let Err(cleanup) = self.media.delete(&resource.id).await {
                warn!("Failed to remove unreferenced resource {}: {}", resource.id, cleanup);
            }
            return Err(format!("Storing image failed: {}", e));
        }
        Ok(resource.id)
    }

    /// Moves the asset out of processing once none of its items are outstanding.
    async fn settle(&self, job: &IngestJob, asset_id: &str) -> Result<()> {
        if job.has_unfinished_items(asset_id) {
            return Ok(());
        }
        let Some(mut asset) = self.repository.get_asset(asset_id)? else {
            return Ok(());
        };
        if !matches!(asset.status, IngestStatus::Pending | IngestStatus::Processing) {
            return Ok(());
        }
        asset.status = asset.settled_status();
        debug!("Ingest asset {} settled as {}", asset_id, asset.status);
        self.save_asset(asset).await?;
        Ok(())
    }

    fn load_job(&self, job_id: &str) -> Result<IngestJob> {
        self.repository
            .get_job(job_id)?
            .ok_or_else(|| Error::not_found("IngestJob", job_id))
    }
}

#[async_trait]
impl IngestServiceTrait for IngestService {
    async fn ingest(&self, request: IngestRequest) -> Result<IngestJobResponse> {
        if request.items.is_empty() {
            return Err(Error::field("items", "At least one item is required."));
        }

        let mut assets = Vec::with_capacity(request.items.len());
        let mut failures = Vec::new();
        for (index, item) in request.items.into_iter().enumerate() {
            let created = self
                .library
                .create(
                    LibraryContentKind::Asset,
                    NewLibraryContent {
                        name: item.name,
                        description: item.description,
                        parent_id: None,
                    },
                )
                .await;
            let content = match created {
                Ok(content) => content,
                Err(e) => {
                    failures.push(IngestFailure::new(format!("items[{}]", index), e.to_string()));
                    continue;
                }
            };

            let timestamp = now();
            self.repository
                .insert_asset(IngestAsset {
                    asset_id: content.id.clone(),
                    status: IngestStatus::Pending,
                    ai_prompt: None,
                    category: item.category,
                    asset_type: item.asset_type,
                    environment: item.environment,
                    portrait_id: None,
                    token_id: None,
                    created_at: timestamp,
                    updated_at: timestamp,
                })
                .await?;
            assets.push((content.id, ResourceRole::ALL.to_vec()));
        }

        if assets.is_empty() {
            return Err(Error::field("items", "No valid assets found to ingest"));
        }
        self.queue_job(assets, failures).await
    }

    async fn approve(&self, asset_ids: Vec<String>) -> Result<IngestBatchResponse> {
        require_ids(&asset_ids)?;
        let mut response = IngestBatchResponse::default();
        for asset_id in asset_ids {
            let mut asset = match self.load_in(&asset_id, &IngestStatus::IN_REVIEW)? {
                Ok(asset) => asset,
                Err(failure) => {
                    response.failures.push(failure);
                    continue;
                }
            };
            self.set_published(&asset_id, true).await?;
            asset.status = IngestStatus::Approved;
            self.save_asset(asset).await?;
            response.succeeded_ids.push(asset_id);
        }
        info!(
            "Approved {} ingest asset(s), {} failure(s)",
            response.succeeded_ids.len(),
            response.failures.len()
        );
        Ok(response)
    }

    async fn reject(&self, request: RejectRequest) -> Result<IngestJobResponse> {
        if request.items.is_empty() {
            return Err(Error::field("items", "At least one item is required."));
        }
        let mut assets = Vec::new();
        let mut failures = Vec::new();
        for item in request.items {
            let mut asset = match self.load_in(&item.asset_id, &IngestStatus::IN_REVIEW)? {
                Ok(asset) => asset,
                Err(failure) => {
                    failures.push(failure);
                    continue;
                }
            };
            self.clear_resources(&mut asset).await?;
            if let Some(prompt) = item.ai_prompt.filter(|p| !p.trim().is_empty()) {
                asset.ai_prompt = Some(prompt.trim().to_string());
            }
            asset.status = IngestStatus::Pending;
            self.save_asset(asset).await?;
            assets.push((item.asset_id, ResourceRole::ALL.to_vec()));
        }

        if assets.is_empty() {
            return Err(Error::field("items", "No valid assets found to reject"));
        }
        self.queue_job(assets, failures).await
    }

    async fn discard(&self, asset_ids: Vec<String>) -> Result<IngestBatchResponse> {
        require_ids(&asset_ids)?;
        const DISCARDABLE: [IngestStatus; 3] = [
            IngestStatus::PendingReview,
            IngestStatus::PartialFailure,
            IngestStatus::Failed,
        ];
        let mut response = IngestBatchResponse::default();
        for asset_id in asset_ids {
            let mut asset = match self.load_in(&asset_id, &DISCARDABLE)? {
                Ok(asset) => asset,
                Err(failure) => {
                    response.failures.push(failure);
                    continue;
                }
            };
            self.clear_resources(&mut asset).await?;
            self.set_published(&asset_id, false).await?;
            asset.status = IngestStatus::Discarded;
            self.save_asset(asset).await?;
            response.succeeded_ids.push(asset_id);
        }
        info!(
            "Discarded {} ingest asset(s), {} failure(s)",
            response.succeeded_ids.len(),
            response.failures.len()
        );
        Ok(response)
    }

    async fn retry_failed(&self, asset_ids: Vec<String>) -> Result<IngestJobResponse> {
        require_ids(&asset_ids)?;
        const RETRYABLE: [IngestStatus; 2] = [IngestStatus::PartialFailure, IngestStatus::Failed];
        let mut assets = Vec::new();
        let mut failures = Vec::new();
        for asset_id in asset_ids {
            let mut asset = match self.load_in(&asset_id, &RETRYABLE)? {
                Ok(asset) => asset,
                Err(failure) => {
                    failures.push(failure);
                    continue;
                }
            };
            let missing = asset.missing_roles();
            asset.status = IngestStatus::Pending;
            self.save_asset(asset).await?;
            assets.push((asset_id, missing));
        }

        if assets.is_empty() {
            return Err(Error::field("assetIds", "No valid assets found to retry"));
        }
        self.queue_job(assets, failures).await
    }

    fn processing(&self, request: IngestListRequest) -> Result<IngestAssetPage> {
        self.list(&IngestStatus::IN_PROCESSING, request)
    }

    fn review(&self, request: IngestListRequest) -> Result<IngestAssetPage> {
        self.list(&IngestStatus::IN_REVIEW, request)
    }

    fn history(&self, request: IngestListRequest) -> Result<IngestAssetPage> {
        self.list(&IngestStatus::IN_HISTORY, request)
    }

    fn get_job(&self, job_id: &str) -> Result<IngestJob> {
        self.load_job(job_id)
    }

    fn unfinished_jobs(&self) -> Result<Vec<String>> {
        self.repository
            .list_job_ids(&[JobStatus::Pending, JobStatus::InProgress])
    }

    async fn cancel_job(&self, job_id: &str) -> Result<IngestJob> {
        let mut job = self.load_job(job_id)?;
        if job.is_finished() {
            return Err(Error::field(
                "status",
                format!("Job '{}' is already {}", job_id, job.status),
            ));
        }

        let timestamp = now();
        let mut affected = Vec::new();
        for item in job
            .items
            .iter_mut()
            .filter(|item| item.status == JobItemStatus::Pending)
        {
            item.status = JobItemStatus::Failed;
            item.message = Some(CANCELED_MESSAGE.to_string());
            item.completed_at = Some(timestamp);
            self.repository.update_job_item(job_id, item.clone()).await?;
            if !affected.contains(&item.asset_id) {
                affected.push(item.asset_id.clone());
            }
        }
        job.status = JobStatus::Canceled;
        job.completed_at = Some(timestamp);
        let job = self.repository.update_job(job).await?;

        for asset_id in &affected {
            self.settle(&job, asset_id).await?;
        }
        info!("Canceled ingest job {} ({} item(s) skipped)", job_id, affected.len());
        Ok(job)
    }

    async fn process_job(&self, job_id: &str) -> Result<IngestJob> {
        let mut job = self.load_job(job_id)?;
        if job.is_finished() {
            return Ok(job);
        }
        if job.status == JobStatus::Pending {
            job.status = JobStatus::InProgress;
            job.started_at = Some(now());
            job = self.repository.update_job(job).await?;
        }

        loop {
            // Reloaded each round so a cancel takes effect between items.
            job = self.load_job(job_id)?;
            if job.status == JobStatus::Canceled {
                info!("Ingest job {} was canceled", job_id);
                return Ok(job);
            }
            let Some(mut item) = job
                .items
                .iter()
                .find(|item| item.status == JobItemStatus::Pending)
                .cloned()
            else {
                break;
            };

            item.status = JobItemStatus::InProgress;
            item.started_at = Some(now());
            self.repository.update_job_item(job_id, item.clone()).await?;
            if let Some(mut asset) = self.repository.get_asset(&item.asset_id)? {
                if asset.status == IngestStatus::Pending {
                    asset.status = IngestStatus::Processing;
                    self.save_asset(asset).await?;
                }
            }

            match self.generate_item(&item).await {
                Ok(resource_id) => {
                    debug!(
                        "Generated {} for asset {} as resource {}",
                        item.role, item.asset_id, resource_id
                    );
                    item.status = JobItemStatus::Success;
                    item.message = Some(resource_id);
                }
                Err(reason) => {
                    warn!(
                        "Ingest item {} of job {} failed: {}",
                        item.index, job_id, reason
                    );
                    item.status = JobItemStatus::Failed;
                    item.message = Some(reason);
                }
            }
            item.completed_at = Some(now());
            self.repository.update_job_item(job_id, item.clone()).await?;

            let current = self.load_job(job_id)?;
            self.settle(&current, &item.asset_id).await?;
        }

        job.status = JobStatus::Completed;
        job.completed_at = Some(now());
        let job = self.repository.update_job(job).await?;
        let failed = job
            .items
            .iter()
            .filter(|item| item.status == JobItemStatus::Failed)
            .count();
        info!(
            "Ingest job {} completed: {} item(s), {} failed",
            job_id,
            job.items.len(),
            failed
        );
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AiCatalog;
    use crate::error::AiError;
    use crate::generation::ImageGenerationService;
    use crate::providers::ProviderFactory;
    use crate::test_support::{Call, FakeProvider, FakeTemplates};
    use crate::types::{ImageGenerationResult, Usage};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use vtt_core::ai::{AiProviderType, GeneratedContentType};
    use vtt_core::ingest::{IngestItemRequest, RejectItem};
    use vtt_core::library::LibraryService;
    use vtt_storage_sqlite::{
        create_pool, init, run_migrations, spawn_writer, IngestRepository, LibraryRepository,
        MediaStore,
    };

    /// Image generator failing for selected content types and recording prompts.
    #[derive(Default)]
    struct ScriptedImages {
        failing: Mutex<Vec<GeneratedContentType>>,
        prompts: Mutex<Vec<(GeneratedContentType, String)>>,
    }

    #[async_trait]
    impl ImageGenerationServiceTrait for ScriptedImages {
        async fn generate(
            &self,
            request: ImageGenerationRequest,
        ) -> std::result::Result<ImageGenerationResult, AiError> {
            self.prompts
                .lock()
                .unwrap()
                .push((request.content_type, request.prompt.clone()));
            if self.failing.lock().unwrap().contains(&request.content_type) {
                return Err(AiError::provider("quota exceeded"));
            }
            Ok(ImageGenerationResult {
                payload: vec![0x89, 0x50, 0x4E, 0x47],
                content_type: "image/png".to_string(),
                provider: AiProviderType::OpenAi,
                model: "gpt-image-1".to_string(),
                elapsed: Duration::ZERO,
                duration: Duration::ZERO,
                usage: Usage::default(),
            })
        }
    }

    struct Harness {
        _dir: TempDir,
        service: IngestService,
        library: Arc<LibraryService>,
        media: Arc<MediaStore>,
    }

    fn harness(images: Arc<dyn ImageGenerationServiceTrait>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.clone());

        let library = Arc::new(LibraryService::new(
            Arc::new(LibraryRepository::new(pool.clone(), writer.clone())),
            "master".to_string(),
        ));
        let media = Arc::new(MediaStore::new(
            pool.clone(),
            writer.clone(),
            dir.path().join("media"),
        ));
        let repository = Arc::new(IngestRepository::new(pool, writer));
        let service = IngestService::new(library.clone(), repository, media.clone(), images);
        Harness {
            _dir: dir,
            service,
            library,
            media,
        }
    }

    fn items(names: &[&str]) -> IngestRequest {
        IngestRequest {
            items: names
                .iter()
                .map(|name| IngestItemRequest {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn status(h: &Harness, asset_id: &str) -> IngestStatus {
        h.service.repository.get_asset(asset_id).unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_ingest_generates_both_images_and_approve_publishes() {
        let provider = Arc::new(FakeProvider::bytes(AiProviderType::OpenAi, vec![1, 2, 3]));
        let factory = ProviderFactory::new(AiCatalog::embedded().unwrap())
            .with_image_provider(provider.clone());
        let images =
            ImageGenerationService::new(Arc::new(factory), FakeTemplates::with(Vec::new()));
        let h = harness(Arc::new(images));

        let queued = h
            .service
            .ingest(IngestRequest {
                items: vec![IngestItemRequest {
                    name: "Goblin".to_string(),
                    description: Some("A sneaky archer".to_string()),
                    environment: Some("a dark forest".to_string()),
                    ..Default::default()
                }],
            })
            .await
            .unwrap();
        assert_eq!(queued.item_count, 2);
        let asset_id = queued.asset_ids[0].clone();
        assert_eq!(h.service.processing(Default::default()).unwrap().total_count, 1);

        let job = h.service.process_job(&queued.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.items.iter().all(|i| i.status == JobItemStatus::Success));
        assert_eq!(provider.call_count(), 2);
        match provider.last_call() {
            Some(Call::Image(prompt)) => {
                assert_eq!(
                    prompt.prompt,
                    "A fantasy character named Goblin. A sneaky archer in a dark forest"
                );
                assert_eq!(prompt.aspect_ratio.as_deref(), Some("1:1"));
            }
            other => panic!("unexpected call {:?}", other),
        }

        let review = h.service.review(Default::default()).unwrap();
        assert_eq!(review.total_count, 1);
        let view = &review.items[0];
        assert_eq!(view.name, "Goblin");
        let token = view.token.as_ref().unwrap();
        assert_eq!(token.role, ResourceRole::Token);
        assert_eq!(token.path, format!("{}/{}", asset_folder(&asset_id), token.id));
        assert_eq!(h.media.read(&token.id).await.unwrap().1, vec![1, 2, 3]);

        let approved = h.service.approve(vec![asset_id.clone()]).await.unwrap();
        assert_eq!(approved.succeeded_ids, vec![asset_id.clone()]);
        assert!(h.library.get(LibraryContentKind::Asset, &asset_id).unwrap().is_published);
        assert_eq!(h.service.history(Default::default()).unwrap().total_count, 1);

        let again = h
            .service
            .approve(vec![asset_id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert!(again.succeeded_ids.is_empty());
        assert_eq!(
            again.failures,
            vec![
                IngestFailure::new(asset_id, "Invalid status: Approved"),
                IngestFailure::new("missing", "Asset not found"),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_then_retry_regenerates_only_missing_image() {
        let images = Arc::new(ScriptedImages::default());
        images
            .failing
            .lock()
            .unwrap()
            .push(GeneratedContentType::ImageToken);
        let h = harness(images.clone());

        let queued = h.service.ingest(items(&["Orc"])).await.unwrap();
        let asset_id = queued.asset_ids[0].clone();
        let job = h.service.process_job(&queued.job_id).await.unwrap();
        assert_eq!(
            job.items[1].message.as_deref(),
            Some("Generation failed: quota exceeded")
        );
        assert_eq!(status(&h, &asset_id), IngestStatus::PartialFailure);
        let portrait_id = h
            .service
            .repository
            .get_asset(&asset_id)
            .unwrap()
            .unwrap()
            .portrait_id
            .unwrap();

        images.failing.lock().unwrap().clear();
        let retry = h.service.retry_failed(vec![asset_id.clone()]).await.unwrap();
        assert_eq!(retry.item_count, 1);
        h.service.process_job(&retry.job_id).await.unwrap();

        let asset = h.service.repository.get_asset(&asset_id).unwrap().unwrap();
        assert_eq!(asset.status, IngestStatus::PendingReview);
        assert_eq!(asset.portrait_id, Some(portrait_id));
        assert!(asset.token_id.is_some());
        assert_eq!(images.prompts.lock().unwrap().len(), 3);

        let err = h.service.retry_failed(vec![asset_id]).await.unwrap_err();
        assert_eq!(err.field_errors()[0].message, "No valid assets found to retry");
    }

    #[tokio::test]
    async fn test_reject_replaces_images_using_the_new_prompt() {
        let images = Arc::new(ScriptedImages::default());
        let h = harness(images.clone());
        let queued = h.service.ingest(items(&["Dragon"])).await.unwrap();
        let asset_id = queued.asset_ids[0].clone();
        h.service.process_job(&queued.job_id).await.unwrap();
        let first = h.service.repository.get_asset(&asset_id).unwrap().unwrap();
        let old_portrait = first.portrait_id.clone().unwrap();

        let rejected = h
            .service
            .reject(RejectRequest {
                items: vec![RejectItem {
                    asset_id: asset_id.clone(),
                    ai_prompt: Some("  A red dragon perched on gold  ".to_string()),
                }],
            })
            .await
            .unwrap();
        assert!(h.media.get(&old_portrait).unwrap().is_none());
        assert_eq!(status(&h, &asset_id), IngestStatus::Pending);

        h.service.process_job(&rejected.job_id).await.unwrap();
        let prompts = images.prompts.lock().unwrap().clone();
        assert_eq!(prompts[0].1, "A fantasy character named Dragon");
        assert_eq!(prompts[3].1, "A red dragon perched on gold");
        let asset = h.service.repository.get_asset(&asset_id).unwrap().unwrap();
        assert_eq!(asset.status, IngestStatus::PendingReview);
        assert_ne!(asset.portrait_id, Some(old_portrait));

        let err = h
            .service
            .reject(RejectRequest {
                items: vec![RejectItem {
                    asset_id: "missing".to_string(),
                    ai_prompt: None,
                }],
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].message, "No valid assets found to reject");
    }

    #[tokio::test]
    async fn test_discard_failed_asset_and_validation() {
        let images = Arc::new(ScriptedImages::default());
        images.failing.lock().unwrap().extend([
            GeneratedContentType::ImagePortrait,
            GeneratedContentType::ImageToken,
        ]);
        let h = harness(images);

        let err = h.service.ingest(items(&[])).await.unwrap_err();
        assert_eq!(err.field_errors()[0].field, "items");

        let queued = h.service.ingest(items(&["Ghoul", "  "])).await.unwrap();
        assert_eq!(queued.asset_ids.len(), 1);
        assert_eq!(queued.failures.len(), 1);
        assert_eq!(queued.failures[0].asset_id, "items[1]");
        let asset_id = queued.asset_ids[0].clone();

        h.service.process_job(&queued.job_id).await.unwrap();
        assert_eq!(status(&h, &asset_id), IngestStatus::Failed);

        let discarded = h.service.discard(vec![asset_id.clone()]).await.unwrap();
        assert_eq!(discarded.succeeded_ids, vec![asset_id.clone()]);
        assert_eq!(status(&h, &asset_id), IngestStatus::Discarded);
        let history = h.service.history(Default::default()).unwrap();
        assert_eq!(history.items[0].status, IngestStatus::Discarded);
        assert!(!history.items[0].is_published);

        let again = h.service.discard(vec![asset_id]).await.unwrap();
        assert_eq!(again.failures[0].reason, "Invalid status: Discarded");
        assert!(h.service.discard(Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_skips_pending_items() {
        let images = Arc::new(ScriptedImages::default());
        let h = harness(images.clone());
        let queued = h.service.ingest(items(&["Kobold", "Imp"])).await.unwrap();
        assert_eq!(h.service.unfinished_jobs().unwrap(), vec![queued.job_id.clone()]);

        let canceled = h.service.cancel_job(&queued.job_id).await.unwrap();
        assert_eq!(canceled.status, JobStatus::Canceled);
        assert!(canceled
            .items
            .iter()
            .all(|i| i.message.as_deref() == Some(CANCELED_MESSAGE)));
        for asset_id in &queued.asset_ids {
            assert_eq!(status(&h, asset_id), IngestStatus::Failed);
        }

        let job = h.service.process_job(&queued.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Canceled);
        assert!(images.prompts.lock().unwrap().is_empty());
        assert!(h.service.unfinished_jobs().unwrap().is_empty());
        assert!(h.service.cancel_job(&queued.job_id).await.is_err());
        assert!(h.service.get_job("missing").unwrap_err().is_not_found());
    }
}
