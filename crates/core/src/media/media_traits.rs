use async_trait::async_trait;

use crate::errors::Result;
use crate::media::media_model::{MediaResource, NewMediaResource};

/// Trait for the binary media store
#[async_trait]
pub trait MediaStoreTrait: Send + Sync {
    fn get(&self, resource_id: &str) -> Result<Option<MediaResource>>;

    /// Persists `data` and its metadata.
    async fn save(&self, resource: NewMediaResource, data: Vec<u8>) -> Result<MediaResource>;

    /// Loads metadata and content; `NotFound` when absent.
    async fn read(&self, resource_id: &str) -> Result<(MediaResource, Vec<u8>)>;

    /// Removes metadata and content; returns false when nothing was stored.
    async fn delete(&self, resource_id: &str) -> Result<bool>;
}
