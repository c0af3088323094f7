use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use vtt_core::errors::{Error, ValidationError};
use vtt_core::media::{MediaResource, MediaStoreTrait, NewMediaResource};
use vtt_core::Result;

use super::model::MediaResourceDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::media_resources;

/// Stores resource content under `root` and its metadata in `media_resources`.
pub struct MediaStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    root: PathBuf,
}

/// Joins a relative `/`-separated path onto `root`, refusing anything that escapes it.
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => resolved.push(part),
            _ => {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Invalid media path '{}'",
                    relative
                ))))
            }
        }
    }
    Ok(resolved)
}

impl MediaStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, root: impl Into<PathBuf>) -> Self {
        MediaStore {
            pool,
            writer,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStoreTrait for MediaStore {
    fn get(&self, resource_id: &str) -> Result<Option<MediaResource>> {
        let mut conn = get_connection(&self.pool)?;
        let row = media_resources::table
            .find(resource_id)
            .select(MediaResourceDB::as_select())
            .first::<MediaResourceDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(|r| MediaResource::try_from(r).map_err(Into::into))
            .transpose()
    }

    async fn save(&self, resource: NewMediaResource, data: Vec<u8>) -> Result<MediaResource> {
        let id = Uuid::now_v7().to_string();
        let folder = resource.folder.trim_matches('/');
        let path = if folder.is_empty() {
            id.clone()
        } else {
            format!("{}/{}", folder, id)
        };
        let target = resolve(&self.root, &path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.into_core()?;
        }
        tokio::fs::write(&target, &data).await.into_core()?;

        let stored = MediaResource {
            id,
            owner_id: resource.owner_id,
            role: resource.role,
            path,
            file_name: resource.file_name,
            content_type: resource.content_type,
            file_size: data.len() as u64,
            created_at: Utc::now().naive_utc(),
        };
        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MediaResource> {
                let row: MediaResourceDB = stored.into();
                let inserted = diesel::insert_into(media_resources::table)
                    .values(&row)
                    .returning(MediaResourceDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(MediaResource::try_from(inserted)?)
            })
            .await;

        if inserted.is_err() {
            if let Err(e) = tokio::fs::remove_file(&target).await {
                warn!("Failed to remove orphaned media file {}: {}", target.display(), e);
            }
        } else {
            debug!("Stored media file {} ({} bytes)", target.display(), data.len());
        }
        inserted
    }

    async fn read(&self, resource_id: &str) -> Result<(MediaResource, Vec<u8>)> {
        let resource = self
            .get(resource_id)?
            .ok_or_else(|| Error::not_found("Resource", resource_id))?;
        let target = resolve(&self.root, &resource.path)?;
        match tokio::fs::read(&target).await {
            Ok(data) => Ok((resource, data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Media file {} is missing", target.display());
                Err(Error::not_found("Resource", resource_id))
            }
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn delete(&self, resource_id: &str) -> Result<bool> {
        let Some(resource) = self.get(resource_id)? else {
            return Ok(false);
        };
        let id = resource.id.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(media_resources::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await?;

        let target = resolve(&self.root, &resource.path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove media file {}: {}", target.display(), e),
        }
        Ok(true)
    }
}
