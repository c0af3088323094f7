use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::library_model::{
    LibraryConfig, LibraryContent, LibraryContentKind, LibraryContentPage, LibraryContentUpdate,
    LibraryKindInfo, LibrarySearchRequest, NewLibraryContent, TransferOwnershipRequest,
};
use super::library_traits::{LibraryRepositoryTrait, LibraryServiceTrait};
use crate::constants::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use crate::errors::{Error, FieldError, Result, ValidationError};

/// Admin service for worlds, campaigns, adventures, encounters and assets
pub struct LibraryService {
    repository: Arc<dyn LibraryRepositoryTrait>,
    master_user_id: String,
}

impl LibraryService {
    pub fn new(repository: Arc<dyn LibraryRepositoryTrait>, master_user_id: String) -> Self {
        Self {
            repository,
            master_user_id,
        }
    }

    fn validate_parent(&self, kind: LibraryContentKind, parent_id: Option<&str>) -> Result<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let Some(parent_kind) = kind.parent_kind() else {
            return Err(Error::field(
                "parentId",
                format!("{} content cannot have a parent", kind),
            ));
        };
        match self.repository.get_by_id(parent_id)? {
            Some(parent) if parent.kind == parent_kind => Ok(()),
            _ => Err(Error::field(
                "parentId",
                format!("{} with id '{}' was not found", parent_kind, parent_id),
            )),
        }
    }

    /// Ids of `root` and everything below it, parents first.
    fn collect_subtree(&self, root: &str) -> Result<Vec<String>> {
        let mut ids = vec![root.to_string()];
        let mut cursor = 0;
        while cursor < ids.len() {
            let children = self.repository.list_children(&ids[cursor])?;
            ids.extend(children.into_iter().map(|c| c.id));
            cursor += 1;
        }
        Ok(ids)
    }
}

fn validate_fields(name: &str, description: &str) -> Result<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push(FieldError::new(
            "description",
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            ),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::Fields(errors)))
    }
}

#[async_trait::async_trait]
impl LibraryServiceTrait for LibraryService {
    fn config(&self) -> LibraryConfig {
        LibraryConfig {
            master_user_id: self.master_user_id.clone(),
            kinds: LibraryContentKind::ALL
                .into_iter()
                .map(|kind| LibraryKindInfo {
                    kind,
                    path: kind.plural().to_string(),
                    child_kind: kind.child_kind(),
                })
                .collect(),
        }
    }

    fn search(
        &self,
        kind: LibraryContentKind,
        request: LibrarySearchRequest,
    ) -> Result<LibraryContentPage> {
        let (skip, take) = request.pagination();
        let request = LibrarySearchRequest {
            skip: Some(skip),
            take: Some(take),
            ..request
        };
        let page = self.repository.search(kind, &request, &self.master_user_id)?;
        info!(
            "{} search completed: {} found (skip: {}, take: {}, total: {})",
            kind,
            page.items.len(),
            skip,
            take,
            page.total_count
        );
        Ok(page)
    }

    fn get(&self, kind: LibraryContentKind, content_id: &str) -> Result<LibraryContent> {
        self.repository
            .get_by_id(content_id)?
            .filter(|c| c.kind == kind)
            .ok_or_else(|| Error::not_found(kind.as_str(), content_id))
    }

    fn children(&self, kind: LibraryContentKind, content_id: &str) -> Result<Vec<LibraryContent>> {
        let parent = self.get(kind, content_id)?;
        let mut children = self.repository.list_children(&parent.id)?;
        children.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "Retrieved {} children for {} {}",
            children.len(),
            kind,
            content_id
        );
        Ok(children)
    }

    async fn create(
        &self,
        kind: LibraryContentKind,
        new_content: NewLibraryContent,
    ) -> Result<LibraryContent> {
        let description = new_content.description.unwrap_or_default();
        validate_fields(&new_content.name, &description)?;
        let parent_id = new_content.parent_id.filter(|p| !p.trim().is_empty());
        self.validate_parent(kind, parent_id.as_deref())?;

        let now = Utc::now().naive_utc();
        let content = LibraryContent {
            id: Uuid::now_v7().to_string(),
            kind,
            parent_id,
            owner_id: self.master_user_id.clone(),
            name: new_content.name.trim().to_string(),
            description,
            is_published: false,
            is_public: false,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(content).await?;
        info!("Created {} {} with name '{}'", kind, created.id, created.name);
        Ok(created)
    }

    async fn update(
        &self,
        kind: LibraryContentKind,
        content_id: &str,
        update: LibraryContentUpdate,
    ) -> Result<LibraryContent> {
        let mut content = self.get(kind, content_id)?;
        if let Some(name) = update.name {
            content.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            content.description = description;
        }
        if let Some(is_published) = update.is_published {
            content.is_published = is_published;
        }
        if let Some(is_public) = update.is_public {
            content.is_public = is_public;
        }
        validate_fields(&content.name, &content.description)?;
        content.updated_at = Utc::now().naive_utc();

        let updated = self.repository.update(content).await?;
        info!("Updated {} {}", kind, content_id);
        Ok(updated)
    }

    async fn delete(&self, kind: LibraryContentKind, content_id: &str) -> Result<()> {
        let content = match self.get(kind, content_id) {
            Ok(content) => content,
            Err(e) => {
                warn!("Attempted to delete non-existent {} {}", kind, content_id);
                return Err(e);
            }
        };
        let ids = self.collect_subtree(&content.id)?;
        let removed = self.repository.delete_many(ids).await?;
        info!("Deleted {} {} ({} records)", kind, content_id, removed);
        Ok(())
    }

    async fn transfer_ownership(
        &self,
        kind: LibraryContentKind,
        content_id: &str,
        request: TransferOwnershipRequest,
    ) -> Result<LibraryContent> {
        let mut content = self.get(kind, content_id)?;
        let new_owner = match request.action.to_ascii_lowercase().as_str() {
            "take" => self.master_user_id.clone(),
            "grant" => request
                .target_user_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| {
                    Error::field("targetUserId", "Target user is required for 'grant' action")
                })?,
            other => {
                return Err(Error::field(
                    "action",
                    format!("Invalid action: {}", other),
                ))
            }
        };

        content.owner_id = new_owner;
        content.updated_at = Utc::now().naive_utc();
        let updated = self.repository.update(content).await?;
        info!(
            "Transferred {} {} ownership to user {} via action '{}'",
            kind, content_id, updated.owner_id, request.action
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::library_model::OwnerType;
    use std::sync::Mutex;

    const MASTER: &str = "00000000-0000-0000-0000-000000000001";

    #[derive(Default)]
    struct InMemoryRepository {
        contents: Mutex<Vec<LibraryContent>>,
    }

    #[async_trait::async_trait]
    impl LibraryRepositoryTrait for InMemoryRepository {
        fn get_by_id(&self, content_id: &str) -> Result<Option<LibraryContent>> {
            let contents = self.contents.lock().unwrap();
            Ok(contents.iter().find(|c| c.id == content_id).cloned())
        }

        fn list_children(&self, parent_id: &str) -> Result<Vec<LibraryContent>> {
            let contents = self.contents.lock().unwrap();
            Ok(contents
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(parent_id))
                .cloned()
                .collect())
        }

        fn search(
            &self,
            kind: LibraryContentKind,
            request: &LibrarySearchRequest,
            master_user_id: &str,
        ) -> Result<LibraryContentPage> {
            let contents = self.contents.lock().unwrap();
            let mut matching: Vec<LibraryContent> = contents
                .iter()
                .filter(|c| c.kind == kind)
                .filter(|c| {
                    request.search.as_ref().map_or(true, |s| {
                        let s = s.to_lowercase();
                        c.name.to_lowercase().contains(&s)
                            || c.description.to_lowercase().contains(&s)
                    })
                })
                .filter(|c| match request.owner_type {
                    OwnerType::All => true,
                    OwnerType::Master => c.owner_id == master_user_id,
                    OwnerType::User => c.owner_id != master_user_id,
                })
                .filter(|c| request.is_published.map_or(true, |p| c.is_published == p))
                .cloned()
                .collect();
            matching.sort_by(|a, b| a.name.cmp(&b.name));
            if request.sort_descending {
                matching.reverse();
            }
            let (skip, take) = request.pagination();
            let total_count = matching.len() as u64;
            let items: Vec<_> = matching
                .into_iter()
                .skip(skip as usize)
                .take(take as usize)
                .collect();
            let has_more = (skip as u64 + items.len() as u64) < total_count;
            Ok(LibraryContentPage {
                items,
                total_count,
                has_more,
            })
        }

        async fn insert(&self, content: LibraryContent) -> Result<LibraryContent> {
            self.contents.lock().unwrap().push(content.clone());
            Ok(content)
        }

        async fn update(&self, content: LibraryContent) -> Result<LibraryContent> {
            let mut contents = self.contents.lock().unwrap();
            if let Some(slot) = contents.iter_mut().find(|c| c.id == content.id) {
                *slot = content.clone();
            }
            Ok(content)
        }

        async fn delete_many(&self, content_ids: Vec<String>) -> Result<usize> {
            let mut contents = self.contents.lock().unwrap();
            let before = contents.len();
            contents.retain(|c| !content_ids.contains(&c.id));
            Ok(before - contents.len())
        }
    }

    fn service() -> LibraryService {
        LibraryService::new(Arc::new(InMemoryRepository::default()), MASTER.to_string())
    }

    fn named(name: &str) -> NewLibraryContent {
        NewLibraryContent {
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_master_owner_and_private_state() {
        let service = service();
        let world = service
            .create(LibraryContentKind::World, named("Eberron"))
            .await
            .unwrap();
        assert_eq!(world.owner_id, MASTER);
        assert!(!world.is_published);
        assert!(!world.is_public);
        assert_eq!(service.get(LibraryContentKind::World, &world.id).unwrap(), world);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let service = service();
        let err = service
            .create(LibraryContentKind::Asset, named("   "))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "name");
    }

    #[tokio::test]
    async fn test_get_with_wrong_kind_is_not_found() {
        let service = service();
        let world = service
            .create(LibraryContentKind::World, named("Faerun"))
            .await
            .unwrap();
        let err = service
            .get(LibraryContentKind::Campaign, &world.id)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_parent_must_be_of_parent_kind() {
        let service = service();
        let world = service
            .create(LibraryContentKind::World, named("Greyhawk"))
            .await
            .unwrap();

        let err = service
            .create(
                LibraryContentKind::Adventure,
                NewLibraryContent {
                    parent_id: Some(world.id.clone()),
                    ..named("Tomb")
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "parentId");

        let err = service
            .create(
                LibraryContentKind::Asset,
                NewLibraryContent {
                    parent_id: Some(world.id.clone()),
                    ..named("Torch")
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "parentId");
    }

    #[tokio::test]
    async fn test_children_and_recursive_delete() {
        let service = service();
        let world = service
            .create(LibraryContentKind::World, named("Krynn"))
            .await
            .unwrap();
        let campaign = service
            .create(
                LibraryContentKind::Campaign,
                NewLibraryContent {
                    parent_id: Some(world.id.clone()),
                    ..named("Dragonlance")
                },
            )
            .await
            .unwrap();
        let adventure = service
            .create(
                LibraryContentKind::Adventure,
                NewLibraryContent {
                    parent_id: Some(campaign.id.clone()),
                    ..named("Dragons of Autumn")
                },
            )
            .await
            .unwrap();

        let children = service.children(LibraryContentKind::World, &world.id).unwrap();
        assert_eq!(children, vec![campaign.clone()]);

        service.delete(LibraryContentKind::World, &world.id).await.unwrap();
        assert!(service
            .get(LibraryContentKind::Adventure, &adventure.id)
            .unwrap_err()
            .is_not_found());
        assert!(service
            .delete(LibraryContentKind::World, &world.id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let service = service();
        let asset = service
            .create(LibraryContentKind::Asset, named("Goblin token"))
            .await
            .unwrap();
        let updated = service
            .update(
                LibraryContentKind::Asset,
                &asset.id,
                LibraryContentUpdate {
                    is_published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_published);
        assert!(!updated.is_public);
        assert_eq!(updated.name, "Goblin token");
        assert_eq!(updated.description, asset.description);
    }

    #[tokio::test]
    async fn test_transfer_ownership_actions() {
        let service = service();
        let encounter = service
            .create(LibraryContentKind::Encounter, named("Ambush"))
            .await
            .unwrap();

        let granted = service
            .transfer_ownership(
                LibraryContentKind::Encounter,
                &encounter.id,
                TransferOwnershipRequest {
                    action: "grant".to_string(),
                    target_user_id: Some("user-42".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(granted.owner_id, "user-42");

        let taken = service
            .transfer_ownership(
                LibraryContentKind::Encounter,
                &encounter.id,
                TransferOwnershipRequest {
                    action: "TAKE".to_string(),
                    target_user_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(taken.owner_id, MASTER);

        let err = service
            .transfer_ownership(
                LibraryContentKind::Encounter,
                &encounter.id,
                TransferOwnershipRequest {
                    action: "grant".to_string(),
                    target_user_id: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "targetUserId");

        let err = service
            .transfer_ownership(
                LibraryContentKind::Encounter,
                &encounter.id,
                TransferOwnershipRequest {
                    action: "steal".to_string(),
                    target_user_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid action"));
    }

    #[tokio::test]
    async fn test_search_paginates_by_name() {
        let service = service();
        for name in ["Delta", "Alpha", "Charlie", "Bravo"] {
            service
                .create(LibraryContentKind::World, named(name))
                .await
                .unwrap();
        }
        let page = service
            .search(
                LibraryContentKind::World,
                LibrarySearchRequest {
                    take: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
        assert_eq!(page.total_count, 4);
        assert!(page.has_more);
    }

    #[test]
    fn test_config_lists_kinds() {
        let config = service().config();
        assert_eq!(config.master_user_id, MASTER);
        assert_eq!(config.kinds.len(), 5);
        assert_eq!(config.kinds[0].path, "worlds");
        assert_eq!(config.kinds[0].child_kind, Some(LibraryContentKind::Campaign));
    }
}
