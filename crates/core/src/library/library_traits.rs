use crate::errors::Result;
use crate::library::library_model::{
    LibraryConfig, LibraryContent, LibraryContentKind, LibraryContentPage, LibraryContentUpdate,
    LibrarySearchRequest, NewLibraryContent, TransferOwnershipRequest,
};
use async_trait::async_trait;

/// Trait for library content repository operations
#[async_trait]
pub trait LibraryRepositoryTrait: Send + Sync {
    fn get_by_id(&self, content_id: &str) -> Result<Option<LibraryContent>>;
    fn list_children(&self, parent_id: &str) -> Result<Vec<LibraryContent>>;
    /// `master_user_id` resolves the `owner_type` filter.
    fn search(
        &self,
        kind: LibraryContentKind,
        request: &LibrarySearchRequest,
        master_user_id: &str,
    ) -> Result<LibraryContentPage>;
    async fn insert(&self, content: LibraryContent) -> Result<LibraryContent>;
    async fn update(&self, content: LibraryContent) -> Result<LibraryContent>;
    /// Deletes all given ids in one write; returns the number of rows removed.
    async fn delete_many(&self, content_ids: Vec<String>) -> Result<usize>;
}

/// Trait for library content administration
#[async_trait]
pub trait LibraryServiceTrait: Send + Sync {
    fn config(&self) -> LibraryConfig;

    fn search(
        &self,
        kind: LibraryContentKind,
        request: LibrarySearchRequest,
    ) -> Result<LibraryContentPage>;

    fn get(&self, kind: LibraryContentKind, content_id: &str) -> Result<LibraryContent>;

    fn children(&self, kind: LibraryContentKind, content_id: &str) -> Result<Vec<LibraryContent>>;

    async fn create(
        &self,
        kind: LibraryContentKind,
        new_content: NewLibraryContent,
    ) -> Result<LibraryContent>;

    async fn update(
        &self,
        kind: LibraryContentKind,
        content_id: &str,
        update: LibraryContentUpdate,
    ) -> Result<LibraryContent>;

    async fn delete(&self, kind: LibraryContentKind, content_id: &str) -> Result<()>;

    async fn transfer_ownership(
        &self,
        kind: LibraryContentKind,
        content_id: &str,
        request: TransferOwnershipRequest,
    ) -> Result<LibraryContent>;
}
