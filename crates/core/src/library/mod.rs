//! Library module - admin management of worlds, campaigns, adventures, encounters and assets.

mod library_model;
mod library_service;
mod library_traits;

pub use library_model::{
    LibraryConfig, LibraryContent, LibraryContentKind, LibraryContentPage, LibraryContentUpdate,
    LibraryKindInfo, LibrarySearchRequest, NewLibraryContent, OwnerType,
    TransferOwnershipRequest,
};
pub use library_service::LibraryService;
pub use library_traits::{LibraryRepositoryTrait, LibraryServiceTrait};
