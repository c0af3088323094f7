//! Users module - administration of accounts, lockouts and roles.

mod users_model;
mod users_service;
mod users_traits;

pub use users_model::{
    NewUser, RoleChangeRequest, User, UserInfo, UserListResponse, UserPage, UserSearchRequest,
    UserSortField, UserStats, UserStatus,
};
pub use users_service::UserAdminService;
pub use users_traits::{UserAdminServiceTrait, UserRepositoryTrait};
