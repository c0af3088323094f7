use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::errors::Result;
use crate::users::users_model::{
    NewUser, RoleChangeRequest, User, UserInfo, UserListResponse, UserPage, UserSearchRequest,
    UserStats,
};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Result<Option<User>>;
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    /// `now` decides which lockouts are still in effect.
    fn search(&self, request: &UserSearchRequest, now: NaiveDateTime) -> Result<UserPage>;
    fn count_in_role(&self, role: &str) -> Result<u64>;
    fn stats(&self, now: NaiveDateTime) -> Result<UserStats>;
    async fn insert(&self, user: User) -> Result<User>;
    /// Replaces the stored account and its role set.
    async fn update(&self, user: User) -> Result<User>;
}

/// Trait for user administration
#[async_trait]
pub trait UserAdminServiceTrait: Send + Sync {
    fn search_users(&self, request: UserSearchRequest) -> Result<UserListResponse>;

    fn get_user(&self, user_id: &str) -> Result<UserInfo>;

    fn stats(&self) -> Result<UserStats>;

    async fn create_user(&self, new_user: NewUser) -> Result<UserInfo>;

    async fn lock_user(&self, user_id: &str) -> Result<UserInfo>;

    async fn unlock_user(&self, user_id: &str) -> Result<UserInfo>;

    async fn verify_email(&self, user_id: &str) -> Result<UserInfo>;

    async fn assign_role(&self, user_id: &str, request: RoleChangeRequest) -> Result<UserInfo>;

    async fn remove_role(
        &self,
        user_id: &str,
        role_name: &str,
        admin_user_id: &str,
    ) -> Result<UserInfo>;
}
