use chrono::{Months, NaiveDateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::users_model::{
    NewUser, RoleChangeRequest, User, UserInfo, UserListResponse, UserSearchRequest, UserStats,
};
use super::users_traits::{UserAdminServiceTrait, UserRepositoryTrait};
use crate::constants::{
    ADMINISTRATOR_ROLE, ADMIN_LOCKOUT_MONTHS, KNOWN_ROLES, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH,
};
use crate::errors::{DatabaseError, Error, FieldError, Result, ValidationError};

const ENTITY: &str = "User";

/// Admin service for user accounts, lockouts and roles
pub struct UserAdminService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserAdminService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn load(&self, user_id: &str) -> Result<User> {
        self.repository
            .get_by_id(user_id)?
            .ok_or_else(|| Error::not_found(ENTITY, user_id))
    }

    /// Fails when `user` is the only remaining administrator.
    fn ensure_not_last_admin(&self, user: &User, message: &str) -> Result<()> {
        if user.is_administrator() && self.repository.count_in_role(ADMINISTRATOR_ROLE)? <= 1 {
            warn!("Refused to change the last administrator {}", user.id);
            return Err(Error::field("userId", message));
        }
        Ok(())
    }

    async fn save(&self, mut user: User, now: NaiveDateTime) -> Result<UserInfo> {
        user.updated_at = now;
        let updated = self.repository.update(user).await?;
        Ok(UserInfo::at(updated, now))
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Canonical spelling of a known role.
fn known_role(role_name: &str) -> Result<&'static str> {
    KNOWN_ROLES
        .into_iter()
        .find(|r| r.eq_ignore_ascii_case(role_name.trim()))
        .ok_or_else(|| {
            Error::field(
                "roleName",
                format!("Role '{}' does not exist.", role_name.trim()),
            )
        })
}

fn ensure_not_self(user_id: &str, admin_user_id: &str) -> Result<()> {
    if user_id == admin_user_id {
        return Err(Error::field(
            "userId",
            "Administrators cannot modify their own roles",
        ));
    }
    Ok(())
}

fn duplicate_email(email: &str) -> Error {
    Error::field("email", format!("User with email '{}' already exists", email))
}

fn validate_new_user(email: &str, display_name: &str) -> Result<()> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if email.chars().count() > MAX_EMAIL_LENGTH {
        errors.push(FieldError::new(
            "email",
            format!("Email must be at most {} characters", MAX_EMAIL_LENGTH),
        ));
    } else if !email.contains('@') {
        errors.push(FieldError::new("email", "Email is not a valid address"));
    }
    if display_name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "displayName",
            format!("Display name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::Fields(errors)))
    }
}

#[async_trait::async_trait]
impl UserAdminServiceTrait for UserAdminService {
    fn search_users(&self, request: UserSearchRequest) -> Result<UserListResponse> {
        let (skip, take) = request.pagination();
        let request = UserSearchRequest {
            skip: Some(skip),
            take: Some(take),
            ..request
        };
        let now = now();
        let page = self.repository.search(&request, now)?;
        info!(
            "User search completed: {} found (skip: {}, take: {}, total: {})",
            page.users.len(),
            skip,
            take,
            page.total_count
        );
        Ok(UserListResponse {
            users: page
                .users
                .into_iter()
                .map(|u| UserInfo::at(u, now))
                .collect(),
            total_count: page.total_count,
            has_more: page.has_more,
        })
    }

    fn get_user(&self, user_id: &str) -> Result<UserInfo> {
        Ok(UserInfo::at(self.load(user_id)?, now()))
    }

    fn stats(&self) -> Result<UserStats> {
        self.repository.stats(now())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserInfo> {
        let email = new_user.email.trim().to_lowercase();
        let display_name = new_user
            .display_name
            .map(|n| n.trim().to_string())
            .unwrap_or_default();
        validate_new_user(&email, &display_name)?;

        let mut roles: Vec<String> = Vec::new();
        for role in &new_user.roles {
            let role = known_role(role)?.to_string();
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        if self.repository.get_by_email(&email)?.is_some() {
            return Err(duplicate_email(&email));
        }

        let now = now();
        let user = User {
            id: Uuid::now_v7().to_string(),
            email: email.clone(),
            display_name,
            email_confirmed: new_user.email_confirmed,
            lockout_enabled: true,
            lockout_end: None,
            two_factor_enabled: false,
            roles,
            created_at: now,
            updated_at: now,
        };
        let created = match self.repository.insert(user).await {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                return Err(duplicate_email(&email))
            }
            other => other?,
        };
        info!("Created user {} ({})", created.id, created.email);
        Ok(UserInfo::at(created, now))
    }

    async fn lock_user(&self, user_id: &str) -> Result<UserInfo> {
        let mut user = self.load(user_id)?;
        self.ensure_not_last_admin(&user, "Cannot lock the last administrator")?;

        let now = now();
        let until = now
            .checked_add_months(Months::new(ADMIN_LOCKOUT_MONTHS))
            .ok_or_else(|| Error::Unexpected("Lockout end is out of range".to_string()))?;
        user.lockout_enabled = true;
        user.lockout_end = Some(until);
        let locked = self.save(user, now).await?;
        info!("Locked user {} until {}", user_id, until);
        Ok(locked)
    }

    async fn unlock_user(&self, user_id: &str) -> Result<UserInfo> {
        let mut user = self.load(user_id)?;
        user.lockout_end = None;
        let unlocked = self.save(user, now()).await?;
        info!("Unlocked user {}", user_id);
        Ok(unlocked)
    }

    async fn verify_email(&self, user_id: &str) -> Result<UserInfo> {
        let mut user = self.load(user_id)?;
        user.email_confirmed = true;
        let verified = self.save(user, now()).await?;
        info!("Confirmed email of user {}", user_id);
        Ok(verified)
    }

    async fn assign_role(&self, user_id: &str, request: RoleChangeRequest) -> Result<UserInfo> {
        ensure_not_self(user_id, &request.admin_user_id)?;
        let role = known_role(&request.role_name)?;
        let mut user = self.load(user_id)?;
        if user.has_role(role) {
            return Ok(UserInfo::at(user, now()));
        }

        user.roles.push(role.to_string());
        let updated = self.save(user, now()).await?;
        info!(
            "User {} assigned role '{}' by {}",
            user_id, role, request.admin_user_id
        );
        Ok(updated)
    }

    async fn remove_role(
        &self,
        user_id: &str,
        role_name: &str,
        admin_user_id: &str,
    ) -> Result<UserInfo> {
        ensure_not_self(user_id, admin_user_id)?;
        let role = known_role(role_name)?;
        let mut user = self.load(user_id)?;
        if !user.has_role(role) {
            return Err(Error::field(
                "roleName",
                format!("User is not in role '{}'", role),
            ));
        }
        if role == ADMINISTRATOR_ROLE {
            self.ensure_not_last_admin(&user, "Cannot remove the last administrator")?;
        }

        user.roles.retain(|r| !r.eq_ignore_ascii_case(role));
        let updated = self.save(user, now()).await?;
        info!(
            "User {} removed from role '{}' by {}",
            user_id, role, admin_user_id
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::users_model::{UserPage, UserStatus};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryRepository {
        users: Mutex<Vec<User>>,
    }

    #[async_trait::async_trait]
    impl UserRepositoryTrait for InMemoryRepository {
        fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == user_id).cloned())
        }

        fn get_by_email(&self, email: &str) -> Result<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        fn search(&self, request: &UserSearchRequest, now: NaiveDateTime) -> Result<UserPage> {
            let users = self.users.lock().unwrap();
            let mut matching: Vec<User> = users
                .iter()
                .filter(|u| match request.status {
                    None => true,
                    Some(UserStatus::Active) => !u.is_locked_out(now),
                    Some(UserStatus::Locked) => u.is_locked_out(now),
                    Some(UserStatus::Unconfirmed) => !u.email_confirmed,
                })
                .filter(|u| request.role.as_ref().map_or(true, |r| u.has_role(r)))
                .cloned()
                .collect();
            matching.sort_by(|a, b| a.email.cmp(&b.email));
            let (skip, take) = request.pagination();
            let total_count = matching.len() as u64;
            let users: Vec<_> = matching
                .into_iter()
                .skip(skip as usize)
                .take(take as usize)
                .collect();
            let has_more = (skip as u64 + users.len() as u64) < total_count;
            Ok(UserPage {
                users,
                total_count,
                has_more,
            })
        }

        fn count_in_role(&self, role: &str) -> Result<u64> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().filter(|u| u.has_role(role)).count() as u64)
        }

        fn stats(&self, now: NaiveDateTime) -> Result<UserStats> {
            let users = self.users.lock().unwrap();
            Ok(UserStats {
                total_users: users.len() as u64,
                total_administrators: users.iter().filter(|u| u.is_administrator()).count()
                    as u64,
                locked_users: users.iter().filter(|u| u.is_locked_out(now)).count() as u64,
                unconfirmed_emails: users.iter().filter(|u| !u.email_confirmed).count() as u64,
            })
        }

        async fn insert(&self, user: User) -> Result<User> {
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User> {
            let mut users = self.users.lock().unwrap();
            if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
                *slot = user.clone();
            }
            Ok(user)
        }
    }

    fn service() -> UserAdminService {
        UserAdminService::new(Arc::new(InMemoryRepository::default()))
    }

    async fn create(service: &UserAdminService, email: &str, roles: &[&str]) -> UserInfo {
        service
            .create_user(NewUser {
                email: email.to_string(),
                display_name: Some(email.split('@').next().unwrap().to_string()),
                email_confirmed: false,
                roles: roles.iter().map(|r| r.to_string()).collect(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_normalizes_email_and_roles() {
        let service = service();
        let created = create(&service, "  DM@Example.com ", &["user", "User"]).await;
        assert_eq!(created.user.email, "dm@example.com");
        assert_eq!(created.user.roles, vec!["User"]);
        assert!(!created.is_locked_out);

        let err = service
            .create_user(NewUser {
                email: "dm@example.COM".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "email");
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_role_and_bad_email() {
        let service = service();
        let err = service
            .create_user(NewUser {
                email: "player@example.com".to_string(),
                roles: vec!["Dragon".to_string()],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Role 'Dragon' does not exist.");

        let err = service
            .create_user(NewUser {
                email: "not-an-address".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "email");
    }

    #[tokio::test]
    async fn test_lock_and_unlock() {
        let service = service();
        let player = create(&service, "player@example.com", &["User"]).await;

        let locked = service.lock_user(&player.user.id).await.unwrap();
        assert!(locked.is_locked_out);
        let until = locked.user.lockout_end.unwrap();
        assert!(until > now() + chrono::Duration::days(365 * 99));

        let unlocked = service.unlock_user(&player.user.id).await.unwrap();
        assert!(!unlocked.is_locked_out);
        assert!(unlocked.user.lockout_end.is_none());
        assert!(service.lock_user("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_last_administrator_is_protected() {
        let service = service();
        let admin = create(&service, "admin@example.com", &["Administrator"]).await;
        let other = create(&service, "other@example.com", &["User"]).await;

        let err = service.lock_user(&admin.user.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot lock the last administrator");

        let err = service
            .remove_role(&admin.user.id, "Administrator", &other.user.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot remove the last administrator");

        service
            .assign_role(
                &other.user.id,
                RoleChangeRequest {
                    role_name: "administrator".to_string(),
                    admin_user_id: admin.user.id.clone(),
                },
            )
            .await
            .unwrap();
        let locked = service.lock_user(&admin.user.id).await.unwrap();
        assert!(locked.is_locked_out);
    }

    #[tokio::test]
    async fn test_admins_cannot_change_their_own_roles() {
        let service = service();
        let admin = create(&service, "admin@example.com", &["Administrator"]).await;
        let err = service
            .assign_role(
                &admin.user.id,
                RoleChangeRequest {
                    role_name: "User".to_string(),
                    admin_user_id: admin.user.id.clone(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "userId");

        let err = service
            .remove_role(&admin.user.id, "Administrator", &admin.user.id)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("their own roles"));
    }

    #[tokio::test]
    async fn test_assign_and_remove_role() {
        let service = service();
        let admin = create(&service, "admin@example.com", &["Administrator"]).await;
        let player = create(&service, "player@example.com", &[]).await;

        let err = service
            .assign_role(
                &player.user.id,
                RoleChangeRequest {
                    role_name: "Owlbear".to_string(),
                    admin_user_id: admin.user.id.clone(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Role 'Owlbear' does not exist.");

        let updated = service
            .assign_role(
                &player.user.id,
                RoleChangeRequest {
                    role_name: "user".to_string(),
                    admin_user_id: admin.user.id.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.user.roles, vec!["User"]);

        let removed = service
            .remove_role(&player.user.id, "User", &admin.user.id)
            .await
            .unwrap();
        assert!(removed.user.roles.is_empty());

        let err = service
            .remove_role(&player.user.id, "User", &admin.user.id)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not in role"));
    }

    #[tokio::test]
    async fn test_search_and_stats() {
        let service = service();
        let admin = create(&service, "admin@example.com", &["Administrator"]).await;
        let locked = create(&service, "locked@example.com", &["User"]).await;
        create(&service, "player@example.com", &["User"]).await;
        service.verify_email(&admin.user.id).await.unwrap();
        service.lock_user(&locked.user.id).await.unwrap();

        let page = service
            .search_users(UserSearchRequest {
                status: Some(UserStatus::Locked),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.users[0].user.id, locked.user.id);
        assert!(page.users[0].is_locked_out);

        let page = service
            .search_users(UserSearchRequest {
                role: Some("User".to_string()),
                take: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.has_more);

        assert_eq!(
            service.stats().unwrap(),
            UserStats {
                total_users: 3,
                total_administrators: 1,
                locked_users: 1,
                unconfirmed_emails: 2,
            }
        );
    }
}
