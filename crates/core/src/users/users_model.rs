//! User administration domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{ADMINISTRATOR_ROLE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Domain model for a user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Stored lowercased; unique.
    pub email: String,
    pub display_name: String,
    pub email_confirmed: bool,
    pub lockout_enabled: bool,
    pub lockout_end: Option<NaiveDateTime>,
    pub two_factor_enabled: bool,
    pub roles: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_locked_out(&self, now: NaiveDateTime) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_administrator(&self) -> bool {
        self.has_role(ADMINISTRATOR_ROLE)
    }
}

/// User as shown to administrators, with the lockout evaluated at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(flatten)]
    pub user: User,
    pub is_locked_out: bool,
}

impl UserInfo {
    pub fn at(user: User, now: NaiveDateTime) -> Self {
        let is_locked_out = user.is_locked_out(now);
        Self {
            user,
            is_locked_out,
        }
    }
}

/// Input model for creating a user
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Account state filter for user searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Not currently locked out.
    Active,
    Locked,
    Unconfirmed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSortField {
    #[default]
    Email,
    DisplayName,
    CreatedAt,
}

/// Search criteria for users
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchRequest {
    /// Case-insensitive substring match on email or display name.
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<String>,
    #[serde(default)]
    pub sort_by: UserSortField,
    #[serde(default)]
    pub sort_descending: bool,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl UserSearchRequest {
    pub fn pagination(&self) -> (u32, u32) {
        let take = match self.take {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(t) => t.min(MAX_PAGE_SIZE),
        };
        (self.skip.unwrap_or(0), take)
    }
}

/// One page of stored users
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total_count: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserInfo>,
    pub total_count: u64,
    pub has_more: bool,
}

/// Assign a role on behalf of `admin_user_id`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub role_name: String,
    pub admin_user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: u64,
    pub total_administrators: u64,
    pub locked_users: u64,
    pub unconfirmed_emails: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(roles: &[&str]) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: "u1".to_string(),
            email: "gm@example.com".to_string(),
            display_name: "Game Master".to_string(),
            email_confirmed: true,
            lockout_enabled: true,
            lockout_end: None,
            two_factor_enabled: false,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lockout_requires_future_end_and_enabled_flag() {
        let now = Utc::now().naive_utc();
        let mut locked = user(&[]);
        locked.lockout_end = Some(now + Duration::days(1));
        assert!(locked.is_locked_out(now));

        locked.lockout_enabled = false;
        assert!(!locked.is_locked_out(now));

        let mut expired = user(&[]);
        expired.lockout_end = Some(now - Duration::seconds(1));
        assert!(!expired.is_locked_out(now));
    }

    #[test]
    fn test_roles_match_case_insensitively() {
        let admin = user(&["administrator"]);
        assert!(admin.is_administrator());
        assert!(!user(&["User"]).is_administrator());
    }

    #[test]
    fn test_info_serializes_flat() {
        let info = UserInfo::at(user(&["User"]), Utc::now().naive_utc());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["email"], "gm@example.com");
        assert_eq!(json["isLockedOut"], false);
        assert_eq!(json["roles"][0], "User");
    }
}
