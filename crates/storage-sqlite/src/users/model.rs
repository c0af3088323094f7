//! Database models for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use vtt_core::users::User;

/// Database model for user accounts; roles live in `user_roles`.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub email_confirmed: bool,
    pub lockout_enabled: bool,
    pub lockout_end: Option<NaiveDateTime>,
    pub two_factor_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::user_roles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRoleDB {
    pub user_id: String,
    pub role_name: String,
}

impl UserDB {
    pub fn into_domain(self, mut roles: Vec<String>) -> User {
        roles.sort();
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            email_confirmed: self.email_confirmed,
            lockout_enabled: self.lockout_enabled,
            lockout_end: self.lockout_end,
            two_factor_enabled: self.two_factor_enabled,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&User> for UserDB {
    fn from(domain: &User) -> Self {
        Self {
            id: domain.id.clone(),
            email: domain.email.clone(),
            display_name: domain.display_name.clone(),
            email_confirmed: domain.email_confirmed,
            lockout_enabled: domain.lockout_enabled,
            lockout_end: domain.lockout_end,
            two_factor_enabled: domain.two_factor_enabled,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

pub(crate) fn role_rows(user: &User) -> Vec<UserRoleDB> {
    user.roles
        .iter()
        .map(|role| UserRoleDB {
            user_id: user.id.clone(),
            role_name: role.clone(),
        })
        .collect()
}
