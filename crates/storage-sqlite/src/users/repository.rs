use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::collections::HashMap;
use std::sync::Arc;

use vtt_core::constants::{ADMINISTRATOR_ROLE, KNOWN_ROLES};
use vtt_core::users::{
    User, UserPage, UserRepositoryTrait, UserSearchRequest, UserSortField, UserStats, UserStatus,
};
use vtt_core::Result;

use super::model::{role_rows, UserDB, UserRoleDB};
use crate::db::{get_connection, DbConnection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{user_roles, users};
use crate::utils::{chunk_for_sqlite, like_pattern};

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

/// Stored role names use the canonical casing of the known roles.
fn canonical_role(role: &str) -> String {
    KNOWN_ROLES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(role))
        .map_or_else(|| role.to_string(), |known| known.to_string())
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UserRepository { pool, writer }
    }

    fn filtered(
        request: &UserSearchRequest,
        now: NaiveDateTime,
    ) -> users::BoxedQuery<'static, Sqlite> {
        let mut boxed = users::table.into_boxed();

        if let Some(term) = request.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(term.trim());
            boxed = boxed.filter(
                users::email
                    .like(pattern.clone())
                    .escape('\\')
                    .or(users::display_name.like(pattern).escape('\\')),
            );
        }
        boxed = match request.status {
            None => boxed,
            Some(UserStatus::Locked) => boxed
                .filter(users::lockout_enabled.eq(true))
                .filter(users::lockout_end.gt(now)),
            Some(UserStatus::Active) => boxed.filter(
                users::lockout_end
                    .is_null()
                    .nullable()
                    .or(users::lockout_end.le(now))
                    .or(users::lockout_enabled.eq(false).nullable()),
            ),
            Some(UserStatus::Unconfirmed) => boxed.filter(users::email_confirmed.eq(false)),
        };
        if let Some(role) = request.role.as_deref().filter(|r| !r.trim().is_empty()) {
            let in_role = user_roles::table
                .filter(user_roles::role_name.eq(canonical_role(role.trim())))
                .select(user_roles::user_id);
            boxed = boxed.filter(users::id.eq_any(in_role));
        }
        boxed
    }

    fn attach_roles(conn: &mut DbConnection, rows: Vec<UserDB>) -> Result<Vec<User>> {
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut roles: HashMap<String, Vec<String>> = HashMap::new();
        for chunk in chunk_for_sqlite(&ids) {
            let assigned = user_roles::table
                .filter(user_roles::user_id.eq_any(chunk))
                .select(UserRoleDB::as_select())
                .load::<UserRoleDB>(conn)
                .into_core()?;
            for row in assigned {
                roles.entry(row.user_id).or_default().push(row.role_name);
            }
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let assigned = roles.remove(&row.id).unwrap_or_default();
                row.into_domain(assigned)
            })
            .collect())
    }

    fn load_one(
        conn: &mut DbConnection,
        query: users::BoxedQuery<'static, Sqlite>,
    ) -> Result<Option<User>> {
        let row = query
            .select(UserDB::as_select())
            .first::<UserDB>(conn)
            .optional()
            .into_core()?;
        match row {
            Some(row) => Ok(Self::attach_roles(conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

fn count(query: users::BoxedQuery<'static, Sqlite>, conn: &mut DbConnection) -> Result<u64> {
    let total: i64 = query.count().get_result(conn).into_core()?;
    Ok(total.max(0) as u64)
}

fn write_user(conn: &mut SqliteConnection, user: User, insert: bool) -> Result<User> {
    let row = UserDB::from(&user);
    let roles = role_rows(&user);
    let stored = if insert {
        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserDB::as_returning())
            .get_result(conn)
            .map_err(StorageError::from)?
    } else {
        diesel::update(users::table.find(row.id.clone()))
            .set(&row)
            .returning(UserDB::as_returning())
            .get_result(conn)
            .map_err(StorageError::from)?
    };
    diesel::delete(user_roles::table.filter(user_roles::user_id.eq(&stored.id)))
        .execute(conn)
        .map_err(StorageError::from)?;
    if !roles.is_empty() {
        diesel::insert_into(user_roles::table)
            .values(&roles)
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    let names = roles.into_iter().map(|r| r.role_name).collect();
    Ok(stored.into_domain(names))
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let query = users::table
            .filter(users::id.eq(user_id.to_string()))
            .into_boxed();
        Self::load_one(&mut conn, query)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let query = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .into_boxed();
        Self::load_one(&mut conn, query)
    }

    fn search(&self, request: &UserSearchRequest, now: NaiveDateTime) -> Result<UserPage> {
        let (skip, take) = request.pagination();
        let mut conn = get_connection(&self.pool)?;

        let total_count = count(Self::filtered(request, now), &mut conn)?;

        let query = Self::filtered(request, now);
        let query = match (request.sort_by, request.sort_descending) {
            (UserSortField::Email, false) => query.order(users::email.asc()),
            (UserSortField::Email, true) => query.order(users::email.desc()),
            (UserSortField::DisplayName, false) => {
                query.order((users::display_name.asc(), users::email.asc()))
            }
            (UserSortField::DisplayName, true) => {
                query.order((users::display_name.desc(), users::email.asc()))
            }
            (UserSortField::CreatedAt, false) => {
                query.order((users::created_at.asc(), users::email.asc()))
            }
            (UserSortField::CreatedAt, true) => {
                query.order((users::created_at.desc(), users::email.asc()))
            }
        };
        let rows = query
            .offset(i64::from(skip))
            .limit(i64::from(take))
            .select(UserDB::as_select())
            .load::<UserDB>(&mut conn)
            .into_core()?;

        let users = Self::attach_roles(&mut conn, rows)?;
        let has_more = u64::from(skip) + (users.len() as u64) < total_count;
        Ok(UserPage {
            users,
            total_count,
            has_more,
        })
    }

    fn count_in_role(&self, role: &str) -> Result<u64> {
        let mut conn = get_connection(&self.pool)?;
        let total: i64 = user_roles::table
            .filter(user_roles::role_name.eq(canonical_role(role)))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(total.max(0) as u64)
    }

    fn stats(&self, now: NaiveDateTime) -> Result<UserStats> {
        let mut conn = get_connection(&self.pool)?;
        let by_status = |status| UserSearchRequest {
            status: Some(status),
            ..Default::default()
        };
        let total_users = count(users::table.into_boxed(), &mut conn)?;
        let locked_users = count(Self::filtered(&by_status(UserStatus::Locked), now), &mut conn)?;
        let unconfirmed_emails = count(
            Self::filtered(&by_status(UserStatus::Unconfirmed), now),
            &mut conn,
        )?;
        drop(conn);
        Ok(UserStats {
            total_users,
            total_administrators: self.count_in_role(ADMINISTRATOR_ROLE)?,
            locked_users,
            unconfirmed_emails,
        })
    }

    async fn insert(&self, user: User) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| write_user(conn, user, true))
            .await
    }

    async fn update(&self, user: User) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| write_user(conn, user, false))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use vtt_core::errors::{DatabaseError, Error};

    fn setup() -> (TempDir, UserRepository) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.clone());
        (dir, UserRepository::new(pool, writer))
    }

    fn user(email: &str, display_name: &str, roles: &[&str]) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: uuid::Uuid::now_v7().to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            email_confirmed: true,
            lockout_enabled: true,
            lockout_end: None,
            two_factor_enabled: false,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_update_replace_roles() {
        let (_dir, repo) = setup();
        let mut stored = repo
            .insert(user("gm@example.com", "Game Master", &["User", "Administrator"]))
            .await
            .unwrap();
        assert_eq!(stored.roles, vec!["Administrator", "User"]);

        stored.roles = vec!["User".to_string()];
        stored.email_confirmed = false;
        repo.update(stored.clone()).await.unwrap();

        let loaded = repo.get_by_email("GM@example.com").unwrap().unwrap();
        assert_eq!(loaded.roles, vec!["User"]);
        assert!(!loaded.email_confirmed);
        assert_eq!(repo.count_in_role("administrator").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_unique_violation() {
        let (_dir, repo) = setup();
        repo.insert(user("gm@example.com", "", &[])).await.unwrap();
        let err = repo
            .insert(user("gm@example.com", "Other", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_search_filters_and_stats() {
        let (_dir, repo) = setup();
        let now = Utc::now().naive_utc();
        repo.insert(user("admin@example.com", "Admin", &["Administrator"]))
            .await
            .unwrap();
        let mut locked = user("locked@example.com", "Locked Out", &["User"]);
        locked.lockout_end = Some(now + Duration::days(30));
        repo.insert(locked).await.unwrap();
        let mut expired = user("expired@example.com", "Expired", &["User"]);
        expired.lockout_end = Some(now - Duration::days(1));
        expired.email_confirmed = false;
        repo.insert(expired).await.unwrap();

        let locked_page = repo
            .search(
                &UserSearchRequest {
                    status: Some(UserStatus::Locked),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert_eq!(locked_page.total_count, 1);
        assert_eq!(locked_page.users[0].email, "locked@example.com");

        let active = repo
            .search(
                &UserSearchRequest {
                    status: Some(UserStatus::Active),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        let emails: Vec<_> = active.users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["admin@example.com", "expired@example.com"]);

        let users_role = repo
            .search(
                &UserSearchRequest {
                    role: Some("user".to_string()),
                    search: Some("LOCKED".to_string()),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert_eq!(users_role.total_count, 1);
        assert_eq!(users_role.users[0].roles, vec!["User"]);

        let by_name = repo
            .search(
                &UserSearchRequest {
                    sort_by: UserSortField::DisplayName,
                    sort_descending: true,
                    take: Some(2),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert_eq!(by_name.users[0].display_name, "Locked Out");
        assert!(by_name.has_more);

        let stats = repo.stats(now).unwrap();
        assert_eq!(
            stats,
            UserStats {
                total_users: 3,
                total_administrators: 1,
                locked_users: 1,
                unconfirmed_emails: 1,
            }
        );
    }
}
