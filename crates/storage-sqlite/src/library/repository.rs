use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::sync::Arc;

use vtt_core::library::{
    LibraryContent, LibraryContentKind, LibraryContentPage, LibraryRepositoryTrait,
    LibrarySearchRequest, OwnerType,
};
use vtt_core::Result;

use super::model::LibraryContentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::library_contents;
use crate::utils::{chunk_for_sqlite, like_pattern};

pub struct LibraryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LibraryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        LibraryRepository { pool, writer }
    }

    fn filtered(
        kind: LibraryContentKind,
        request: &LibrarySearchRequest,
        master_user_id: &str,
    ) -> library_contents::BoxedQuery<'static, Sqlite> {
        let mut boxed = library_contents::table
            .filter(library_contents::kind.eq(kind.as_str()))
            .into_boxed();

        if let Some(term) = request.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(term.trim());
            boxed = boxed.filter(
                library_contents::name
                    .like(pattern.clone())
                    .escape('\\')
                    .or(library_contents::description.like(pattern).escape('\\')),
            );
        }
        if let Some(owner_id) = request.owner_id.clone() {
            boxed = boxed.filter(library_contents::owner_id.eq(owner_id));
        }
        boxed = match request.owner_type {
            OwnerType::All => boxed,
            OwnerType::Master => {
                boxed.filter(library_contents::owner_id.eq(master_user_id.to_string()))
            }
            OwnerType::User => {
                boxed.filter(library_contents::owner_id.ne(master_user_id.to_string()))
            }
        };
        if let Some(is_published) = request.is_published {
            boxed = boxed.filter(library_contents::is_published.eq(is_published));
        }
        if let Some(is_public) = request.is_public {
            boxed = boxed.filter(library_contents::is_public.eq(is_public));
        }
        boxed
    }
}

fn to_domain(rows: Vec<LibraryContentDB>) -> Result<Vec<LibraryContent>> {
    rows.into_iter()
        .map(|row| LibraryContent::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl LibraryRepositoryTrait for LibraryRepository {
    fn get_by_id(&self, content_id: &str) -> Result<Option<LibraryContent>> {
        let mut conn = get_connection(&self.pool)?;
        let row = library_contents::table
            .find(content_id)
            .select(LibraryContentDB::as_select())
            .first::<LibraryContentDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(|r| LibraryContent::try_from(r).map_err(Into::into))
            .transpose()
    }

    fn list_children(&self, parent_id: &str) -> Result<Vec<LibraryContent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = library_contents::table
            .filter(library_contents::parent_id.eq(parent_id))
            .order(library_contents::name.asc())
            .select(LibraryContentDB::as_select())
            .load::<LibraryContentDB>(&mut conn)
            .into_core()?;
        to_domain(rows)
    }

    fn search(
        &self,
        kind: LibraryContentKind,
        request: &LibrarySearchRequest,
        master_user_id: &str,
    ) -> Result<LibraryContentPage> {
        let (skip, take) = request.pagination();
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = Self::filtered(kind, request, master_user_id)
            .count()
            .get_result(&mut conn)
            .into_core()?;

        let mut query = Self::filtered(kind, request, master_user_id);
        query = if request.sort_descending {
            query.order(library_contents::name.desc())
        } else {
            query.order(library_contents::name.asc())
        };
        let rows = query
            .offset(i64::from(skip))
            .limit(i64::from(take))
            .select(LibraryContentDB::as_select())
            .load::<LibraryContentDB>(&mut conn)
            .into_core()?;

        let items = to_domain(rows)?;
        let total_count = total.max(0) as u64;
        let has_more = u64::from(skip) + (items.len() as u64) < total_count;
        Ok(LibraryContentPage {
            items,
            total_count,
            has_more,
        })
    }

    async fn insert(&self, content: LibraryContent) -> Result<LibraryContent> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LibraryContent> {
                let row: LibraryContentDB = content.into();
                let inserted = diesel::insert_into(library_contents::table)
                    .values(&row)
                    .returning(LibraryContentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(LibraryContent::try_from(inserted)?)
            })
            .await
    }

    async fn update(&self, content: LibraryContent) -> Result<LibraryContent> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LibraryContent> {
                let row: LibraryContentDB = content.into();
                let updated = diesel::update(library_contents::table.find(row.id.clone()))
                    .set(&row)
                    .returning(LibraryContentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(LibraryContent::try_from(updated)?)
            })
            .await
    }

    async fn delete_many(&self, content_ids: Vec<String>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut removed = 0;
                // Deepest rows first so every chunk satisfies the parent foreign key.
                let ordered: Vec<String> = content_ids.into_iter().rev().collect();
                for chunk in chunk_for_sqlite(&ordered) {
                    removed += diesel::delete(
                        library_contents::table.filter(library_contents::id.eq_any(chunk)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(removed)
            })
            .await
    }
}
