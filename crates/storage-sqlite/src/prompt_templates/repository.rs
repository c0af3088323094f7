use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::sync::Arc;

use vtt_core::constants::DRAFT_VERSION_SUFFIX;
use vtt_core::prompt_templates::{
    PromptTemplate, PromptTemplatePage, PromptTemplateRepositoryTrait, PromptTemplateSearch,
    TemplateScope,
};
use vtt_core::Result;

use super::model::PromptTemplateDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::prompt_templates;
use crate::utils::like_pattern;

pub struct PromptTemplateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PromptTemplateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PromptTemplateRepository { pool, writer }
    }

    fn filtered(query: &PromptTemplateSearch) -> prompt_templates::BoxedQuery<'static, Sqlite> {
        let mut boxed = prompt_templates::table.into_boxed();
        if let Some(name) = query.name.as_deref().filter(|n| !n.trim().is_empty()) {
            boxed = boxed.filter(
                prompt_templates::name
                    .like(like_pattern(name.trim()))
                    .escape('\\'),
            );
        }
        if let Some(category) = query.category {
            boxed = boxed.filter(prompt_templates::category.eq(category.as_str()));
        }
        let draft_pattern = format!("%{}", DRAFT_VERSION_SUFFIX);
        boxed = match query.scope {
            TemplateScope::Any => boxed,
            TemplateScope::Published => {
                boxed.filter(prompt_templates::version.not_like(draft_pattern))
            }
            TemplateScope::Drafts => boxed.filter(prompt_templates::version.like(draft_pattern)),
        };
        boxed
    }
}

fn to_domain(rows: Vec<PromptTemplateDB>) -> Result<Vec<PromptTemplate>> {
    rows.into_iter()
        .map(|row| PromptTemplate::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl PromptTemplateRepositoryTrait for PromptTemplateRepository {
    fn get_by_id(&self, template_id: &str) -> Result<Option<PromptTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        let row = prompt_templates::table
            .find(template_id)
            .select(PromptTemplateDB::as_select())
            .first::<PromptTemplateDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(|r| PromptTemplate::try_from(r).map_err(Into::into))
            .transpose()
    }

    fn list_by_name(&self, template_name: &str) -> Result<Vec<PromptTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = prompt_templates::table
            .filter(prompt_templates::name.eq(template_name))
            .select(PromptTemplateDB::as_select())
            .load::<PromptTemplateDB>(&mut conn)
            .into_core()?;
        to_domain(rows)
    }

    fn exists(
        &self,
        template_name: &str,
        template_version: &str,
        excluding_id: Option<&str>,
    ) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = prompt_templates::table
            .filter(prompt_templates::name.eq(template_name))
            .filter(prompt_templates::version.eq(template_version))
            .into_boxed();
        if let Some(excluded) = excluding_id {
            query = query.filter(prompt_templates::id.ne(excluded.to_string()));
        }
        let count: i64 = query.count().get_result(&mut conn).into_core()?;
        Ok(count > 0)
    }

    fn search(&self, query: &PromptTemplateSearch) -> Result<PromptTemplatePage> {
        let (skip, take) = query.pagination();
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = Self::filtered(query)
            .count()
            .get_result(&mut conn)
            .into_core()?;
        let rows = Self::filtered(query)
            .order((prompt_templates::name.asc(), prompt_templates::version.asc()))
            .offset(i64::from(skip))
            .limit(i64::from(take))
            .select(PromptTemplateDB::as_select())
            .load::<PromptTemplateDB>(&mut conn)
            .into_core()?;

        let items = to_domain(rows)?;
        let total_count = total.max(0) as u64;
        let has_more = u64::from(skip) + (items.len() as u64) < total_count;
        Ok(PromptTemplatePage {
            items,
            total_count,
            has_more,
        })
    }

    async fn insert(&self, template: PromptTemplate) -> Result<PromptTemplate> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PromptTemplate> {
                let row: PromptTemplateDB = template.into();
                let inserted = diesel::insert_into(prompt_templates::table)
                    .values(&row)
                    .returning(PromptTemplateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PromptTemplate::try_from(inserted)?)
            })
            .await
    }

    async fn update(&self, template: PromptTemplate) -> Result<PromptTemplate> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PromptTemplate> {
                let row: PromptTemplateDB = template.into();
                let updated = diesel::update(prompt_templates::table.find(row.id.clone()))
                    .set(&row)
                    .returning(PromptTemplateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PromptTemplate::try_from(updated)?)
            })
            .await
    }

    async fn delete(&self, template_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(prompt_templates::table.find(template_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use chrono::Utc;
    use tempfile::TempDir;
    use vtt_core::ai::GeneratedContentType;

    fn setup() -> (TempDir, PromptTemplateRepository) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.clone());
        (dir, PromptTemplateRepository::new(pool, writer))
    }

    fn template(name: &str, version: &str, category: GeneratedContentType) -> PromptTemplate {
        let now = Utc::now().naive_utc();
        PromptTemplate {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.to_string(),
            category,
            version: version.to_string(),
            system_prompt: "system".to_string(),
            user_prompt_template: "Describe {subject}".to_string(),
            negative_prompt_template: None,
            reference_image_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_delete() {
        let (_dir, repo) = setup();
        let created = repo
            .insert(template("portrait", "1.0", GeneratedContentType::ImagePortrait))
            .await
            .unwrap();

        let loaded = repo.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(loaded.name, "portrait");
        assert_eq!(loaded.category, GeneratedContentType::ImagePortrait);

        assert_eq!(repo.delete(created.id.clone()).await.unwrap(), 1);
        assert!(repo.get_by_id(&created.id).unwrap().is_none());
        assert_eq!(repo.delete(created.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unique_name_version_is_enforced() {
        let (_dir, repo) = setup();
        let first = repo
            .insert(template("token", "1.0", GeneratedContentType::ImageToken))
            .await
            .unwrap();

        assert!(repo.exists("token", "1.0", None).unwrap());
        assert!(!repo.exists("token", "1.0", Some(&first.id)).unwrap());
        assert!(!repo.exists("token", "2.0", None).unwrap());

        let err = repo
            .insert(template("token", "1.0", GeneratedContentType::ImageToken))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            vtt_core::Error::Database(vtt_core::errors::DatabaseError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_optional_fields() {
        let (_dir, repo) = setup();
        let mut created = repo
            .insert(template("music", "1.0", GeneratedContentType::AudioMusic))
            .await
            .unwrap();
        created.negative_prompt_template = Some("no vocals".to_string());
        let updated = repo.update(created.clone()).await.unwrap();
        assert_eq!(updated.negative_prompt_template.as_deref(), Some("no vocals"));

        created.negative_prompt_template = None;
        let cleared = repo.update(created).await.unwrap();
        assert!(cleared.negative_prompt_template.is_none());
    }

    #[tokio::test]
    async fn test_search_filters_scope_and_pages() {
        let (_dir, repo) = setup();
        for (name, version) in [
            ("forest", "1.0"),
            ("forest", "1.1-draft"),
            ("dungeon", "1.0"),
            ("tavern_50%", "1.0"),
        ] {
            repo.insert(template(name, version, GeneratedContentType::ImageBackground))
                .await
                .unwrap();
        }
        repo.insert(template("forest-sounds", "1.0", GeneratedContentType::AudioAmbient))
            .await
            .unwrap();

        let page = repo
            .search(&PromptTemplateSearch {
                name: Some("FOREST".to_string()),
                category: Some(GeneratedContentType::ImageBackground),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 2);

        let published = repo
            .search(&PromptTemplateSearch {
                scope: TemplateScope::Published,
                take: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(published.total_count, 4);
        assert_eq!(published.items.len(), 2);
        assert_eq!(published.items[0].name, "dungeon");
        assert!(published.has_more);

        let drafts = repo
            .search(&PromptTemplateSearch {
                scope: TemplateScope::Drafts,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(drafts.total_count, 1);
        assert_eq!(drafts.items[0].version, "1.1-draft");

        let literal = repo
            .search(&PromptTemplateSearch {
                name: Some("50%".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(literal.total_count, 1);
    }

    #[tokio::test]
    async fn test_list_by_name_returns_all_versions() {
        let (_dir, repo) = setup();
        for version in ["1.0", "1.1", "2.0-draft"] {
            repo.insert(template("enhance", version, GeneratedContentType::PromptEnhancement))
                .await
                .unwrap();
        }
        assert_eq!(repo.list_by_name("enhance").unwrap().len(), 3);
        assert!(repo.list_by_name("missing").unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_creates_report_already_exists() {
        use vtt_core::prompt_templates::{
            NewPromptTemplate, PromptTemplateService, PromptTemplateServiceTrait,
        };

        let (_dir, repo) = setup();
        let service = Arc::new(PromptTemplateService::new(Arc::new(repo)));

        for round in 0..20 {
            let name = format!("portrait-{}", round);
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let service = service.clone();
                    let name = name.clone();
                    tokio::spawn(async move {
                        service
                            .create_template(NewPromptTemplate {
                                name,
                                category: GeneratedContentType::ImagePortrait,
                                version: Some("1.0".to_string()),
                                system_prompt: String::new(),
                                user_prompt_template: "Portrait of {subject}".to_string(),
                                negative_prompt_template: None,
                                reference_image_id: None,
                            })
                            .await
                    })
                })
                .collect();

            let mut created = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => created += 1,
                    Err(err) => {
                        assert_eq!(err.field_errors()[0].field, "version");
                        assert_eq!(
                            err.to_string(),
                            format!("Prompt template '{}' version '1.0' already exists", name)
                        );
                    }
                }
            }
            assert_eq!(created, 1, "round {}", round);
        }
    }
}
