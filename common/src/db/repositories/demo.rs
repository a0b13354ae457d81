// Demo metadata repository

use crate::db::repositories::queries::demo_queries;
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{AccountKind, DemoFile, DemoInput, DemoUpdate, SessionAccount};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

/// Repository for demo operations
#[derive(Clone)]
pub struct DemoRepository {
    pool: DbPool,
}

impl DemoRepository {
    /// Create a new DemoRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, author, input), fields(author_id = %author.profile_id))]
    pub async fn create(
        &self,
        author: &SessionAccount,
        input: &DemoInput,
    ) -> Result<DemoFile, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO demos (id, author_id, author_kind, title, description, file_path, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            demo_queries::SELECT_ALL_COLUMNS
        );

        let demo = sqlx::query_as::<_, DemoFile>(&query)
            .bind(Uuid::new_v4())
            .bind(author.profile_id)
            .bind(author.kind.to_string())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.file_path)
            .bind(Utc::now())
            .fetch_one(self.pool.pool())
            .await?;

        tracing::info!(demo_id = %demo.id, file_path = %demo.file_path, "Demo published");
        Ok(demo)
    }

    /// Update title and description; the file never changes
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: &DemoUpdate) -> Result<DemoFile, DatabaseError> {
        let query = format!(
            "UPDATE demos SET title = $2, description = $3 WHERE id = $1 RETURNING {}",
            demo_queries::SELECT_ALL_COLUMNS
        );

        let demo = sqlx::query_as::<_, DemoFile>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Demo not found: {}", id)))?;

        tracing::info!(demo_id = %id, "Demo updated");
        Ok(demo)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<DemoFile, DatabaseError> {
        let query = format!(
            "DELETE FROM demos WHERE id = $1 RETURNING {}",
            demo_queries::SELECT_ALL_COLUMNS
        );

        let demo = sqlx::query_as::<_, DemoFile>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Demo not found: {}", id)))?;

        tracing::info!(demo_id = %id, "Demo deleted");
        Ok(demo)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DemoFile>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM demos WHERE id = $1",
            demo_queries::SELECT_ALL_COLUMNS
        );

        let demo = sqlx::query_as::<_, DemoFile>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(demo)
    }

    /// All demos of one profile, newest first
    #[instrument(skip(self))]
    pub async fn find_by_author(
        &self,
        author_id: Uuid,
        author_kind: AccountKind,
    ) -> Result<Vec<DemoFile>, DatabaseError> {
        let query = format!(
            r#"
            SELECT {}
            FROM demos
            WHERE author_id = $1 AND author_kind = $2
            ORDER BY published_at DESC
            "#,
            demo_queries::SELECT_ALL_COLUMNS
        );

        let demos = sqlx::query_as::<_, DemoFile>(&query)
            .bind(author_id)
            .bind(author_kind.to_string())
            .fetch_all(self.pool.pool())
            .await?;

        tracing::debug!(count = demos.len(), "Found demos for author");
        Ok(demos)
    }
}
