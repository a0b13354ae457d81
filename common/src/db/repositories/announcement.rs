// Announcement repository

use crate::db::repositories::queries::{announcement_queries, like_pattern};
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{
    AccountKind, Announcement, AnnouncementInput, AnnouncementType, AnnouncementUpdate,
    SessionAccount,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// Announcement search filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementFilter {
    pub author_id: Option<Uuid>,
    #[serde(rename = "authorType")]
    pub author_kind: Option<AccountKind>,
    pub announcement_type: Option<AnnouncementType>,
    pub city: Option<String>,
    pub province: Option<String>,
}

/// Repository for announcement operations
#[derive(Clone)]
pub struct AnnouncementRepository {
    pool: DbPool,
}

impl AnnouncementRepository {
    /// Create a new AnnouncementRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Publish an announcement on behalf of `author`
    #[instrument(skip(self, author, input), fields(author_id = %author.profile_id))]
    pub async fn create(
        &self,
        author: &SessionAccount,
        input: &AnnouncementInput,
    ) -> Result<Announcement, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO announcements (
                id, author_id, author_kind, announcement_type,
                title, description, city, province, published_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            announcement_queries::SELECT_ALL_COLUMNS
        );

        let announcement = sqlx::query_as::<_, Announcement>(&query)
            .bind(Uuid::new_v4())
            .bind(author.profile_id)
            .bind(author.kind.to_string())
            .bind(input.announcement_type.to_string())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.city)
            .bind(&input.province)
            .bind(Utc::now())
            .fetch_one(self.pool.pool())
            .await?;

        tracing::info!(
            announcement_id = %announcement.id,
            announcement_type = %announcement.announcement_type,
            "Announcement published"
        );
        Ok(announcement)
    }

    /// Update the text of an announcement; author and type never change
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: &AnnouncementUpdate,
    ) -> Result<Announcement, DatabaseError> {
        let query = format!(
            r#"
            UPDATE announcements
            SET title = $2,
                description = $3,
                city = $4,
                province = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            announcement_queries::SELECT_ALL_COLUMNS
        );

        let announcement = sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.city)
            .bind(&input.province)
            .bind(Utc::now())
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Announcement not found: {}", id)))?;

        tracing::info!(announcement_id = %id, "Announcement updated");
        Ok(announcement)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Announcement, DatabaseError> {
        let query = format!(
            "DELETE FROM announcements WHERE id = $1 RETURNING {}",
            announcement_queries::SELECT_ALL_COLUMNS
        );

        let announcement = sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Announcement not found: {}", id)))?;

        tracing::info!(announcement_id = %id, "Announcement deleted");
        Ok(announcement)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM announcements WHERE id = $1",
            announcement_queries::SELECT_ALL_COLUMNS
        );

        let announcement = sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(announcement)
    }

    /// List announcements matching the filter, newest first
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        filter: &AnnouncementFilter,
    ) -> Result<Vec<Announcement>, DatabaseError> {
        let mut query = format!(
            "SELECT {} FROM announcements WHERE TRUE",
            announcement_queries::SELECT_ALL_COLUMNS
        );
        let mut param_count = 1;

        if filter.author_id.is_some() {
            query.push_str(&format!(" AND author_id = ${}", param_count));
            param_count += 1;
        }

        if filter.author_kind.is_some() {
            query.push_str(&format!(" AND author_kind = ${}", param_count));
            param_count += 1;
        }

        if filter.announcement_type.is_some() {
            query.push_str(&format!(" AND announcement_type = ${}", param_count));
            param_count += 1;
        }

        if filter.city.is_some() {
            query.push_str(&format!(" AND city ILIKE ${}", param_count));
            param_count += 1;
        }

        if filter.province.is_some() {
            query.push_str(&format!(" AND province ILIKE ${}", param_count));
        }

        query.push_str(" ORDER BY published_at DESC");

        let mut query_builder = sqlx::query_as::<_, Announcement>(&query);

        if let Some(author_id) = filter.author_id {
            query_builder = query_builder.bind(author_id);
        }

        if let Some(author_kind) = filter.author_kind {
            query_builder = query_builder.bind(author_kind.to_string());
        }

        if let Some(announcement_type) = filter.announcement_type {
            query_builder = query_builder.bind(announcement_type.to_string());
        }

        if let Some(city) = &filter.city {
            query_builder = query_builder.bind(like_pattern(city));
        }

        if let Some(province) = &filter.province {
            query_builder = query_builder.bind(like_pattern(province));
        }

        let announcements = query_builder.fetch_all(self.pool.pool()).await?;

        tracing::debug!(count = announcements.len(), "Found announcements with filter");
        Ok(announcements)
    }
}
