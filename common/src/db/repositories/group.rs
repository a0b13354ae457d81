// Group profile repository

use crate::db::repositories::queries::{group_queries, like_pattern};
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Group, GroupInput};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// Search filters for the group directory
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFilter {
    pub city: Option<String>,
    pub province: Option<String>,
    pub musical_genres: Option<String>,
    pub available_for_hire: Option<bool>,
}

/// Repository for group profile operations
#[derive(Clone)]
pub struct GroupRepository {
    pool: DbPool,
}

impl GroupRepository {
    /// Create a new GroupRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the profile of an existing group account
    #[instrument(skip(self, input))]
    pub async fn create(&self, profile_id: Uuid, input: &GroupInput) -> Result<Group, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO music_groups (
                profile_id, name, city, province,
                contacts, musical_genres, musicians_list, description, time_table,
                available_for_hire, available_locations, profile_picture_path,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING {}
            "#,
            group_queries::SELECT_ALL_COLUMNS
        );

        let group = sqlx::query_as::<_, Group>(&query)
            .bind(profile_id)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.contacts)
            .bind(&input.musical_genres)
            .bind(&input.musicians_list)
            .bind(&input.description)
            .bind(&input.time_table)
            .bind(input.available_for_hire)
            .bind(&input.available_locations)
            .bind(&input.profile_picture_path)
            .bind(Utc::now())
            .fetch_one(self.pool.pool())
            .await?;

        tracing::info!(profile_id = %profile_id, "Group profile created");
        Ok(group)
    }

    /// Replace the editable fields of a profile
    #[instrument(skip(self, input))]
    pub async fn update(&self, profile_id: Uuid, input: &GroupInput) -> Result<Group, DatabaseError> {
        let query = format!(
            r#"
            UPDATE music_groups
            SET name = $2,
                city = $3,
                province = $4,
                contacts = $5,
                musical_genres = $6,
                musicians_list = $7,
                description = $8,
                time_table = $9,
                available_for_hire = $10,
                available_locations = $11,
                profile_picture_path = $12,
                updated_at = $13
            WHERE profile_id = $1
            RETURNING {}
            "#,
            group_queries::SELECT_ALL_COLUMNS
        );

        let group = sqlx::query_as::<_, Group>(&query)
            .bind(profile_id)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.contacts)
            .bind(&input.musical_genres)
            .bind(&input.musicians_list)
            .bind(&input.description)
            .bind(&input.time_table)
            .bind(input.available_for_hire)
            .bind(&input.available_locations)
            .bind(&input.profile_picture_path)
            .bind(Utc::now())
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Group not found: {}", profile_id)))?;

        tracing::info!(profile_id = %profile_id, "Group profile updated");
        Ok(group)
    }

    /// Delete a profile; the credentials stay so the account can recreate it
    #[instrument(skip(self))]
    pub async fn delete(&self, profile_id: Uuid) -> Result<Group, DatabaseError> {
        let query = format!(
            "DELETE FROM music_groups WHERE profile_id = $1 RETURNING {}",
            group_queries::SELECT_ALL_COLUMNS
        );

        let group = sqlx::query_as::<_, Group>(&query)
            .bind(profile_id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Group not found: {}", profile_id)))?;

        tracing::info!(profile_id = %profile_id, "Group profile deleted");
        Ok(group)
    }

    /// Find a profile by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, profile_id: Uuid) -> Result<Option<Group>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM music_groups WHERE profile_id = $1",
            group_queries::SELECT_ALL_COLUMNS
        );

        let group = sqlx::query_as::<_, Group>(&query)
            .bind(profile_id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(group)
    }

    /// List profiles matching the filter, alphabetically
    #[instrument(skip(self))]
    pub async fn find_all(&self, filter: &GroupFilter) -> Result<Vec<Group>, DatabaseError> {
        let mut query = format!(
            "SELECT {} FROM music_groups WHERE TRUE",
            group_queries::SELECT_ALL_COLUMNS
        );
        let mut param_count = 1;

        let text_filters = [
            ("city", &filter.city),
            ("province", &filter.province),
            ("musical_genres", &filter.musical_genres),
        ];

        for (column, value) in text_filters.iter() {
            if value.is_some() {
                query.push_str(&format!(" AND {} ILIKE ${}", column, param_count));
                param_count += 1;
            }
        }

        if filter.available_for_hire.is_some() {
            query.push_str(&format!(" AND available_for_hire = ${}", param_count));
        }

        query.push_str(" ORDER BY name");

        let mut query_builder = sqlx::query_as::<_, Group>(&query);

        for (_, value) in text_filters.iter() {
            if let Some(value) = value {
                query_builder = query_builder.bind(like_pattern(value));
            }
        }

        if let Some(available_for_hire) = filter.available_for_hire {
            query_builder = query_builder.bind(available_for_hire);
        }

        let groups = query_builder.fetch_all(self.pool.pool()).await?;

        tracing::debug!(count = groups.len(), "Found groups with filter");
        Ok(groups)
    }
}
