// Musician profile repository

use crate::db::repositories::queries::{like_pattern, musician_queries};
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Musician, MusicianInput};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// Search filters for the musician directory
///
/// Text filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicianFilter {
    pub city: Option<String>,
    pub province: Option<String>,
    pub musical_tastes: Option<String>,
    pub instruments: Option<String>,
    pub available_for_hire: Option<bool>,
}

/// Repository for musician profile operations
#[derive(Clone)]
pub struct MusicianRepository {
    pool: DbPool,
}

impl MusicianRepository {
    /// Create a new MusicianRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the profile of an existing musician account
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        profile_id: Uuid,
        input: &MusicianInput,
    ) -> Result<Musician, DatabaseError> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO musicians (
                profile_id, name, surname, age, city, province,
                contacts, musical_tastes, instruments, description,
                available_for_hire, available_locations, profile_picture_path,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING {}
            "#,
            musician_queries::SELECT_ALL_COLUMNS
        );

        let musician = sqlx::query_as::<_, Musician>(&query)
            .bind(profile_id)
            .bind(&input.name)
            .bind(&input.surname)
            .bind(input.age)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.contacts)
            .bind(&input.musical_tastes)
            .bind(&input.instruments)
            .bind(&input.description)
            .bind(input.available_for_hire)
            .bind(&input.available_locations)
            .bind(&input.profile_picture_path)
            .bind(now)
            .fetch_one(self.pool.pool())
            .await?;

        tracing::info!(profile_id = %profile_id, "Musician profile created");
        Ok(musician)
    }

    /// Replace the editable fields of a profile
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        profile_id: Uuid,
        input: &MusicianInput,
    ) -> Result<Musician, DatabaseError> {
        let query = format!(
            r#"
            UPDATE musicians
            SET name = $2,
                surname = $3,
                age = $4,
                city = $5,
                province = $6,
                contacts = $7,
                musical_tastes = $8,
                instruments = $9,
                description = $10,
                available_for_hire = $11,
                available_locations = $12,
                profile_picture_path = $13,
                updated_at = $14
            WHERE profile_id = $1
            RETURNING {}
            "#,
            musician_queries::SELECT_ALL_COLUMNS
        );

        let musician = sqlx::query_as::<_, Musician>(&query)
            .bind(profile_id)
            .bind(&input.name)
            .bind(&input.surname)
            .bind(input.age)
            .bind(&input.city)
            .bind(&input.province)
            .bind(&input.contacts)
            .bind(&input.musical_tastes)
            .bind(&input.instruments)
            .bind(&input.description)
            .bind(input.available_for_hire)
            .bind(&input.available_locations)
            .bind(&input.profile_picture_path)
            .bind(Utc::now())
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("Musician not found: {}", profile_id))
            })?;

        tracing::info!(profile_id = %profile_id, "Musician profile updated");
        Ok(musician)
    }

    /// Delete a profile; the credentials stay so the account can recreate it
    #[instrument(skip(self))]
    pub async fn delete(&self, profile_id: Uuid) -> Result<Musician, DatabaseError> {
        let query = format!(
            "DELETE FROM musicians WHERE profile_id = $1 RETURNING {}",
            musician_queries::SELECT_ALL_COLUMNS
        );

        let musician = sqlx::query_as::<_, Musician>(&query)
            .bind(profile_id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("Musician not found: {}", profile_id))
            })?;

        tracing::info!(profile_id = %profile_id, "Musician profile deleted");
        Ok(musician)
    }

    /// Find a profile by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, profile_id: Uuid) -> Result<Option<Musician>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM musicians WHERE profile_id = $1",
            musician_queries::SELECT_ALL_COLUMNS
        );

        let musician = sqlx::query_as::<_, Musician>(&query)
            .bind(profile_id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(musician)
    }

    /// List profiles matching the filter, alphabetically
    #[instrument(skip(self))]
    pub async fn find_all(&self, filter: &MusicianFilter) -> Result<Vec<Musician>, DatabaseError> {
        let mut query = format!(
            "SELECT {} FROM musicians WHERE TRUE",
            musician_queries::SELECT_ALL_COLUMNS
        );
        let mut param_count = 1;

        let text_filters = [
            ("city", &filter.city),
            ("province", &filter.province),
            ("musical_tastes", &filter.musical_tastes),
            ("instruments", &filter.instruments),
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

        query.push_str(" ORDER BY surname, name");

        let mut query_builder = sqlx::query_as::<_, Musician>(&query);

        for (_, value) in text_filters.iter() {
            if let Some(value) = value {
                query_builder = query_builder.bind(like_pattern(value));
            }
        }

        if let Some(available_for_hire) = filter.available_for_hire {
            query_builder = query_builder.bind(available_for_hire);
        }

        let musicians = query_builder.fetch_all(self.pool.pool()).await?;

        tracing::debug!(count = musicians.len(), "Found musicians with filter");
        Ok(musicians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: MusicianFilter = serde_json::from_value(serde_json::json!({
            "city": "Magenta",
            "musicalTastes": "rock",
            "availableForHire": true
        }))
        .unwrap();
        assert_eq!(filter.city.as_deref(), Some("Magenta"));
        assert_eq!(filter.musical_tastes.as_deref(), Some("rock"));
        assert_eq!(filter.available_for_hire, Some(true));
        assert!(filter.instruments.is_none());
    }
}
