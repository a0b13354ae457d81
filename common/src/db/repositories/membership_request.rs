// Membership request repository

use crate::db::repositories::queries::membership_request_queries;
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{MembershipRequest, MembershipRequestInput};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

/// Repository for membership request operations
#[derive(Clone)]
pub struct MembershipRequestRepository {
    pool: DbPool,
}

impl MembershipRequestRepository {
    /// Create a new MembershipRequestRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Send a request from `musician_id` to the group in `input`
    ///
    /// A second request for the same pair fails with `DatabaseError::DuplicateKey`.
    #[instrument(skip(self, input), fields(group_id = %input.group_id))]
    pub async fn create(
        &self,
        musician_id: Uuid,
        input: &MembershipRequestInput,
    ) -> Result<MembershipRequest, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO membership_requests (id, musician_id, group_id, description, published_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            membership_request_queries::SELECT_ALL_COLUMNS
        );

        let request = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(Uuid::new_v4())
            .bind(musician_id)
            .bind(input.group_id)
            .bind(&input.description)
            .bind(Utc::now())
            .fetch_one(self.pool.pool())
            .await?;

        tracing::info!(
            request_id = %request.id,
            musician_id = %musician_id,
            group_id = %input.group_id,
            "Membership request sent"
        );
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<MembershipRequest, DatabaseError> {
        let query = format!(
            "DELETE FROM membership_requests WHERE id = $1 RETURNING {}",
            membership_request_queries::SELECT_ALL_COLUMNS
        );

        let request = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("Membership request not found: {}", id))
            })?;

        tracing::info!(request_id = %id, "Membership request deleted");
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MembershipRequest>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM membership_requests WHERE id = $1",
            membership_request_queries::SELECT_ALL_COLUMNS
        );

        let request = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(request)
    }

    /// Requests sent by a musician, newest first
    #[instrument(skip(self))]
    pub async fn find_by_musician(
        &self,
        musician_id: Uuid,
    ) -> Result<Vec<MembershipRequest>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM membership_requests WHERE musician_id = $1 ORDER BY published_at DESC",
            membership_request_queries::SELECT_ALL_COLUMNS
        );

        let requests = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(musician_id)
            .fetch_all(self.pool.pool())
            .await?;

        Ok(requests)
    }

    /// Requests received by a group, newest first
    #[instrument(skip(self))]
    pub async fn find_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MembershipRequest>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM membership_requests WHERE group_id = $1 ORDER BY published_at DESC",
            membership_request_queries::SELECT_ALL_COLUMNS
        );

        let requests = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(group_id)
            .fetch_all(self.pool.pool())
            .await?;

        Ok(requests)
    }
}
