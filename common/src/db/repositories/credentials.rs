// Credentials repository: login data of musician and group accounts

use crate::db::repositories::queries::credentials_queries;
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{AccountKind, Credentials};
use tracing::instrument;
use uuid::Uuid;

/// Repository for credentials-related database operations
#[derive(Clone)]
pub struct CredentialsRepository {
    pool: DbPool,
}

impl CredentialsRepository {
    /// Create a new CredentialsRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert new credentials
    ///
    /// A second account with the same kind and username fails with
    /// `DatabaseError::DuplicateKey`.
    #[instrument(skip(self, credentials), fields(profile_id = %credentials.profile_id, kind = %credentials.kind))]
    pub async fn create(&self, credentials: &Credentials) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (profile_id, username, password_hash, kind, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(credentials.profile_id)
        .bind(&credentials.username)
        .bind(&credentials.password_hash)
        .bind(credentials.kind.to_string())
        .bind(credentials.created_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            profile_id = %credentials.profile_id,
            username = %credentials.username,
            kind = %credentials.kind,
            "Credentials created"
        );
        Ok(())
    }

    /// Find the credentials of one account kind by username
    #[instrument(skip(self))]
    pub async fn find_by_username(
        &self,
        kind: AccountKind,
        username: &str,
    ) -> Result<Option<Credentials>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM credentials WHERE kind = $1 AND username = $2",
            credentials_queries::SELECT_ALL_COLUMNS
        );

        let credentials = sqlx::query_as::<_, Credentials>(&query)
            .bind(kind.to_string())
            .bind(username)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(credentials)
    }

    /// Find credentials by profile id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, profile_id: Uuid) -> Result<Option<Credentials>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM credentials WHERE profile_id = $1",
            credentials_queries::SELECT_ALL_COLUMNS
        );

        let credentials = sqlx::query_as::<_, Credentials>(&query)
            .bind(profile_id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(credentials)
    }

    /// Invalidate every session issued so far for an account
    ///
    /// Returns the new session version.
    #[instrument(skip(self))]
    pub async fn bump_session_version(&self, profile_id: Uuid) -> Result<i32, DatabaseError> {
        let version: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE credentials
            SET session_version = session_version + 1
            WHERE profile_id = $1
            RETURNING session_version
            "#,
        )
        .bind(profile_id)
        .fetch_optional(self.pool.pool())
        .await?;

        version.ok_or_else(|| {
            DatabaseError::NotFound(format!("Credentials not found: {}", profile_id))
        })
    }
}
