// Bootstrap utilities for binary initialization

use crate::config::Settings;
use crate::db::DbPool;
use crate::media::{LocalMediaStorage, MediaStorage};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Initialize the database pool and bring the schema up to date
///
/// # Errors
/// Returns error if the database is unreachable or a migration fails
#[tracing::instrument(skip(settings))]
pub async fn init_database_pool(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    db_pool
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    info!("Database pool initialized");
    Ok(db_pool)
}

/// Initialize local media storage and create its directories
///
/// # Errors
/// Returns error if the media directories cannot be created
#[tracing::instrument(skip(settings))]
pub async fn init_media_storage(settings: &Settings) -> Result<Arc<dyn MediaStorage>> {
    info!(media_dir = %settings.media.media_dir, "Initializing media storage");

    let storage = LocalMediaStorage::new(&settings.media.media_dir);
    storage
        .init()
        .await
        .context("Failed to create media directories")?;

    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_media_storage_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.media.media_dir = dir.path().join("media").to_string_lossy().into_owned();

        init_media_storage(&settings).await.unwrap();

        assert!(dir.path().join("media/images").is_dir());
        assert!(dir.path().join("media/demos").is_dir());
    }
}
