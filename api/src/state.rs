use std::sync::Arc;

use common::auth::{CredentialsService, SessionService};
use common::config::Settings;
use common::db::repositories::CredentialsRepository;
use common::db::DbPool;
use common::media::MediaStorage;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Arc<Settings>,
    pub sessions: SessionService,
    pub credentials: CredentialsService,
    pub media: Arc<dyn MediaStorage>,
    /// Absent when no Prometheus recorder was installed (tests)
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(
        db_pool: DbPool,
        config: Settings,
        media: Arc<dyn MediaStorage>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let sessions = SessionService::new(&config.auth.session_secret, config.auth.session_ttl_hours);
        let credentials = CredentialsService::new(
            CredentialsRepository::new(db_pool.clone()),
            config.auth.bcrypt_cost,
        );

        Self {
            db_pool,
            config: Arc::new(config),
            sessions,
            credentials,
            media,
            metrics,
        }
    }
}
