// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    pub session_secret: String,
    pub session_ttl_hours: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Set the `Secure` attribute on the session cookie (HTTPS deployments)
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_cookie_name() -> String {
    "bandmate_session".to_string()
}

fn default_bcrypt_cost() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory holding the single-page front end (index.html, js, css)
    pub public_dir: String,
    /// Directory where uploaded images and demos are stored
    pub media_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default = "default_json_logs")]
    pub json_logs: bool,
}

fn default_json_logs() -> bool {
    true
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Config::try_from(&Settings::default())?;

        let builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        if self.auth.session_secret.len() < 16 {
            return Err("Session secret must be at least 16 bytes long".to_string());
        }
        if self.auth.session_ttl_hours == 0 {
            return Err("Session TTL must be greater than 0".to_string());
        }
        if self.auth.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(format!(
                "Session TTL must be at most {} hours",
                MAX_SESSION_TTL_HOURS
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err("bcrypt cost must be between 4 and 31".to_string());
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err("Session cookie name cannot be empty".to_string());
        }

        if self.media.media_dir.is_empty() {
            return Err("Media directory cannot be empty".to_string());
        }
        if self.media.max_upload_bytes == 0 {
            return Err("Media max_upload_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/bandmate".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
            },
            auth: AuthConfig {
                session_secret: "change-me-in-production-please".to_string(),
                session_ttl_hours: 24,
                cookie_name: default_cookie_name(),
                secure_cookie: false,
                bcrypt_cost: default_bcrypt_cost(),
            },
            media: MediaConfig {
                public_dir: "public".to_string(),
                media_dir: "public/media".to_string(),
                max_upload_bytes: 20 * 1024 * 1024,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: default_json_logs(),
            },
        }
    }
}
