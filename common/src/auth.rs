// Password hashing, session tokens and credential checks

use crate::config::MAX_SESSION_TTL_HOURS;
use crate::db::repositories::CredentialsRepository;
use crate::errors::{AuthError, DatabaseError};
use crate::models::{AccountKind, Credentials, SessionAccount, SessionClaims};
use crate::telemetry;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AuthError::Hashing(e.to_string())
        })
}

/// Check a password against a bcrypt hash on the blocking pool
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| {
            error!(error = %e, "Failed to verify password");
            AuthError::Hashing(e.to_string())
        })
}

/// Issues and validates the signed token stored in the session cookie
#[derive(Clone)]
pub struct SessionService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    ttl_hours: i64,
}

impl SessionService {
    /// `ttl_hours` is capped at `MAX_SESSION_TTL_HOURS`
    #[instrument(skip(secret))]
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            ttl_hours: ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64,
        }
    }

    /// Session lifetime, also used as the cookie max-age
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }

    /// Issue a session token for an authenticated account
    ///
    /// `session_version` is the credentials row's current version; a logout
    /// bumps it and every token issued before stops resolving.
    #[instrument(skip(self, account), fields(profile_id = %account.profile_id))]
    pub fn issue(&self, account: &SessionAccount, session_version: i32) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: account.profile_id.to_string(),
            username: account.username.clone(),
            kind: account.kind,
            ver: session_version,
            exp: (now + self.ttl()).timestamp(),
            iat: now.timestamp(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to encode session token");
            AuthError::InvalidSession(format!("Failed to encode token: {}", e))
        })
    }

    /// Decode and validate a session token
    #[instrument(skip(self, token))]
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                warn!(error = %e, "Rejected session token");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                    _ => AuthError::InvalidSession(format!("Token validation failed: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Signup, login and session resolution against the credentials table
#[derive(Clone)]
pub struct CredentialsService {
    repository: Arc<CredentialsRepository>,
    bcrypt_cost: u32,
}

impl CredentialsService {
    pub fn new(repository: CredentialsRepository, bcrypt_cost: u32) -> Self {
        Self {
            repository: Arc::new(repository),
            bcrypt_cost,
        }
    }

    /// Register a new account and mint its profile id
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        kind: AccountKind,
        username: &str,
        password: &str,
    ) -> Result<Credentials, AuthError> {
        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        let credentials = Credentials {
            profile_id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            kind,
            session_version: 0,
            created_at: Utc::now(),
        };

        self.repository
            .create(&credentials)
            .await
            .map_err(|e| match e {
                DatabaseError::DuplicateKey(_) => {
                    warn!(username = %username, kind = %kind, "Username already taken");
                    AuthError::DuplicateUsername(username.to_string())
                }
                other => {
                    error!(error = %other, username = %username, "Failed to create credentials");
                    AuthError::from(other)
                }
            })?;

        telemetry::record_signup(kind);
        tracing::info!(profile_id = %credentials.profile_id, kind = %kind, "Account signed up");
        Ok(credentials)
    }

    /// Check a username/password pair for one account kind
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        kind: AccountKind,
        username: &str,
        password: &str,
    ) -> Result<Credentials, AuthError> {
        let credentials = self
            .repository
            .find_by_username(kind, username)
            .await
            .map_err(|e| {
                error!(error = %e, username = %username, "Database error during login");
                AuthError::from(e)
            })?;

        let credentials = match credentials {
            Some(credentials) => credentials,
            None => {
                telemetry::record_login_failure(kind, "unknown_user");
                warn!(username = %username, kind = %kind, "Login for unknown user");
                return Err(AuthError::UnknownUser);
            }
        };

        if !verify_password(password, &credentials.password_hash).await? {
            telemetry::record_login_failure(kind, "wrong_password");
            warn!(username = %username, kind = %kind, "Login with wrong password");
            return Err(AuthError::WrongPassword);
        }

        telemetry::record_login_success(kind);
        tracing::info!(
            profile_id = %credentials.profile_id,
            kind = %kind,
            "Account logged in"
        );
        Ok(credentials)
    }

    /// Turn validated session claims back into the account they name
    ///
    /// Fails when the account no longer exists or the claims disagree with it.
    #[instrument(skip(self, claims), fields(sub = %claims.sub))]
    pub async fn resolve(&self, claims: &SessionClaims) -> Result<SessionAccount, AuthError> {
        let profile_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::InvalidSession(format!("Invalid subject: {}", e)))?;

        let credentials = self
            .repository
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| AuthError::InvalidSession("Account no longer exists".to_string()))?;

        if credentials.kind != claims.kind || credentials.username != claims.username {
            return Err(AuthError::InvalidSession(
                "Session does not match account".to_string(),
            ));
        }
        if credentials.session_version != claims.ver {
            return Err(AuthError::InvalidSession("Session was ended".to_string()));
        }

        Ok(credentials.into())
    }

    /// End every session of an account, including the current one
    #[instrument(skip(self, account), fields(profile_id = %account.profile_id))]
    pub async fn end_sessions(&self, account: &SessionAccount) -> Result<(), AuthError> {
        let version = self
            .repository
            .bump_session_version(account.profile_id)
            .await?;

        tracing::info!(
            profile_id = %account.profile_id,
            session_version = version,
            "Sessions ended"
        );
        Ok(())
    }
}
