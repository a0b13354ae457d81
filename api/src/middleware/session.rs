use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use common::models::{AccountKind, SessionAccount};
use serde_json::json;

use crate::state::AppState;

/// Resolve the session cookie into a `SessionAccount` request extension
///
/// Requests without a valid session pass through untouched; the guard
/// extractors below decide whether a handler needs one.
#[tracing::instrument(skip_all)]
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    if let Some(cookie) = jar.get(&state.config.auth.cookie_name) {
        match state.sessions.validate(cookie.value()) {
            Ok(claims) => match state.credentials.resolve(&claims).await {
                Ok(account) => {
                    tracing::debug!(
                        profile_id = %account.profile_id,
                        kind = %account.kind,
                        "Session resolved"
                    );
                    req.extensions_mut().insert(account);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session does not resolve to an account");
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
            }
        }
    }

    next.run(req).await
}

/// 401 body sent when a guard rejects a request
fn not_authenticated(expected: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "statusCode": 401,
            "message": format!("not authenticated as a valid {}", expected)
        })),
    )
        .into_response()
}

fn session_account(parts: &Parts) -> Option<SessionAccount> {
    parts.extensions.get::<SessionAccount>().cloned()
}

/// Handler guard: the caller is logged in as a musician
#[derive(Debug, Clone)]
pub struct MusicianAccount(pub SessionAccount);

#[async_trait]
impl<S> FromRequestParts<S> for MusicianAccount
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_account(parts) {
            Some(account) if account.kind == AccountKind::Musician => Ok(Self(account)),
            _ => Err(not_authenticated("Musician")),
        }
    }
}

/// Handler guard: the caller is logged in as a group
#[derive(Debug, Clone)]
pub struct GroupAccount(pub SessionAccount);

#[async_trait]
impl<S> FromRequestParts<S> for GroupAccount
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_account(parts) {
            Some(account) if account.kind == AccountKind::Group => Ok(Self(account)),
            _ => Err(not_authenticated("Group")),
        }
    }
}

/// Handler guard: the caller is logged in with either account kind
#[derive(Debug, Clone)]
pub struct AnyAccount(pub SessionAccount);

#[async_trait]
impl<S> FromRequestParts<S> for AnyAccount
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_account(parts)
            .map(Self)
            .ok_or_else(|| not_authenticated("Group or a valid Musician"))
    }
}
