use axum::{extract::State, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::models::{AccountKind, CredentialsInput, SessionAccount};
use common::validation::validate_credentials;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::{AnyAccount, GroupAccount, MusicianAccount};
use crate::state::AppState;

async fn signup(
    state: &AppState,
    kind: AccountKind,
    req: CredentialsInput,
) -> Result<Response, ErrorResponse> {
    validate_credentials(&req)?;

    let credentials = state
        .credentials
        .signup(kind, req.username.trim(), &req.password)
        .await?;

    Ok(created(SessionAccount::from(credentials)))
}

/// Register a musician account
#[tracing::instrument(skip(state, req))]
pub async fn signup_musician(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsInput>,
) -> Result<Response, ErrorResponse> {
    signup(&state, AccountKind::Musician, req).await
}

/// Register a group account
#[tracing::instrument(skip(state, req))]
pub async fn signup_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsInput>,
) -> Result<Response, ErrorResponse> {
    signup(&state, AccountKind::Group, req).await
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(state.sessions.ttl().num_seconds());

    Cookie::build((state.config.auth.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(state.config.auth.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn removal_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((state.config.auth.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .build()
}

async fn login(
    state: &AppState,
    jar: CookieJar,
    kind: AccountKind,
    req: CredentialsInput,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    validate_credentials(&req)?;

    let credentials = state
        .credentials
        .authenticate(kind, req.username.trim(), &req.password)
        .await?;

    let session_version = credentials.session_version;
    let account = SessionAccount::from(credentials);
    let token = state.sessions.issue(&account, session_version)?;
    let jar = jar.add(session_cookie(state, token));

    Ok((jar, SuccessResponse::new(account)))
}

/// Log in as a musician and receive the session cookie
#[tracing::instrument(skip(state, jar, req))]
pub async fn login_musician(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsInput>,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    login(&state, jar, AccountKind::Musician, req).await
}

/// Log in as a group and receive the session cookie
#[tracing::instrument(skip(state, jar, req))]
pub async fn login_group(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsInput>,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    login(&state, jar, AccountKind::Group, req).await
}

/// Server-side logout: the token in the cookie stops resolving even if replayed
async fn logout(
    state: &AppState,
    jar: CookieJar,
    account: SessionAccount,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    state.credentials.end_sessions(&account).await?;

    tracing::info!(profile_id = %account.profile_id, kind = %account.kind, "Account logged out");
    Ok((jar.remove(removal_cookie(state)), SuccessResponse::new(account)))
}

#[tracing::instrument(skip(state, jar))]
pub async fn logout_musician(
    State(state): State<AppState>,
    jar: CookieJar,
    MusicianAccount(account): MusicianAccount,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    logout(&state, jar, account).await
}

#[tracing::instrument(skip(state, jar))]
pub async fn logout_group(
    State(state): State<AppState>,
    jar: CookieJar,
    GroupAccount(account): GroupAccount,
) -> Result<(CookieJar, SuccessResponse<SessionAccount>), ErrorResponse> {
    logout(&state, jar, account).await
}

/// The account behind the current session
#[tracing::instrument]
pub async fn current_session(AnyAccount(account): AnyAccount) -> SuccessResponse<SessionAccount> {
    SuccessResponse::new(account)
}
