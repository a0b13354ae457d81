use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use common::db::repositories::{MusicianFilter, MusicianRepository};
use common::errors::DatabaseError;
use common::models::{Musician, MusicianInput, SessionAccount};
use common::validation::validate_musician;
use uuid::Uuid;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::MusicianAccount;
use crate::state::AppState;

const ENTITY: &str = "Musician";
const ID_FIELD: &str = "profileId";

/// Only the account a profile belongs to may change it
fn ensure_owner(account: &SessionAccount, profile_id: Uuid) -> Result<(), ErrorResponse> {
    if account.owns(profile_id) {
        Ok(())
    } else {
        tracing::warn!(
            profile_id = %profile_id,
            caller = %account.profile_id,
            "Rejected change to another musician's profile"
        );
        Err(ErrorResponse::unauthorized(
            "You can only modify your own Musician profile",
        ))
    }
}

/// List musicians, optionally filtered
#[tracing::instrument(skip(state))]
pub async fn list_musicians(
    State(state): State<AppState>,
    Query(filter): Query<MusicianFilter>,
) -> Result<SuccessResponse<Vec<Musician>>, ErrorResponse> {
    let repo = MusicianRepository::new(state.db_pool.clone());

    let musicians = repo
        .find_all(&filter)
        .await
        .map_err(|e| ErrorResponse::internal("Listing musicians", e))?;

    Ok(SuccessResponse::new(musicians))
}

#[tracing::instrument(skip(state))]
pub async fn get_musician(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<SuccessResponse<Musician>, ErrorResponse> {
    let repo = MusicianRepository::new(state.db_pool.clone());

    let musician = repo
        .find_by_id(profile_id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading musician", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id))?;

    Ok(SuccessResponse::new(musician))
}

/// Create the caller's own profile
#[tracing::instrument(skip(state, req))]
pub async fn create_musician(
    State(state): State<AppState>,
    MusicianAccount(account): MusicianAccount,
    ApiJson(req): ApiJson<MusicianInput>,
) -> Result<Response, ErrorResponse> {
    validate_musician(&req, &account)?;

    let repo = MusicianRepository::new(state.db_pool.clone());

    let musician = repo
        .create(account.profile_id, &req)
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicateKey(_) => ErrorResponse::new(
                "conflict",
                format!(
                    "A Musician with profileId ({}) already exists",
                    account.profile_id
                ),
            ),
            other => ErrorResponse::internal("Creating musician", other),
        })?;

    Ok(created(musician))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_musician(
    State(state): State<AppState>,
    MusicianAccount(account): MusicianAccount,
    Path(profile_id): Path<Uuid>,
    ApiJson(req): ApiJson<MusicianInput>,
) -> Result<SuccessResponse<Musician>, ErrorResponse> {
    ensure_owner(&account, profile_id)?;
    validate_musician(&req, &account)?;

    let repo = MusicianRepository::new(state.db_pool.clone());

    let musician = repo.update(profile_id, &req).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id),
        other => ErrorResponse::internal("Updating musician", other),
    })?;

    Ok(SuccessResponse::new(musician))
}

#[tracing::instrument(skip(state))]
pub async fn delete_musician(
    State(state): State<AppState>,
    MusicianAccount(account): MusicianAccount,
    Path(profile_id): Path<Uuid>,
) -> Result<SuccessResponse<Musician>, ErrorResponse> {
    ensure_owner(&account, profile_id)?;

    let repo = MusicianRepository::new(state.db_pool.clone());

    let musician = repo.delete(profile_id).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id),
        other => ErrorResponse::internal("Deleting musician", other),
    })?;

    Ok(SuccessResponse::new(musician))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::AccountKind;

    #[test]
    fn test_ensure_owner() {
        let account = SessionAccount {
            profile_id: Uuid::new_v4(),
            username: "violinist".to_string(),
            kind: AccountKind::Musician,
        };
        assert!(ensure_owner(&account, account.profile_id).is_ok());
        let err = ensure_owner(&account, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.error, "unauthorized");
    }
}
