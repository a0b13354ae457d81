use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use common::db::repositories::{GroupFilter, GroupRepository};
use common::errors::DatabaseError;
use common::models::{Group, GroupInput, SessionAccount};
use common::validation::validate_group;
use uuid::Uuid;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::GroupAccount;
use crate::state::AppState;

const ENTITY: &str = "Group";
const ID_FIELD: &str = "profileId";

fn ensure_owner(account: &SessionAccount, profile_id: Uuid) -> Result<(), ErrorResponse> {
    if account.owns(profile_id) {
        Ok(())
    } else {
        tracing::warn!(
            profile_id = %profile_id,
            caller = %account.profile_id,
            "Rejected change to another group's profile"
        );
        Err(ErrorResponse::unauthorized(
            "You can only modify your own Group profile",
        ))
    }
}

/// List groups, optionally filtered
#[tracing::instrument(skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
    Query(filter): Query<GroupFilter>,
) -> Result<SuccessResponse<Vec<Group>>, ErrorResponse> {
    let repo = GroupRepository::new(state.db_pool.clone());

    let groups = repo
        .find_all(&filter)
        .await
        .map_err(|e| ErrorResponse::internal("Listing groups", e))?;

    Ok(SuccessResponse::new(groups))
}

#[tracing::instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<SuccessResponse<Group>, ErrorResponse> {
    let repo = GroupRepository::new(state.db_pool.clone());

    let group = repo
        .find_by_id(profile_id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading group", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id))?;

    Ok(SuccessResponse::new(group))
}

/// Create the caller's own profile
#[tracing::instrument(skip(state, req))]
pub async fn create_group(
    State(state): State<AppState>,
    GroupAccount(account): GroupAccount,
    ApiJson(req): ApiJson<GroupInput>,
) -> Result<Response, ErrorResponse> {
    validate_group(&req, &account)?;

    let repo = GroupRepository::new(state.db_pool.clone());

    let group = repo
        .create(account.profile_id, &req)
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicateKey(_) => ErrorResponse::new(
                "conflict",
                format!(
                    "A Group with profileId ({}) already exists",
                    account.profile_id
                ),
            ),
            other => ErrorResponse::internal("Creating group", other),
        })?;

    Ok(created(group))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_group(
    State(state): State<AppState>,
    GroupAccount(account): GroupAccount,
    Path(profile_id): Path<Uuid>,
    ApiJson(req): ApiJson<GroupInput>,
) -> Result<SuccessResponse<Group>, ErrorResponse> {
    ensure_owner(&account, profile_id)?;
    validate_group(&req, &account)?;

    let repo = GroupRepository::new(state.db_pool.clone());

    let group = repo.update(profile_id, &req).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id),
        other => ErrorResponse::internal("Updating group", other),
    })?;

    Ok(SuccessResponse::new(group))
}

#[tracing::instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    GroupAccount(account): GroupAccount,
    Path(profile_id): Path<Uuid>,
) -> Result<SuccessResponse<Group>, ErrorResponse> {
    ensure_owner(&account, profile_id)?;

    let repo = GroupRepository::new(state.db_pool.clone());

    let group = repo.delete(profile_id).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ErrorResponse::not_found(ENTITY, ID_FIELD, profile_id),
        other => ErrorResponse::internal("Deleting group", other),
    })?;

    Ok(SuccessResponse::new(group))
}
