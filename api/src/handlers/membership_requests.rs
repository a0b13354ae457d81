use axum::{
    extract::{Path, State},
    response::Response,
};
use common::db::repositories::{GroupRepository, MembershipRequestRepository};
use common::errors::{DatabaseError, ValidationError};
use common::models::{AccountKind, MembershipRequest, MembershipRequestInput, SessionAccount};
use common::validation::validate_membership_request;
use uuid::Uuid;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::{AnyAccount, MusicianAccount};
use crate::state::AppState;

const ENTITY: &str = "MembershipRequest";
const ID_FIELD: &str = "requestId";

/// Load a request and check the caller sent or received it
async fn load_involving(
    repo: &MembershipRequestRepository,
    account: &SessionAccount,
    id: Uuid,
) -> Result<MembershipRequest, ErrorResponse> {
    let request = repo
        .find_by_id(id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading membership request", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, id))?;

    if !request.involves(account) {
        tracing::warn!(
            request_id = %id,
            caller = %account.profile_id,
            "Rejected access to a membership request of other profiles"
        );
        return Err(ErrorResponse::unauthorized(
            "You can only access membership requests you sent or received",
        ));
    }

    Ok(request)
}

/// Musicians see the requests they sent, groups the ones they received
#[tracing::instrument(skip(state))]
pub async fn list_membership_requests(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
) -> Result<SuccessResponse<Vec<MembershipRequest>>, ErrorResponse> {
    let repo = MembershipRequestRepository::new(state.db_pool.clone());

    let requests = match account.kind {
        AccountKind::Musician => repo.find_by_musician(account.profile_id).await,
        AccountKind::Group => repo.find_by_group(account.profile_id).await,
    }
    .map_err(|e| ErrorResponse::internal("Listing membership requests", e))?;

    Ok(SuccessResponse::new(requests))
}

#[tracing::instrument(skip(state))]
pub async fn get_membership_request(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<MembershipRequest>, ErrorResponse> {
    let repo = MembershipRequestRepository::new(state.db_pool.clone());
    let request = load_involving(&repo, &account, id).await?;

    Ok(SuccessResponse::new(request))
}

/// Apply to join a group
#[tracing::instrument(skip(state, req))]
pub async fn create_membership_request(
    State(state): State<AppState>,
    MusicianAccount(account): MusicianAccount,
    ApiJson(req): ApiJson<MembershipRequestInput>,
) -> Result<Response, ErrorResponse> {
    validate_membership_request(&req)?;

    let groups = GroupRepository::new(state.db_pool.clone());
    let group_exists = groups
        .find_by_id(req.group_id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading group", e))?
        .is_some();

    if !group_exists {
        return Err(ValidationError::single(
            "groupId",
            format!("No Group with profileId ({}) found", req.group_id),
        )
        .into());
    }

    let repo = MembershipRequestRepository::new(state.db_pool.clone());

    let request = repo
        .create(account.profile_id, &req)
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicateKey(_) => ErrorResponse::new(
                "conflict",
                format!(
                    "A membership request to Group ({}) was already sent",
                    req.group_id
                ),
            ),
            other => ErrorResponse::internal("Creating membership request", other),
        })?;

    Ok(created(request))
}

/// Withdraw (sender) or decline (recipient) a request
#[tracing::instrument(skip(state))]
pub async fn delete_membership_request(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<MembershipRequest>, ErrorResponse> {
    let repo = MembershipRequestRepository::new(state.db_pool.clone());
    load_involving(&repo, &account, id).await?;

    let request = repo.delete(id).await.map_err(|e| {
        ErrorResponse::from_row_lookup("Deleting membership request", e, ENTITY, ID_FIELD, id)
    })?;

    Ok(SuccessResponse::new(request))
}
