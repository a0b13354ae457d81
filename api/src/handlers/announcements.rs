use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use common::db::repositories::{AnnouncementFilter, AnnouncementRepository};
use common::models::{Announcement, AnnouncementInput, AnnouncementUpdate, SessionAccount};
use common::validation::{validate_announcement, validate_announcement_update};
use uuid::Uuid;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::AnyAccount;
use crate::state::AppState;

const ENTITY: &str = "Announcement";
const ID_FIELD: &str = "announcementId";

/// Load an announcement the caller is about to change and check they wrote it
async fn load_owned(
    repo: &AnnouncementRepository,
    account: &SessionAccount,
    id: Uuid,
) -> Result<Announcement, ErrorResponse> {
    let announcement = repo
        .find_by_id(id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading announcement", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, id))?;

    if !account.owns(announcement.author_id) {
        tracing::warn!(
            announcement_id = %id,
            caller = %account.profile_id,
            "Rejected change to another profile's announcement"
        );
        return Err(ErrorResponse::unauthorized(
            "You can only modify your own announcements",
        ));
    }

    Ok(announcement)
}

/// List announcements, newest first
#[tracing::instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
    Query(filter): Query<AnnouncementFilter>,
) -> Result<SuccessResponse<Vec<Announcement>>, ErrorResponse> {
    let repo = AnnouncementRepository::new(state.db_pool.clone());

    let announcements = repo
        .find_all(&filter)
        .await
        .map_err(|e| ErrorResponse::internal("Listing announcements", e))?;

    Ok(SuccessResponse::new(announcements))
}

#[tracing::instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<Announcement>, ErrorResponse> {
    let repo = AnnouncementRepository::new(state.db_pool.clone());

    let announcement = repo
        .find_by_id(id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading announcement", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, id))?;

    Ok(SuccessResponse::new(announcement))
}

/// Publish an announcement as the logged-in profile
#[tracing::instrument(skip(state, req))]
pub async fn create_announcement(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    ApiJson(req): ApiJson<AnnouncementInput>,
) -> Result<Response, ErrorResponse> {
    validate_announcement(&req)?;

    let repo = AnnouncementRepository::new(state.db_pool.clone());

    let announcement = repo
        .create(&account, &req)
        .await
        .map_err(|e| ErrorResponse::internal("Creating announcement", e))?;

    Ok(created(announcement))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_announcement(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<AnnouncementUpdate>,
) -> Result<SuccessResponse<Announcement>, ErrorResponse> {
    validate_announcement_update(&req)?;

    let repo = AnnouncementRepository::new(state.db_pool.clone());
    load_owned(&repo, &account, id).await?;

    let announcement = repo
        .update(id, &req)
        .await
        .map_err(|e| {
            ErrorResponse::from_row_lookup("Updating announcement", e, ENTITY, ID_FIELD, id)
        })?;

    Ok(SuccessResponse::new(announcement))
}

#[tracing::instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<Announcement>, ErrorResponse> {
    let repo = AnnouncementRepository::new(state.db_pool.clone());
    load_owned(&repo, &account, id).await?;

    let announcement = repo
        .delete(id)
        .await
        .map_err(|e| {
            ErrorResponse::from_row_lookup("Deleting announcement", e, ENTITY, ID_FIELD, id)
        })?;

    Ok(SuccessResponse::new(announcement))
}
