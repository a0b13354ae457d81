use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use common::db::repositories::DemoRepository;
use common::errors::{DatabaseError, FieldError, ValidationError};
use common::models::{AccountKind, DemoFile, DemoInput, DemoUpdate, SessionAccount};
use common::validation::{validate_demo, validate_demo_update};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{created, ApiJson, ErrorResponse, SuccessResponse};
use crate::middleware::AnyAccount;
use crate::state::AppState;

const ENTITY: &str = "Demo";
const ID_FIELD: &str = "demoId";

/// Demos are always listed per profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoListQuery {
    pub author_id: Option<Uuid>,
    #[serde(rename = "authorType")]
    pub author_kind: Option<AccountKind>,
}

impl DemoListQuery {
    fn author(&self) -> Result<(Uuid, AccountKind), ValidationError> {
        match (self.author_id, self.author_kind) {
            (Some(author_id), Some(author_kind)) => Ok((author_id, author_kind)),
            (author_id, author_kind) => {
                let mut errors = Vec::new();
                if author_id.is_none() {
                    errors.push(FieldError::new("authorId", "authorId is required"));
                }
                if author_kind.is_none() {
                    errors.push(FieldError::new(
                        "authorType",
                        "authorType must be MUSICIAN or GROUP",
                    ));
                }
                Err(ValidationError(errors))
            }
        }
    }
}

async fn load_owned(
    repo: &DemoRepository,
    account: &SessionAccount,
    id: Uuid,
) -> Result<DemoFile, ErrorResponse> {
    let demo = repo
        .find_by_id(id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading demo", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, id))?;

    if !account.owns(demo.author_id) {
        tracing::warn!(demo_id = %id, caller = %account.profile_id, "Rejected change to another profile's demo");
        return Err(ErrorResponse::unauthorized("You can only modify your own demos"));
    }

    Ok(demo)
}

/// Demos of one profile
#[tracing::instrument(skip(state))]
pub async fn list_demos(
    State(state): State<AppState>,
    Query(query): Query<DemoListQuery>,
) -> Result<SuccessResponse<Vec<DemoFile>>, ErrorResponse> {
    let (author_id, author_kind) = query.author()?;
    let repo = DemoRepository::new(state.db_pool.clone());

    let demos = repo
        .find_by_author(author_id, author_kind)
        .await
        .map_err(|e| ErrorResponse::internal("Listing demos", e))?;

    Ok(SuccessResponse::new(demos))
}

#[tracing::instrument(skip(state))]
pub async fn get_demo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<DemoFile>, ErrorResponse> {
    let repo = DemoRepository::new(state.db_pool.clone());

    let demo = repo
        .find_by_id(id)
        .await
        .map_err(|e| ErrorResponse::internal("Loading demo", e))?
        .ok_or_else(|| ErrorResponse::not_found(ENTITY, ID_FIELD, id))?;

    Ok(SuccessResponse::new(demo))
}

/// Publish metadata for a file previously sent to the demo upload endpoint
#[tracing::instrument(skip(state, req))]
pub async fn create_demo(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    ApiJson(req): ApiJson<DemoInput>,
) -> Result<Response, ErrorResponse> {
    validate_demo(&req, &account)?;

    let uploaded = state
        .media
        .exists(&req.file_path)
        .await
        .map_err(|e| ErrorResponse::internal("Checking demo file", e))?;
    if !uploaded {
        return Err(ValidationError::single(
            "filePath",
            "filePath must reference an uploaded file",
        )
        .into());
    }

    let repo = DemoRepository::new(state.db_pool.clone());

    // One demo per stored file; deleting a demo deletes its file
    let demo = repo
        .create(&account, &req)
        .await
        .map_err(|e| match e {
            DatabaseError::DuplicateKey(_) => ErrorResponse::new(
                "conflict",
                format!("The file {} is already published as a demo", req.file_path),
            )
            .with_field("filePath"),
            other => ErrorResponse::internal("Creating demo", other),
        })?;

    Ok(created(demo))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_demo(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<DemoUpdate>,
) -> Result<SuccessResponse<DemoFile>, ErrorResponse> {
    validate_demo_update(&req)?;

    let repo = DemoRepository::new(state.db_pool.clone());
    load_owned(&repo, &account, id).await?;

    let demo = repo
        .update(id, &req)
        .await
        .map_err(|e| ErrorResponse::from_row_lookup("Updating demo", e, ENTITY, ID_FIELD, id))?;

    Ok(SuccessResponse::new(demo))
}

/// Delete a demo together with its stored file
#[tracing::instrument(skip(state))]
pub async fn delete_demo(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    Path(id): Path<Uuid>,
) -> Result<SuccessResponse<DemoFile>, ErrorResponse> {
    let repo = DemoRepository::new(state.db_pool.clone());
    load_owned(&repo, &account, id).await?;

    let demo = repo
        .delete(id)
        .await
        .map_err(|e| ErrorResponse::from_row_lookup("Deleting demo", e, ENTITY, ID_FIELD, id))?;

    // File removal failures are logged, not returned
    if let Err(e) = state.media.remove(&demo.file_path).await {
        tracing::warn!(error = %e, file_path = %demo.file_path, "Failed to remove demo file");
    }

    Ok(SuccessResponse::new(demo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_requires_both_parameters() {
        let query = DemoListQuery {
            author_id: Some(Uuid::new_v4()),
            author_kind: None,
        };
        let err = query.author().unwrap_err();
        assert!(err.has_field("authorType"));
        assert!(!err.has_field("authorId"));

        let query = DemoListQuery {
            author_id: Some(Uuid::new_v4()),
            author_kind: Some(AccountKind::Musician),
        };
        assert!(query.author().is_ok());
    }
}
