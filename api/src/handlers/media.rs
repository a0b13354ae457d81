use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    http::StatusCode,
    response::Response,
};
use common::errors::MediaError;
use common::media::MediaCategory;
use common::models::SessionAccount;
use common::telemetry;
use serde::Serialize;

use crate::handlers::{created, ErrorResponse};
use crate::middleware::AnyAccount;
use crate::state::AppState;

/// Multipart field that carries the uploaded file
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
}

struct UploadedFile {
    content_type: String,
    file_name: String,
    bytes: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> ErrorResponse {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorResponse::new("payload_too_large", err.body_text())
    } else {
        ErrorResponse::new("bad_request", err.body_text())
    }
}

/// Pull the `file` field out of a multipart body
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, ErrorResponse> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Upload is not a multipart body");
        ErrorResponse::from(MediaError::MissingFile)
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            break;
        }

        return Ok(UploadedFile {
            content_type,
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(MediaError::MissingFile.into())
}

fn rejected(category: MediaCategory, err: MediaError) -> ErrorResponse {
    let reason = match &err {
        MediaError::UnsupportedMediaType(_) => "unsupported_media_type",
        MediaError::MissingFile => "missing_file",
        MediaError::Io(_) => "io",
    };
    telemetry::record_media_rejected(category.dir_name(), reason);
    err.into()
}

async fn store(
    state: &AppState,
    account: &SessionAccount,
    category: MediaCategory,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ErrorResponse> {
    let upload = match read_file_field(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            telemetry::record_media_rejected(category.dir_name(), &e.error);
            return Err(e);
        }
    };

    let stored = match category {
        MediaCategory::Images => {
            state
                .media
                .store_image(account, &upload.content_type, &upload.bytes)
                .await
        }
        MediaCategory::Demos => {
            state
                .media
                .store_demo(
                    account,
                    &upload.content_type,
                    &upload.file_name,
                    &upload.bytes,
                )
                .await
        }
    };

    let file_path = stored.map_err(|e| rejected(category, e))?;

    telemetry::record_media_upload(category.dir_name());
    tracing::info!(
        profile_id = %account.profile_id,
        file_path = %file_path,
        "Upload stored"
    );

    Ok(created(UploadResponse { file_path }))
}

/// Upload a profile picture
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ErrorResponse> {
    store(&state, &account, MediaCategory::Images, multipart).await
}

/// Upload an audio demo; its path is then published through the demos API
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_demo(
    State(state): State<AppState>,
    AnyAccount(account): AnyAccount,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ErrorResponse> {
    store(&state, &account, MediaCategory::Demos, multipart).await
}
