pub mod announcements;
pub mod demos;
pub mod groups;
pub mod health;
pub mod login;
pub mod media;
pub mod membership_requests;
pub mod metrics;
pub mod musicians;

// Common response types
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::{AuthError, DatabaseError, MediaError, ValidationError};
use serde::Serialize;
use std::fmt::Display;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Login form field a credential error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            field: None,
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Log the underlying failure and answer with a generic message
    pub fn internal(context: &str, err: impl Display) -> Self {
        let response = Self::new("internal_error", format!("{} failed", context));
        tracing::error!(error = %err, trace_id = %response.trace_id, "{} failed", context);
        response
    }

    /// Read, update and delete of a missing row answer 200 with this body
    pub fn not_found(entity: &str, id_field: &str, id: impl Display) -> Self {
        Self::new(
            "not_found",
            format!("No {} with {} ({}) found", entity, id_field, id),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    /// Map a repository error; `context` names the operation for the log
    pub fn from_database(context: &str, err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateKey(_) => {
                Self::new("conflict", format!("{}: record already exists", context))
            }
            other => Self::internal(context, other),
        }
    }

    /// Like `from_database`, for a row addressed by id that may have vanished
    pub fn from_row_lookup(
        context: &str,
        err: DatabaseError,
        entity: &str,
        id_field: &str,
        id: impl Display,
    ) -> Self {
        match err {
            DatabaseError::NotFound(_) => Self::not_found(entity, id_field, id),
            other => Self::from_database(context, other),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "unauthorized" => StatusCode::UNAUTHORIZED,
            // Kept at 200 for the existing front end, which reads the message
            "not_found" => StatusCode::OK,
            "bad_request" => StatusCode::BAD_REQUEST,
            "validation_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "conflict" => StatusCode::CONFLICT,
            "unsupported_media_type" => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        let details = serde_json::to_value(err.errors()).unwrap_or(serde_json::Value::Null);
        ErrorResponse::new("validation_error", err.to_string()).with_details(details)
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownUser | AuthError::WrongPassword => {
                let field = err.field().unwrap_or("username");
                ErrorResponse::unauthorized(err.to_string()).with_field(field)
            }
            AuthError::DuplicateUsername(_) => {
                ErrorResponse::new("conflict", err.to_string()).with_field("username")
            }
            AuthError::InvalidSession(_) | AuthError::SessionExpired => {
                ErrorResponse::unauthorized(err.to_string())
            }
            AuthError::Hashing(_) | AuthError::Database(_) => {
                ErrorResponse::internal("Authentication", err)
            }
        }
    }
}

impl From<MediaError> for ErrorResponse {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedMediaType(message) => {
                ErrorResponse::new("unsupported_media_type", message)
            }
            MediaError::MissingFile => ErrorResponse::new("bad_request", err.to_string()),
            MediaError::Io(_) => ErrorResponse::internal("Storing upload", err),
        }
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Wrap a freshly created resource as `201 Created`
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(SuccessResponse::new(data))).into_response()
}

/// JSON body extractor whose rejections use the API error shape
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                let error = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
                    _ => "validation_error",
                };
                Err(ErrorResponse::new(error, rejection.body_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::errors::FieldError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            ("unauthorized", StatusCode::UNAUTHORIZED),
            ("not_found", StatusCode::OK),
            ("validation_error", StatusCode::UNPROCESSABLE_ENTITY),
            ("conflict", StatusCode::CONFLICT),
            ("unsupported_media_type", StatusCode::UNSUPPORTED_MEDIA_TYPE),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ErrorResponse::new(error, "x").into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        let response = ErrorResponse::not_found("Musician", "profileId", "abc");
        assert_eq!(response.message, "No Musician with profileId (abc) found");
    }

    #[test]
    fn test_validation_error_carries_details() {
        let response: ErrorResponse = ValidationError(vec![FieldError::new(
            "password",
            "password must be at least 6 characters long",
        )])
        .into();
        assert_eq!(response.error, "validation_error");
        let details = response.details.unwrap();
        assert_eq!(details[0]["field"], "password");
    }

    #[test]
    fn test_login_errors_name_the_field() {
        let response: ErrorResponse = AuthError::WrongPassword.into();
        assert_eq!(response.error, "unauthorized");
        assert_eq!(response.field.as_deref(), Some("password"));
        assert_eq!(response.message, "Incorrect password");
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let response = ErrorResponse::internal("Loading musician", "connection refused");
        assert!(!response.message.contains("connection refused"));
    }

    #[test]
    fn test_duplicate_key_is_conflict() {
        let response = ErrorResponse::from_database(
            "Creating profile",
            DatabaseError::DuplicateKey("musicians_pkey".to_string()),
        );
        assert_eq!(response.error, "conflict");
    }
}
