//! Central error-to-response mapping.
//!
//! Domain errors from the repositories and the storage layer convert into
//! one JSON error shape. Nothing below the route boundary ever reaches the
//! client raw; unexpected failures are logged and collapse into generic
//! 5xx responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use pinboard_core::auth::PasswordError;
use pinboard_core::storage::StorageError;
use pinboard_db::repositories::{CollectionError, SaveError, UserError};
use pinboard_shared::AppError;

/// An API-facing error: status, machine-readable code, human message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 401 with a `unauthorized` code.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    /// 403 with a `forbidden` code.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// 404 with a `not_found` code.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 400 with a `validation_error` code.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// 500 with an `internal_error` code.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// 503 for a disabled or unreachable upload backend.
    #[must_use]
    pub fn uploads_disabled() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "uploads_disabled",
            "File uploads are temporarily disabled. Please check back later.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "request failed");
        }

        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match &err {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database_error",
            AppError::ExternalService(_) => "service_unavailable",
            AppError::Internal(_) => "internal_error",
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "database_error",
            err.to_string(),
        )
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UsernameTaken => Self::new(
                StatusCode::CONFLICT,
                "username_taken",
                "Username already taken",
            ),
            UserError::EmailTaken => Self::new(
                StatusCode::CONFLICT,
                "email_registered",
                "Email already registered",
            ),
            UserError::Database(e) => e.into(),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::PostNotFound(id) => Self::not_found(format!("Post {id} not found")),
            SaveError::CollectionNotFound(id) => {
                Self::not_found(format!("Collection {id} not found"))
            }
            SaveError::NotOwner => Self::forbidden("Unauthorized"),
            // public API contract: duplicate saves answer 400, not 409
            SaveError::AlreadySaved => Self::new(
                StatusCode::BAD_REQUEST,
                "already_saved",
                "Post already saved to this collection",
            ),
            SaveError::NotSaved => Self::new(
                StatusCode::NOT_FOUND,
                "not_saved",
                "Post not saved to specified collection",
            ),
            SaveError::Database(e) => e.into(),
        }
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound(id) => Self::not_found(format!("Collection {id} not found")),
            CollectionError::NameTaken(name) => Self::new(
                StatusCode::CONFLICT,
                "collection_name_taken",
                format!("You already have a collection named '{name}'"),
            ),
            CollectionError::Database(e) => e.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unconfigured(_) => Self::uploads_disabled(),
            StorageError::DisallowedType { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "file_type_not_allowed",
                "File type not allowed",
            ),
            StorageError::FileTooLarge { size, max } => Self::new(
                StatusCode::BAD_REQUEST,
                "file_too_large",
                format!("File of {size} bytes exceeds the {max} byte limit"),
            ),
            StorageError::NotFound { key } => Self::not_found(format!("Stored file {key} not found")),
            StorageError::Timeout { .. }
            | StorageError::TransportFailure(_)
            | StorageError::ProviderRejected(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
                "Storage service is currently unavailable",
            ),
            StorageError::InvalidReference(r) => {
                Self::internal(format!("invalid storage reference: {r}"))
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::validation(err.to_string()),
            PasswordError::HashError(_)
            | PasswordError::VerifyError(_)
            | PasswordError::InvalidHash => Self::internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation(err.to_string())
    }
}
