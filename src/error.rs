//! API error type and its JSON rendering

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::{DbLockError, StorageError};
use crate::domain::QualityOutOfRange;
use crate::srs::SchedulerError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    /// Stored data breaks an invariant; the request itself was fine
    #[error("{0}")]
    InvalidState(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("authentication required")]
    Unauthorized,
    /// Logged in full, reported to the client generically
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidState(_) => "invalid_state",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "internal server error".to_string()
            }
            Self::InvalidState(detail) => {
                tracing::error!("Invalid stored state: {}", detail);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            kind: self.kind(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidInput(msg) => Self::InvalidInput(msg),
            SchedulerError::InvalidState(violation) => Self::InvalidState(violation.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound("record"),
            StorageError::Conflict => {
                Self::Conflict("record was modified concurrently, retry the request".to_string())
            }
            StorageError::InvalidSchedule(violation) => Self::InvalidState(violation.to_string()),
            StorageError::Sqlite(e) => Self::internal(e),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        Self::internal(err)
    }
}

impl From<DbLockError> for AppError {
    fn from(err: DbLockError) -> Self {
        Self::internal(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<QualityOutOfRange> for AppError {
    fn from(err: QualityOutOfRange) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}
