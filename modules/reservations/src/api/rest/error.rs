use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// JSON error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// REST-layer error: a domain error paired with its transport mapping.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Map domain errors to HTTP status codes with their user-facing messages
impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let status = match &error {
            DomainError::InvalidInterval
            | DomainError::PastStart
            | DomainError::PastEnd
            | DomainError::InvalidCapacity { .. }
            | DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::SlotTaken { .. } | DomainError::UsernameTaken { .. } => {
                StatusCode::CONFLICT
            }
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::RoomNotFound { .. }
            | DomainError::ReservationNotFound { .. }
            | DomainError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Notification { .. } | DomainError::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Store/sink internals stay out of responses.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal error".to_string()
        } else {
            error.to_string()
        };

        Self { status, message }
    }
}
