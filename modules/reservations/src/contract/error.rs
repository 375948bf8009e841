use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum ReservationsError {
    #[error("Not found: {id}")]
    NotFound { id: Uuid },

    #[error("This time slot is already taken")]
    SlotTaken,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not authorized")]
    Forbidden,

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Internal error")]
    Internal,
}

impl ReservationsError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn slot_taken() -> Self {
        Self::SlotTaken
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for ReservationsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            InvalidInterval => Self::validation("End time must be after start time"),
            PastStart => Self::validation("Start time cannot be in the past"),
            PastEnd => Self::validation("End time cannot be in the past"),
            SlotTaken { .. } => Self::slot_taken(),
            Forbidden => Self::forbidden(),
            InvalidCredentials => Self::unauthorized(),
            RoomNotFound { id } | ReservationNotFound { id } | UserNotFound { id } => {
                Self::not_found(id)
            }
            UsernameTaken { username } => {
                Self::validation(format!("Username '{}' already exists", username))
            }
            InvalidCapacity { capacity } => {
                Self::validation(format!("Capacity must be positive: {}", capacity))
            }
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            Notification { .. } | Database { .. } => Self::internal(),
        }
    }
}
