use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("End time must be after start time")]
    InvalidInterval,

    #[error("Start time cannot be in the past")]
    PastStart,

    #[error("End time cannot be in the past")]
    PastEnd,

    #[error("This time slot is already taken")]
    SlotTaken { room_id: Uuid },

    #[error("Not authorized")]
    Forbidden,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Room not found: {id}")]
    RoomNotFound { id: Uuid },

    #[error("Reservation not found: {id}")]
    ReservationNotFound { id: Uuid },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("User with username '{username}' already exists")]
    UsernameTaken { username: String },

    #[error("Capacity must be positive: {capacity}")]
    InvalidCapacity { capacity: i32 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Notification delivery failed: {message}")]
    Notification { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn slot_taken(room_id: Uuid) -> Self {
        Self::SlotTaken { room_id }
    }

    pub fn room_not_found(id: Uuid) -> Self {
        Self::RoomNotFound { id }
    }

    pub fn reservation_not_found(id: Uuid) -> Self {
        Self::ReservationNotFound { id }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    pub fn invalid_capacity(capacity: i32) -> Self {
        Self::InvalidCapacity { capacity }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
