use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Pure room model for inter-module communication (no serde/schemars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub location: String,
}

/// Data for creating a new room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub capacity: i32,
    pub location: String,
}

/// Partial update data for a room
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

/// A committed reservation of a room for a half-open time range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A candidate reservation as supplied by a caller.
///
/// `user_id` is the caller-requested owner; whether it is honored depends on
/// the acting principal's privilege.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub room_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub user_id: Option<Uuid>,
}

/// Partial update data for a reservation. Absent fields keep their current
/// values; the resulting full interval is re-validated on submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReservationPatch {
    pub room_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
}

/// User account visible to other modules (never carries the password digest)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// Partial update data for a user account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserAccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// The authenticated identity acting in a request, passed explicitly into
/// every domain call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Principal {
    /// True when the principal owns the given record or holds elevated privilege.
    pub fn can_manage(&self, owner: Uuid) -> bool {
        self.is_admin || self.user_id == owner
    }
}
