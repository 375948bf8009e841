use crate::contract::model::{Reservation, Room, UserAccount};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Result of a guarded reservation write. The store re-checks the overlap
/// rule inside the same transaction as the write, so two racing submits for
/// the same slot can never both commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Reservation),
    Overlap,
}

/// Port for the domain layer: reservation persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait ReservationsRepository: Send + Sync {
    /// Load a reservation by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>>;

    /// All reservations on `room_id` whose half-open interval intersects
    /// `[start, end)`. `exclude` removes a reservation from its own check
    /// on the edit path.
    async fn find_overlapping(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<Vec<Reservation>>;

    /// Insert `r` unless a conflicting reservation exists; check and write
    /// happen in one transaction.
    async fn insert_if_free(&self, r: Reservation) -> anyhow::Result<CommitOutcome>;

    /// Overwrite the record under `r.id` unless another reservation
    /// conflicts; check and write happen in one transaction.
    async fn update_if_free(&self, r: Reservation) -> anyhow::Result<CommitOutcome>;

    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn list_all(&self) -> anyhow::Result<Vec<Reservation>>;

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>>;

    /// The user's next reservations starting at or after `after`, soonest first.
    async fn list_upcoming_for_user(
        &self,
        user_id: Uuid,
        after: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<Reservation>>;

    /// A room's future reservations starting after `after`, soonest first.
    async fn list_upcoming_for_room(
        &self,
        room_id: Uuid,
        after: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reservation>>;
}

/// Port for the domain layer: room persistence.
#[async_trait]
pub trait RoomsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Room>>;
    async fn list(&self) -> anyhow::Result<Vec<Room>>;
    /// Insert a fully-formed room; service computes id and validation.
    async fn insert(&self, room: Room) -> anyhow::Result<()>;
    /// Update an existing room (by primary key in `room.id`).
    async fn update(&self, room: Room) -> anyhow::Result<()>;
    /// Delete by id, cascading the room's reservations. Returns true if a
    /// row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Port for the domain layer: user accounts and login sessions.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserAccount>>;

    /// Load an account together with its stored password digest.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<(UserAccount, String)>>;

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;

    async fn list(&self) -> anyhow::Result<Vec<UserAccount>>;

    /// Insert a fully-formed account; service computes id/digest/validation.
    async fn insert(&self, u: UserAccount, password_digest: String) -> anyhow::Result<()>;

    /// Update an account; `password_digest` only when the password changes.
    async fn update(&self, u: UserAccount, password_digest: Option<String>)
        -> anyhow::Result<()>;

    /// Delete by id, cascading sessions and reservations. Returns true if a
    /// row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Record a login session token.
    async fn insert_session(
        &self,
        token: Uuid,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Resolve a session token to its account, if the session is live.
    async fn find_session_user(&self, token: Uuid) -> anyhow::Result<Option<UserAccount>>;
}
