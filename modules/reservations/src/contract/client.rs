use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{
    NewReservation, Principal, Reservation, ReservationPatch, Room, UserAccount,
};

/// Public API trait for the reservations module that other modules can use
#[async_trait]
pub trait ReservationsApi: Send + Sync {
    /// List all rooms
    async fn list_rooms(&self) -> anyhow::Result<Vec<Room>>;

    /// Get a room by ID
    async fn get_room(&self, id: Uuid) -> anyhow::Result<Room>;

    /// Submit a candidate reservation on behalf of the principal
    async fn create_reservation(
        &self,
        candidate: NewReservation,
        principal: Principal,
    ) -> anyhow::Result<Reservation>;

    /// Edit an existing reservation; the full resulting interval is re-validated
    async fn edit_reservation(
        &self,
        id: Uuid,
        patch: ReservationPatch,
        principal: Principal,
    ) -> anyhow::Result<Reservation>;

    /// Cancel a reservation (owner or administrator only)
    async fn cancel_reservation(&self, id: Uuid, principal: Principal) -> anyhow::Result<()>;

    /// Reservations visible to the principal (admins see all, users their own)
    async fn list_reservations(&self, principal: Principal) -> anyhow::Result<Vec<Reservation>>;

    /// The principal's next upcoming reservations
    async fn upcoming_reservations(&self, principal: Principal)
        -> anyhow::Result<Vec<Reservation>>;

    /// Resolve a bearer token into a principal, if the session is live
    async fn principal_for_token(&self, token: Uuid) -> anyhow::Result<Option<Principal>>;

    /// Look up an account by id
    async fn get_user(&self, id: Uuid) -> anyhow::Result<UserAccount>;
}
