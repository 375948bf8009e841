use async_trait::async_trait;

use crate::contract::model::{Reservation, Room, UserAccount};
use crate::domain::error::DomainError;

/// Transport-agnostic confirmation sink. Strictly best-effort: a failure is
/// logged by the caller and never rolls back or blocks the commit.
#[async_trait]
pub trait ReservationNotifier: Send + Sync {
    async fn reservation_confirmed(
        &self,
        user: &UserAccount,
        room: &Room,
        reservation: &Reservation,
    ) -> Result<(), DomainError>;
}
