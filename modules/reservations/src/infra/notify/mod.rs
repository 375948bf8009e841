pub mod http_notifier;

pub use http_notifier::HttpReservationNotifier;

use async_trait::async_trait;

use crate::contract::model::{Reservation, Room, UserAccount};
use crate::domain::error::DomainError;
use crate::domain::ports::ReservationNotifier;

/// Notifier used when no notification service is configured.
pub struct NullNotifier;

#[async_trait]
impl ReservationNotifier for NullNotifier {
    async fn reservation_confirmed(
        &self,
        _user: &UserAccount,
        _room: &Room,
        _reservation: &Reservation,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}
