use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::contract::model::{Reservation, Room, UserAccount};
use crate::domain::error::DomainError;
use crate::domain::ports::ReservationNotifier;

/// HTTP adapter for the confirmation sink: posts a JSON payload to the
/// notification service. Accounts without an email address are skipped.
pub struct HttpReservationNotifier {
    client: reqwest::Client,
    base: Url,
}

#[derive(Debug, Serialize)]
struct ConfirmationPayload<'a> {
    recipient: &'a str,
    subject: String,
    body: String,
}

impl HttpReservationNotifier {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }
}

#[async_trait]
impl ReservationNotifier for HttpReservationNotifier {
    #[instrument(
        name = "reservations.http.notify.reservation_confirmed",
        skip_all,
        fields(notify_base = %self.base, reservation_id = %reservation.id)
    )]
    async fn reservation_confirmed(
        &self,
        user: &UserAccount,
        room: &Room,
        reservation: &Reservation,
    ) -> Result<(), DomainError> {
        if user.email.is_empty() {
            return Ok(());
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::notification("invalid notification base URL"))?
            .extend(&["api", "reservation-confirmed"]);

        let payload = ConfirmationPayload {
            recipient: &user.email,
            subject: format!("Reservation Confirmation for {}", room.name),
            body: format!(
                "Dear {},\n\nYour reservation for {} has been confirmed.\nStart Time: {}\nEnd Time: {}\n\nThank you for using our service!",
                user.username,
                room.name,
                reservation.start.format("%Y-%m-%d %H:%M"),
                reservation.end.format("%Y-%m-%d %H:%M"),
            ),
        };

        let response = self
            .client
            .post(url.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::notification(format!(
                "HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}
