use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::ReservationsApi,
    error::ReservationsError,
    model::{NewReservation, Principal, Reservation, ReservationPatch, Room, UserAccount},
};
use crate::domain::accounts::AccountService;
use crate::domain::error::DomainError;
use crate::domain::rooms::RoomService;
use crate::domain::service::ReservationService;

/// Local implementation of the ReservationsApi trait that delegates to the
/// domain services
pub struct ReservationsLocalClient {
    reservations: Arc<ReservationService>,
    rooms: Arc<RoomService>,
    accounts: Arc<AccountService>,
    upcoming_limit: u64,
}

impl ReservationsLocalClient {
    pub fn new(
        reservations: Arc<ReservationService>,
        rooms: Arc<RoomService>,
        accounts: Arc<AccountService>,
        upcoming_limit: u64,
    ) -> Self {
        Self {
            reservations,
            rooms,
            accounts,
            upcoming_limit,
        }
    }
}

#[async_trait]
impl ReservationsApi for ReservationsLocalClient {
    async fn list_rooms(&self) -> anyhow::Result<Vec<Room>> {
        self.rooms.list().await.map_err(to_contract_error)
    }

    async fn get_room(&self, id: Uuid) -> anyhow::Result<Room> {
        self.rooms.get(id).await.map_err(to_contract_error)
    }

    async fn create_reservation(
        &self,
        candidate: NewReservation,
        principal: Principal,
    ) -> anyhow::Result<Reservation> {
        self.reservations
            .create(candidate, &principal)
            .await
            .map_err(to_contract_error)
    }

    async fn edit_reservation(
        &self,
        id: Uuid,
        patch: ReservationPatch,
        principal: Principal,
    ) -> anyhow::Result<Reservation> {
        self.reservations
            .update(id, patch, &principal)
            .await
            .map_err(to_contract_error)
    }

    async fn cancel_reservation(&self, id: Uuid, principal: Principal) -> anyhow::Result<()> {
        self.reservations
            .cancel(id, &principal)
            .await
            .map_err(to_contract_error)
    }

    async fn list_reservations(&self, principal: Principal) -> anyhow::Result<Vec<Reservation>> {
        self.reservations
            .list_visible(&principal)
            .await
            .map_err(to_contract_error)
    }

    async fn upcoming_reservations(
        &self,
        principal: Principal,
    ) -> anyhow::Result<Vec<Reservation>> {
        self.reservations
            .upcoming(&principal, self.upcoming_limit)
            .await
            .map_err(to_contract_error)
    }

    async fn principal_for_token(&self, token: Uuid) -> anyhow::Result<Option<Principal>> {
        self.accounts
            .principal_for_token(token)
            .await
            .map_err(to_contract_error)
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<UserAccount> {
        self.accounts.get(id).await.map_err(to_contract_error)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn to_contract_error(domain_error: DomainError) -> anyhow::Error {
    anyhow::Error::new(ReservationsError::from(domain_error))
}
