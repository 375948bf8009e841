use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewReservation, Principal, Reservation, ReservationPatch, Room};
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::events::ReservationEvent;
use crate::domain::ports::{EventPublisher, ReservationNotifier};
use crate::domain::repo::{
    CommitOutcome, ReservationsRepository, RoomsRepository, UsersRepository,
};

/// Whether a submit creates a new reservation or overwrites an existing one.
/// The update variant carries the id excluded from its own conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update(Uuid),
}

/// Domain service deciding whether a candidate reservation may be committed.
///
/// Stateless between calls: every decision is made against live store state,
/// and the conflict check and the write execute as one transaction in the
/// repository. Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationsRepository>,
    rooms: Arc<dyn RoomsRepository>,
    users: Arc<dyn UsersRepository>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ReservationNotifier>,
    events: Arc<dyn EventPublisher<ReservationEvent>>,
}

impl ReservationService {
    /// Create a service with dependencies.
    pub fn new(
        reservations: Arc<dyn ReservationsRepository>,
        rooms: Arc<dyn RoomsRepository>,
        users: Arc<dyn UsersRepository>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ReservationNotifier>,
        events: Arc<dyn EventPublisher<ReservationEvent>>,
    ) -> Self {
        Self {
            reservations,
            rooms,
            users,
            clock,
            notifier,
            events,
        }
    }

    /// Temporal rules for a candidate interval. Ordering is checked first so
    /// a reversed interval is always reported as such; the past-bound rules
    /// are applied against `now` read once by the caller.
    pub fn validate_interval(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if end <= start {
            return Err(DomainError::InvalidInterval);
        }
        if start < now {
            return Err(DomainError::PastStart);
        }
        if end < now {
            return Err(DomainError::PastEnd);
        }
        Ok(())
    }

    /// Effective owner of a candidate. Non-elevated principals always book
    /// for themselves; a caller-supplied target id is silently overwritten,
    /// not rejected. Elevated principals may book for anyone and fall back
    /// to `fallback_owner` (themselves on create, the existing owner on
    /// edit) when no target is supplied.
    pub fn resolve_owner(
        &self,
        principal: &Principal,
        requested: Option<Uuid>,
        fallback_owner: Uuid,
    ) -> Uuid {
        if principal.is_admin {
            requested.unwrap_or(fallback_owner)
        } else {
            fallback_owner
        }
    }

    /// Reservations on `room_id` intersecting `[start, end)` under the
    /// half-open rule; `exclude` removes the edited reservation from its own
    /// check.
    #[instrument(name = "reservations.service.find_conflicts", skip(self))]
    pub async fn find_conflicts(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Reservation>, DomainError> {
        self.reservations
            .find_overlapping(room_id, start, end, exclude)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// The ownership rule shared by edit and cancel: the reservation's owner
    /// or an elevated principal, everyone else is rejected.
    pub fn authorize_edit(
        &self,
        reservation: &Reservation,
        principal: &Principal,
    ) -> Result<(), DomainError> {
        if principal.can_manage(reservation.user_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    #[instrument(
        name = "reservations.service.create",
        skip(self, candidate),
        fields(room_id = %candidate.room_id, user_id = %principal.user_id)
    )]
    pub async fn create(
        &self,
        candidate: NewReservation,
        principal: &Principal,
    ) -> Result<Reservation, DomainError> {
        info!("Creating reservation");

        let owner = self.resolve_owner(principal, candidate.user_id, principal.user_id);
        let owner_account = self
            .users
            .find_by_id(owner)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(owner))?;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: owner,
            room_id: candidate.room_id,
            start: candidate.start,
            end: candidate.end,
        };

        let (committed, room) = self.submit(reservation, SubmitMode::Create).await?;

        // Confirmation is best-effort; a sink failure never rolls back the commit.
        if let Err(e) = self
            .notifier
            .reservation_confirmed(&owner_account, &room, &committed)
            .await
        {
            debug!("Notification sink call failed (continuing): {}", e);
        }

        self.events.publish(&ReservationEvent::Created {
            id: committed.id,
            at: self.clock.now(),
        });

        info!("Successfully created reservation with id={}", committed.id);
        Ok(committed)
    }

    #[instrument(
        name = "reservations.service.update",
        skip(self, patch),
        fields(reservation_id = %id, user_id = %principal.user_id)
    )]
    pub async fn update(
        &self,
        id: Uuid,
        patch: ReservationPatch,
        principal: &Principal,
    ) -> Result<Reservation, DomainError> {
        info!("Updating reservation");

        let current = self.load(id).await?;
        self.authorize_edit(&current, principal)?;

        // Partial update: absent fields keep their current values, and the
        // full resulting interval goes back through validation. A
        // non-elevated editor cannot reassign the owner.
        let owner = self.resolve_owner(principal, patch.user_id, current.user_id);
        if owner != current.user_id {
            self.users
                .find_by_id(owner)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
                .ok_or_else(|| DomainError::user_not_found(owner))?;
        }
        let candidate = Reservation {
            id: current.id,
            user_id: owner,
            room_id: patch.room_id.unwrap_or(current.room_id),
            start: patch.start.unwrap_or(current.start),
            end: patch.end.unwrap_or(current.end),
        };

        let (committed, _room) = self.submit(candidate, SubmitMode::Update(id)).await?;

        self.events.publish(&ReservationEvent::Updated {
            id: committed.id,
            at: self.clock.now(),
        });

        info!("Successfully updated reservation");
        Ok(committed)
    }

    /// Validate and persist a fully-resolved candidate. Validation fully
    /// precedes the single write; a rejected candidate never mutates the
    /// store. A conflict lost at the store level surfaces the same way as
    /// one seen up front.
    async fn submit(
        &self,
        candidate: Reservation,
        mode: SubmitMode,
    ) -> Result<(Reservation, Room), DomainError> {
        let room = self
            .rooms
            .find_by_id(candidate.room_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::room_not_found(candidate.room_id))?;

        let now = self.clock.now();
        self.validate_interval(candidate.start, candidate.end, now)?;

        let exclude = match mode {
            SubmitMode::Create => None,
            SubmitMode::Update(existing) => Some(existing),
        };
        let conflicts = self
            .find_conflicts(candidate.room_id, candidate.start, candidate.end, exclude)
            .await?;
        if !conflicts.is_empty() {
            debug!("Rejecting reservation: {} conflict(s)", conflicts.len());
            return Err(DomainError::slot_taken(candidate.room_id));
        }

        let outcome = match mode {
            SubmitMode::Create => self.reservations.insert_if_free(candidate).await,
            SubmitMode::Update(_) => self.reservations.update_if_free(candidate).await,
        }
        .map_err(|e| DomainError::database(e.to_string()))?;

        match outcome {
            CommitOutcome::Committed(r) => Ok((r, room)),
            CommitOutcome::Overlap => Err(DomainError::slot_taken(room.id)),
        }
    }

    #[instrument(
        name = "reservations.service.cancel",
        skip(self),
        fields(reservation_id = %id, user_id = %principal.user_id)
    )]
    pub async fn cancel(&self, id: Uuid, principal: &Principal) -> Result<(), DomainError> {
        info!("Cancelling reservation");

        let reservation = self.load(id).await?;
        self.authorize_edit(&reservation, principal)?;

        // Unconditional once authorized: a reservation may be cancelled even
        // after it has started or ended.
        let deleted = self
            .reservations
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::reservation_not_found(id));
        }

        self.events.publish(&ReservationEvent::Cancelled {
            id,
            at: self.clock.now(),
        });

        info!("Successfully cancelled reservation");
        Ok(())
    }

    #[instrument(name = "reservations.service.get", skip(self), fields(reservation_id = %id))]
    pub async fn get(&self, id: Uuid, principal: &Principal) -> Result<Reservation, DomainError> {
        let reservation = self.load(id).await?;
        self.authorize_edit(&reservation, principal)?;
        Ok(reservation)
    }

    /// Admins see every reservation, everyone else their own.
    #[instrument(name = "reservations.service.list_visible", skip(self))]
    pub async fn list_visible(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Reservation>, DomainError> {
        debug!("Listing reservations");
        let result = if principal.is_admin {
            self.reservations.list_all().await
        } else {
            self.reservations.list_for_user(principal.user_id).await
        };
        result.map_err(|e| DomainError::database(e.to_string()))
    }

    /// The principal's next reservations, soonest first.
    #[instrument(name = "reservations.service.upcoming", skip(self))]
    pub async fn upcoming(
        &self,
        principal: &Principal,
        limit: u64,
    ) -> Result<Vec<Reservation>, DomainError> {
        let now = self.clock.now();
        self.reservations
            .list_upcoming_for_user(principal.user_id, now, limit)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// A room's future reservations, for schedule views.
    #[instrument(name = "reservations.service.room_schedule", skip(self))]
    pub async fn room_schedule(&self, room_id: Uuid) -> Result<Vec<Reservation>, DomainError> {
        let now = self.clock.now();
        self.reservations
            .list_upcoming_for_room(room_id, now)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn load(&self, id: Uuid) -> Result<Reservation, DomainError> {
        self.reservations
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::reservation_not_found(id))
    }
}
