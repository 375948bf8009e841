use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewRoom, Principal, Room, RoomPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::RoomsRepository;

/// Room administration. Mutations require elevated privilege; reads are open
/// to any authenticated principal.
#[derive(Clone)]
pub struct RoomService {
    rooms: Arc<dyn RoomsRepository>,
}

impl RoomService {
    pub fn new(rooms: Arc<dyn RoomsRepository>) -> Self {
        Self { rooms }
    }

    #[instrument(name = "reservations.rooms.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Room>, DomainError> {
        debug!("Listing rooms");
        self.rooms
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "reservations.rooms.get", skip(self), fields(room_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Room, DomainError> {
        self.rooms
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::room_not_found(id))
    }

    #[instrument(
        name = "reservations.rooms.create",
        skip(self),
        fields(name = %new_room.name)
    )]
    pub async fn create(
        &self,
        new_room: NewRoom,
        principal: &Principal,
    ) -> Result<Room, DomainError> {
        info!("Creating room");
        require_admin(principal)?;
        validate_capacity(new_room.capacity)?;

        let room = Room {
            id: Uuid::new_v4(),
            name: new_room.name,
            capacity: new_room.capacity,
            location: new_room.location,
        };

        self.rooms
            .insert(room.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created room with id={}", room.id);
        Ok(room)
    }

    #[instrument(name = "reservations.rooms.update", skip(self, patch), fields(room_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: RoomPatch,
        principal: &Principal,
    ) -> Result<Room, DomainError> {
        info!("Updating room");
        require_admin(principal)?;

        let mut current = self.get(id).await?;

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(capacity) = patch.capacity {
            validate_capacity(capacity)?;
            current.capacity = capacity;
        }
        if let Some(location) = patch.location {
            current.location = location;
        }

        self.rooms
            .update(current.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully updated room");
        Ok(current)
    }

    /// Deletes the room and, by cascade, its reservations.
    #[instrument(name = "reservations.rooms.delete", skip(self), fields(room_id = %id))]
    pub async fn delete(&self, id: Uuid, principal: &Principal) -> Result<(), DomainError> {
        info!("Deleting room");
        require_admin(principal)?;

        let deleted = self
            .rooms
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::room_not_found(id));
        }

        info!("Successfully deleted room");
        Ok(())
    }
}

fn require_admin(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

fn validate_capacity(capacity: i32) -> Result<(), DomainError> {
    if capacity <= 0 {
        return Err(DomainError::invalid_capacity(capacity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_be_positive() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(250).is_ok());
        assert!(matches!(
            validate_capacity(0),
            Err(DomainError::InvalidCapacity { capacity: 0 })
        ));
        assert!(matches!(
            validate_capacity(-3),
            Err(DomainError::InvalidCapacity { capacity: -3 })
        ));
    }

    #[test]
    fn mutations_require_elevated_privilege() {
        let user = Principal {
            user_id: Uuid::new_v4(),
            is_admin: false,
        };
        let admin = Principal {
            user_id: Uuid::new_v4(),
            is_admin: true,
        };

        assert!(matches!(require_admin(&user), Err(DomainError::Forbidden)));
        assert!(require_admin(&admin).is_ok());
    }
}
