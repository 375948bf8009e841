use crate::contract::model::{Reservation, Room, UserAccount};
use crate::infra::storage::entity;

/// Convert database entities to contract models

impl From<entity::room::Model> for Room {
    fn from(m: entity::room::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            capacity: m.capacity,
            location: m.location,
        }
    }
}

impl From<entity::reservation::Model> for Reservation {
    fn from(m: entity::reservation::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            room_id: m.room_id,
            start: m.start_time,
            end: m.end_time,
        }
    }
}

impl From<entity::user::Model> for UserAccount {
    fn from(m: entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            is_admin: m.is_admin,
            created_at: m.created_at,
        }
    }
}
