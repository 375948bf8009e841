use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{
    NewReservation, NewRoom, NewUserAccount, Reservation, ReservationPatch, Room, RoomPatch,
    UserAccount, UserAccountPatch,
};

/// REST DTO for room representation with serde/schemars
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RoomDto {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub location: String,
}

/// REST DTO for creating a new room
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateRoomReq {
    pub name: String,
    pub capacity: i32,
    pub location: String,
}

/// REST DTO for updating a room (partial)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct UpdateRoomReq {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

/// REST DTO for reservation representation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReservationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// REST DTO for submitting a reservation.
/// `user_id` is honored for administrators only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateReservationReq {
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub user_id: Option<Uuid>,
}

/// REST DTO for editing a reservation (partial)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct UpdateReservationReq {
    pub room_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
}

/// REST DTO for a room together with its future reservations
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RoomScheduleDto {
    pub room: RoomDto,
    pub upcoming_reservations: Vec<ReservationDto>,
}

/// REST DTO for user account representation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// REST DTO for creating a new user account
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateUserReq {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// REST DTO for updating a user account (partial)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct UpdateUserReq {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// REST DTO for the login request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

/// REST DTO for the login response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoginDto {
    pub token: Uuid,
    pub username: String,
    pub is_admin: bool,
}

// Conversion implementations between REST DTOs and contract models

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
            capacity: room.capacity,
            location: room.location,
        }
    }
}

impl From<CreateRoomReq> for NewRoom {
    fn from(req: CreateRoomReq) -> Self {
        Self {
            name: req.name,
            capacity: req.capacity,
            location: req.location,
        }
    }
}

impl From<UpdateRoomReq> for RoomPatch {
    fn from(req: UpdateRoomReq) -> Self {
        Self {
            name: req.name,
            capacity: req.capacity,
            location: req.location,
        }
    }
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            room_id: r.room_id,
            start_time: r.start,
            end_time: r.end,
        }
    }
}

impl From<CreateReservationReq> for NewReservation {
    fn from(req: CreateReservationReq) -> Self {
        Self {
            room_id: req.room_id,
            start: req.start_time,
            end: req.end_time,
            user_id: req.user_id,
        }
    }
}

impl From<UpdateReservationReq> for ReservationPatch {
    fn from(req: UpdateReservationReq) -> Self {
        Self {
            room_id: req.room_id,
            start: req.start_time,
            end: req.end_time,
            user_id: req.user_id,
        }
    }
}

impl From<UserAccount> for UserDto {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

impl From<CreateUserReq> for NewUserAccount {
    fn from(req: CreateUserReq) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            is_admin: req.is_admin,
        }
    }
}

impl From<UpdateUserReq> for UserAccountPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            is_admin: req.is_admin,
        }
    }
}
