use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateReservationReq, CreateRoomReq, CreateUserReq, LoginDto, LoginReq, ReservationDto,
    RoomDto, RoomScheduleDto, UpdateReservationReq, UpdateRoomReq, UpdateUserReq, UserDto,
};
use crate::api::rest::error::ApiError;
use crate::config::ReservationsConfig;
use crate::contract::model::Principal;
use crate::domain::accounts::AccountService;
use crate::domain::rooms::RoomService;
use crate::domain::service::ReservationService;

// --- auth ---

/// Exchange credentials for a bearer token
pub async fn login(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginDto>, ApiError> {
    info!("Login attempt for '{}'", req.username);

    let (token, user) = accounts
        .login(&req.username, &req.password)
        .await
        .map_err(|e| {
            info!("Login failed for '{}': {}", req.username, e);
            ApiError::from(e)
        })?;

    Ok(Json(LoginDto {
        token,
        username: user.username,
        is_admin: user.is_admin,
    }))
}

// --- rooms ---

/// List all rooms
pub async fn list_rooms(
    Extension(rooms): Extension<Arc<RoomService>>,
    _principal: Principal,
) -> Result<Json<Vec<RoomDto>>, ApiError> {
    let result = rooms.list().await.map_err(|e| {
        error!("Failed to list rooms: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(result.into_iter().map(RoomDto::from).collect()))
}

/// Get a room together with its future reservations
pub async fn get_room(
    Extension(rooms): Extension<Arc<RoomService>>,
    Extension(reservations): Extension<Arc<ReservationService>>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomScheduleDto>, ApiError> {
    let room = rooms.get(id).await.map_err(ApiError::from)?;
    let schedule = reservations.room_schedule(id).await.map_err(|e| {
        error!("Failed to load schedule for room {}: {}", id, e);
        ApiError::from(e)
    })?;

    Ok(Json(RoomScheduleDto {
        room: RoomDto::from(room),
        upcoming_reservations: schedule.into_iter().map(ReservationDto::from).collect(),
    }))
}

/// Create a new room (administrators only)
pub async fn create_room(
    Extension(rooms): Extension<Arc<RoomService>>,
    principal: Principal,
    Json(req): Json<CreateRoomReq>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    info!("Creating room: {:?}", req);

    let room = rooms
        .create(req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(RoomDto::from(room))))
}

/// Update an existing room (administrators only)
pub async fn update_room(
    Extension(rooms): Extension<Arc<RoomService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoomReq>,
) -> Result<Json<RoomDto>, ApiError> {
    info!("Updating room {} with: {:?}", id, req);

    let room = rooms
        .update(id, req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(RoomDto::from(room)))
}

/// Delete a room (administrators only)
pub async fn delete_room(
    Extension(rooms): Extension<Arc<RoomService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting room: {}", id);

    rooms.delete(id, &principal).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- reservations ---

/// Reservations visible to the caller (admins see all, users their own)
pub async fn list_reservations(
    Extension(reservations): Extension<Arc<ReservationService>>,
    principal: Principal,
) -> Result<Json<Vec<ReservationDto>>, ApiError> {
    let result = reservations.list_visible(&principal).await.map_err(|e| {
        error!("Failed to list reservations: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(result.into_iter().map(ReservationDto::from).collect()))
}

/// The caller's next upcoming reservations
pub async fn upcoming_reservations(
    Extension(reservations): Extension<Arc<ReservationService>>,
    Extension(config): Extension<Arc<ReservationsConfig>>,
    principal: Principal,
) -> Result<Json<Vec<ReservationDto>>, ApiError> {
    let result = reservations
        .upcoming(&principal, config.upcoming_limit)
        .await
        .map_err(|e| {
            error!("Failed to list upcoming reservations: {}", e);
            ApiError::from(e)
        })?;
    Ok(Json(result.into_iter().map(ReservationDto::from).collect()))
}

/// Submit a new reservation
pub async fn create_reservation(
    Extension(reservations): Extension<Arc<ReservationService>>,
    principal: Principal,
    Json(req): Json<CreateReservationReq>,
) -> Result<(StatusCode, Json<ReservationDto>), ApiError> {
    info!("Creating reservation: {:?}", req);

    let reservation = reservations
        .create(req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(ReservationDto::from(reservation))))
}

/// Edit an existing reservation
pub async fn update_reservation(
    Extension(reservations): Extension<Arc<ReservationService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReservationReq>,
) -> Result<Json<ReservationDto>, ApiError> {
    info!("Updating reservation {} with: {:?}", id, req);

    let reservation = reservations
        .update(id, req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(ReservationDto::from(reservation)))
}

/// Cancel a reservation
pub async fn cancel_reservation(
    Extension(reservations): Extension<Arc<ReservationService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("Cancelling reservation: {}", id);

    reservations
        .cancel(id, &principal)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- users ---

/// List all user accounts (administrators only)
pub async fn list_users(
    Extension(accounts): Extension<Arc<AccountService>>,
    principal: Principal,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let result = accounts.list(&principal).await.map_err(|e| {
        error!("Failed to list users: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(result.into_iter().map(UserDto::from).collect()))
}

/// Create a new user account (administrators only)
pub async fn create_user(
    Extension(accounts): Extension<Arc<AccountService>>,
    principal: Principal,
    Json(req): Json<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    info!("Creating user '{}'", req.username);

    let user = accounts
        .create(req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update a user account (administrators only)
pub async fn update_user(
    Extension(accounts): Extension<Arc<AccountService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserReq>,
) -> Result<Json<UserDto>, ApiError> {
    info!("Updating user {}", id);

    let user = accounts
        .update(id, req.into(), &principal)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user account (administrators only)
pub async fn delete_user(
    Extension(accounts): Extension<Arc<AccountService>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting user: {}", id);

    accounts
        .delete(id, &principal)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
