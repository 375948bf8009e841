use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::config::ReservationsConfig;
use crate::domain::accounts::AccountService;
use crate::domain::rooms::RoomService;
use crate::domain::service::ReservationService;

/// Assemble the module's REST surface. Every route goes through the domain
/// services; conflict checking is never re-implemented at this layer.
pub fn router(
    reservations: Arc<ReservationService>,
    rooms: Arc<RoomService>,
    accounts: Arc<AccountService>,
    config: Arc<ReservationsConfig>,
) -> Router {
    Router::new()
        .route("/auth/login", post(handlers::login))
        .route(
            "/rooms",
            get(handlers::list_rooms).post(handlers::create_room),
        )
        .route(
            "/rooms/{id}",
            get(handlers::get_room)
                .put(handlers::update_room)
                .delete(handlers::delete_room),
        )
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route(
            "/reservations/upcoming",
            get(handlers::upcoming_reservations),
        )
        .route(
            "/reservations/{id}",
            axum::routing::put(handlers::update_reservation)
                .delete(handlers::cancel_reservation),
        )
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            axum::routing::put(handlers::update_user).delete(handlers::delete_user),
        )
        .layer(Extension(reservations))
        .layer(Extension(rooms))
        .layer(Extension(accounts))
        .layer(Extension(config))
}
