pub mod client;
pub mod error;
pub mod model;

pub use error::ReservationsError;
pub use model::{
    NewReservation, NewRoom, NewUserAccount, Principal, Reservation, ReservationPatch, Room,
    RoomPatch, UserAccount, UserAccountPatch,
};
