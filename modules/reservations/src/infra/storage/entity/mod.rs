pub mod reservation;
pub mod room;
pub mod session;
pub mod user;
