// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod booking_repository;
pub mod catalog_repository;
pub mod cinema_repository;
pub mod film_repository;
pub mod hall_repository;
pub mod seat_repository;
pub mod session_repository;
pub mod user_repository;

pub use booking_repository::*;
pub use catalog_repository::*;
pub use cinema_repository::*;
pub use film_repository::*;
pub use hall_repository::*;
pub use seat_repository::*;
pub use session_repository::*;
pub use user_repository::*;
