// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod booking;
pub mod cinema;
pub mod film;
pub mod hall;
pub mod session;
pub mod user;

pub use booking::*;
pub use cinema::*;
pub use film::*;
pub use hall::*;
pub use session::*;
pub use user::*;
