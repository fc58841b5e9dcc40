// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod admin;
pub mod apollo;
pub mod bookings;
pub mod cinemas;
pub mod films;
pub mod halls;
pub mod health;
pub mod sessions;

pub use admin::config as admin_config;
pub use apollo::config as apollo_config;
pub use bookings::config as bookings_config;
pub use cinemas::config as cinemas_config;
pub use films::config as films_config;
pub use health::config as health_config;
pub use sessions::config as sessions_config;
