// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod admin_service;
pub mod apollo_client;
pub mod apollo_feed;
pub mod apollo_mapper;
pub mod booking_service;
pub mod catalog_service;
pub mod date_range;
pub mod rate_limit;
pub mod seat_layout;
pub mod seat_selection;
pub mod session_planner;
pub mod sync_service;

pub use admin_service::*;
pub use apollo_client::*;
pub use apollo_mapper::*;
pub use booking_service::*;
pub use catalog_service::*;
pub use rate_limit::*;
pub use seat_layout::*;
pub use seat_selection::*;
pub use session_planner::*;
pub use sync_service::*;
