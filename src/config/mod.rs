// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export environment settings and database bootstrap

pub mod db;
pub mod env;

pub use db::{init_db_pool, redact_credentials};
pub use env::Config;
