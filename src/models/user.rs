// src/models/user.rs
// DOCUMENTATION: Registered customers referenced by bookings

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Public user fields shown on admin booking lists
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
