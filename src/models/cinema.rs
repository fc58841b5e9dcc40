// src/models/cinema.rs
// DOCUMENTATION: Cinema records and their API representations
// PURPOSE: A cinema groups halls; Apollo Kino TheatreAreas map onto it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_COUNTRY: &str = "Estonia";

/// Cinema row as stored in the cinemas table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cinema {
    pub id: Uuid,
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub facilities: Vec<String>,
    /// TheatreArea ID from Apollo Kino (used for deduplication)
    pub apollo_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Postal address, nested in API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Insert/update payload for a cinema
#[derive(Debug, Clone, PartialEq)]
pub struct NewCinema {
    pub name: String,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub facilities: Vec<String>,
    pub apollo_id: Option<String>,
}

/// Full cinema as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub facilities: Vec<String>,
    pub apollo_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Short cinema reference embedded in hall and session payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaSummary {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
    pub apollo_id: Option<String>,
}

impl Cinema {
    pub fn address(&self) -> Address {
        Address {
            street: self.street.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }

    /// Convert database Cinema into API response
    pub fn to_response(&self) -> CinemaResponse {
        CinemaResponse {
            id: self.id,
            name: self.name.clone(),
            address: self.address(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            facilities: self.facilities.clone(),
            apollo_id: self.apollo_id.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_summary(&self) -> CinemaSummary {
        CinemaSummary {
            id: self.id,
            name: self.name.clone(),
            address: self.address(),
            apollo_id: self.apollo_id.clone(),
        }
    }
}
