// src/models/session.rs
// DOCUMENTATION: Screenings of a film in a hall
// PURPOSE: Session rows, pricing, admin payloads and listing DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{FilmSummary, HallSummary};

/// Lifecycle of a screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Completed => "completed",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Scheduled
    }
}

/// Ticket prices; only the standard price is mandatory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionPrice {
    #[validate(range(min = 0.0))]
    pub standard: f64,
    #[validate(range(min = 0.0))]
    pub vip: Option<f64>,
    #[validate(range(min = 0.0))]
    pub student: Option<f64>,
    #[validate(range(min = 0.0))]
    pub child: Option<f64>,
}

/// Session row as stored in the sessions table
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub film_id: Uuid,
    pub hall_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_standard: f64,
    pub price_vip: Option<f64>,
    pub price_student: Option<f64>,
    pub price_child: Option<f64>,
    pub is_3d: bool,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub available_seats: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a session
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub film_id: Uuid,
    pub hall_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: SessionPrice,
    pub is_3d: bool,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub available_seats: i32,
    pub status: SessionStatus,
}

/// Session with film and hall left as references
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub film: Uuid,
    pub hall: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: SessionPrice,
    #[serde(rename = "is3D")]
    pub is_3d: bool,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub available_seats: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Session with film and hall expanded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListItem {
    pub id: Uuid,
    pub film: Option<FilmSummary>,
    pub hall: Option<HallSummary>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: SessionPrice,
    #[serde(rename = "is3D")]
    pub is_3d: bool,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub available_seats: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn price(&self) -> SessionPrice {
        SessionPrice {
            standard: self.price_standard,
            vip: self.price_vip,
            student: self.price_student,
            child: self.price_child,
        }
    }

    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            id: self.id,
            film: self.film_id,
            hall: self.hall_id,
            start_time: self.start_time,
            end_time: self.end_time,
            price: self.price(),
            is_3d: self.is_3d,
            language: self.language.clone(),
            subtitles: self.subtitles.clone(),
            available_seats: self.available_seats,
            status: self.status.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_list_item(
        &self,
        film: Option<FilmSummary>,
        hall: Option<HallSummary>,
    ) -> SessionListItem {
        SessionListItem {
            id: self.id,
            film,
            hall,
            start_time: self.start_time,
            end_time: self.end_time,
            price: self.price(),
            is_3d: self.is_3d,
            language: self.language.clone(),
            subtitles: self.subtitles.clone(),
            available_seats: self.available_seats,
            status: self.status.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_new_session(&self) -> NewSession {
        NewSession {
            film_id: self.film_id,
            hall_id: self.hall_id,
            start_time: self.start_time,
            end_time: self.end_time,
            price: self.price(),
            is_3d: self.is_3d,
            language: self.language.clone(),
            subtitles: self.subtitles.clone(),
            available_seats: self.available_seats,
            status: match self.status.as_str() {
                "cancelled" => SessionStatus::Cancelled,
                "completed" => SessionStatus::Completed,
                _ => SessionStatus::Scheduled,
            },
        }
    }
}

/// Request DTO for POST /api/admin/sessions
/// IDs and times stay strings so malformed values map to specific messages
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub film: Option<String>,
    pub hall: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[validate]
    pub price: Option<SessionPrice>,
    #[serde(rename = "is3D")]
    pub is_3d: Option<bool>,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub status: Option<SessionStatus>,
}

/// Request DTO for PUT /api/admin/sessions/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub film: Option<String>,
    pub hall: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[validate]
    pub price: Option<SessionPrice>,
    #[serde(rename = "is3D")]
    pub is_3d: Option<bool>,
    pub language: Option<String>,
    pub subtitles: Option<String>,
    pub status: Option<SessionStatus>,
    #[validate(range(min = 0))]
    pub available_seats: Option<i32>,
}

/// Query parameters for GET /api/sessions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub film_id: Option<String>,
    pub hall_id: Option<String>,
    pub date: Option<String>,
}

/// Session header of a seat map
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapSession {
    pub id: Uuid,
    /// Film title
    pub film: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Hall name
    pub hall: String,
    /// Cinema name
    pub cinema: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapLayout {
    pub rows: i32,
    pub seats_per_row: i32,
    pub capacity: i32,
    pub available: i32,
}

/// Response for GET /api/sessions/{id}/seats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    pub session: SeatMapSession,
    pub layout: SeatMapLayout,
    pub occupied: Vec<super::SeatPosition>,
    /// Seat type keyed by "row-number"
    pub seat_types: std::collections::BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_validation() {
        let price = SessionPrice {
            standard: -1.0,
            vip: None,
            student: Some(6.0),
            child: None,
        };
        assert!(price.validate().is_err());

        let req: CreateSessionRequest = serde_json::from_value(serde_json::json!({
            "film": "x",
            "price": { "standard": 9.5, "child": -2 }
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_reads_is3d_flag() {
        let req: UpdateSessionRequest = serde_json::from_value(serde_json::json!({
            "is3D": true,
            "availableSeats": 40,
            "status": "cancelled"
        }))
        .unwrap();
        assert_eq!(req.is_3d, Some(true));
        assert_eq!(req.available_seats, Some(40));
        assert_eq!(req.status, Some(SessionStatus::Cancelled));
    }

    #[test]
    fn test_response_shape() {
        let session = Session {
            id: Uuid::new_v4(),
            film_id: Uuid::new_v4(),
            hall_id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            price_standard: 9.5,
            price_vip: Some(14.25),
            price_student: None,
            price_child: None,
            is_3d: true,
            language: Some("English".into()),
            subtitles: Some("Estonian, Russian".into()),
            available_seats: 150,
            status: "scheduled".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(session.to_response()).unwrap();
        assert_eq!(value["is3D"], true);
        assert_eq!(value["price"]["standard"], 9.5);
        assert_eq!(value["availableSeats"], 150);
        assert_eq!(session.to_new_session().status, SessionStatus::Scheduled);
    }
}
