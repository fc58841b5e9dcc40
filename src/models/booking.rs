// src/models/booking.rs
// DOCUMENTATION: Ticket bookings and their seat lists
// PURPOSE: Booking rows, request payloads and API responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{FilmSummary, HallSummary, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and confirmed bookings hold their seats
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    /// ACTIVE as bindable strings for `status = ANY($n)`
    pub fn active_values() -> Vec<String> {
        Self::ACTIVE.iter().map(|s| s.as_str().to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Online => "online",
        }
    }

    /// Unknown methods are dropped rather than rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "card" => Some(PaymentMethod::Card),
            "cash" => Some(PaymentMethod::Cash),
            "online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

/// Seat coordinates inside a hall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatPosition {
    pub row: i32,
    pub number: i32,
}

// Written by hand: the derive binds a local named `row`, which clashes with a field of that name
impl<'r> FromRow<'r, PgRow> for SeatPosition {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SeatPosition {
            row: row.try_get("row")?,
            number: row.try_get("number")?,
        })
    }
}

impl SeatPosition {
    /// Key used by seat maps, e.g. "3-7"
    pub fn key(&self) -> String {
        format!("{}-{}", self.row, self.number)
    }
}

/// Booking row as stored in the bookings table
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Uuid,
    pub total_price: f64,
    pub booking_number: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Option<Uuid>,
    pub session_id: Uuid,
    pub total_price: f64,
    pub booking_number: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

/// Seat as sent by clients; row and number may arrive as numbers or numeric strings
#[derive(Debug, Clone, Deserialize)]
pub struct SeatInput {
    #[serde(default)]
    pub row: serde_json::Value,
    #[serde(default)]
    pub number: serde_json::Value,
}

/// Request DTO for POST /api/bookings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub session_id: Option<String>,
    pub seats: Option<Vec<SeatInput>>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub user_id: Option<String>,
}

/// Response for a freshly created booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub total_price: f64,
    pub seats: Vec<SeatPosition>,
    pub session: Uuid,
    pub status: String,
}

/// Session block embedded in booking details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub film: Option<FilmSummary>,
    pub hall: Option<HallSummary>,
}

/// Booking with session, seats and user expanded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub id: Uuid,
    pub booking_number: String,
    pub total_price: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
    pub session: Option<BookingSession>,
    pub seats: Vec<SeatPosition>,
}

impl Booking {
    pub fn to_detail(
        &self,
        session: Option<BookingSession>,
        seats: Vec<SeatPosition>,
        user: Option<UserSummary>,
    ) -> BookingDetail {
        BookingDetail {
            id: self.id,
            booking_number: self.booking_number.clone(),
            total_price: self.total_price,
            status: self.status.clone(),
            payment_status: self.payment_status.clone(),
            payment_method: self.payment_method.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            created_at: self.created_at,
            user,
            session,
            seats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
        assert_eq!(PaymentMethod::parse("CARD"), None);
    }

    #[test]
    fn test_active_statuses() {
        assert_eq!(BookingStatus::active_values(), vec!["pending", "confirmed"]);
        assert!(!BookingStatus::ACTIVE.contains(&BookingStatus::Cancelled));
    }

    #[test]
    fn test_request_accepts_mixed_seat_values() {
        let req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "sessionId": "abc",
            "seats": [{ "row": 2, "number": "5" }],
            "contactEmail": "guest@example.com"
        }))
        .unwrap();
        let seats = req.seats.unwrap();
        assert_eq!(seats[0].row, serde_json::json!(2));
        assert_eq!(seats[0].number, serde_json::json!("5"));
    }

    #[test]
    fn test_seat_key() {
        assert_eq!(SeatPosition { row: 3, number: 12 }.key(), "3-12");
    }
}
