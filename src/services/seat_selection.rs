// src/services/seat_selection.rs
// DOCUMENTATION: Seat request checks for booking creation
// PURPOSE: Layout, duplicate and conflict checks plus payment normalization

use crate::errors::CinemaError;
use crate::models::{BookingStatus, PaymentMethod, PaymentStatus, SeatInput, SeatPosition};
use serde_json::Value;
use std::collections::HashSet;

const OUTSIDE_LAYOUT: &str = "One or more seats are outside hall layout";

/// Payment fields as they will be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentResolution {
    pub method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
}

/// Seat selection checks
/// DOCUMENTATION: Pure; the caller supplies the hall grid and the seats held
/// by active bookings of the session
pub struct SeatSelection;

impl SeatSelection {
    /// Whole numbers given as JSON numbers or numeric strings
    fn coordinate(value: &Value) -> Option<i32> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        }
    }

    /// Convert requested seats into positions
    /// Anything that is not a whole number cannot be inside the layout
    pub fn normalize(seats: &[SeatInput]) -> Result<Vec<SeatPosition>, CinemaError> {
        seats
            .iter()
            .map(|seat| {
                match (Self::coordinate(&seat.row), Self::coordinate(&seat.number)) {
                    (Some(row), Some(number)) => Ok(SeatPosition { row, number }),
                    _ => Err(CinemaError::InvalidInput(OUTSIDE_LAYOUT.to_string())),
                }
            })
            .collect()
    }

    pub fn check_layout(
        seats: &[SeatPosition],
        rows: i32,
        seats_per_row: i32,
    ) -> Result<(), CinemaError> {
        let outside = seats.iter().any(|seat| {
            seat.row < 1 || seat.number < 1 || seat.row > rows || seat.number > seats_per_row
        });
        if outside {
            return Err(CinemaError::InvalidInput(OUTSIDE_LAYOUT.to_string()));
        }
        Ok(())
    }

    pub fn check_duplicates(seats: &[SeatPosition]) -> Result<(), CinemaError> {
        let mut seen = HashSet::with_capacity(seats.len());
        if seats.iter().all(|seat| seen.insert(*seat)) {
            Ok(())
        } else {
            Err(CinemaError::InvalidInput("Duplicate seats in request".to_string()))
        }
    }

    /// Fails on the first requested seat that is already held
    pub fn check_conflicts(
        seats: &[SeatPosition],
        occupied: &HashSet<SeatPosition>,
    ) -> Result<(), CinemaError> {
        match seats.iter().find(|seat| occupied.contains(seat)) {
            Some(seat) => Err(CinemaError::Conflict(format!(
                "Seat {} is already booked",
                seat.key()
            ))),
            None => Ok(()),
        }
    }

    /// Run every check in order: shape, layout, duplicates, conflicts
    pub fn validate(
        requested: &[SeatInput],
        rows: i32,
        seats_per_row: i32,
        occupied: &HashSet<SeatPosition>,
    ) -> Result<Vec<SeatPosition>, CinemaError> {
        let seats = Self::normalize(requested)?;
        Self::check_layout(&seats, rows, seats_per_row)?;
        Self::check_duplicates(&seats)?;
        Self::check_conflicts(&seats, occupied)?;
        Ok(seats)
    }

    /// Unknown methods are dropped; "paid" only sticks with a known method
    pub fn resolve_payment(method: Option<&str>, status: Option<&str>) -> PaymentResolution {
        let method = method.and_then(PaymentMethod::parse);
        let payment_status = if method.is_some() && status == Some("paid") {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };
        let status = match payment_status {
            PaymentStatus::Paid => BookingStatus::Confirmed,
            _ => BookingStatus::Pending,
        };

        PaymentResolution {
            method,
            payment_status,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(row: Value, number: Value) -> SeatInput {
        SeatInput { row, number }
    }

    fn pos(row: i32, number: i32) -> SeatPosition {
        SeatPosition { row, number }
    }

    #[test]
    fn test_normalize_accepts_numeric_strings() {
        let seats = SeatSelection::normalize(&[
            input(json!(1), json!("4")),
            input(json!("2"), json!(5.0)),
        ])
        .unwrap();
        assert_eq!(seats, vec![pos(1, 4), pos(2, 5)]);

        assert!(SeatSelection::normalize(&[input(json!("A"), json!(1))]).is_err());
        assert!(SeatSelection::normalize(&[input(json!(1.5), json!(1))]).is_err());
        assert!(SeatSelection::normalize(&[input(Value::Null, json!(1))]).is_err());
    }

    #[test]
    fn test_layout_bounds() {
        assert!(SeatSelection::check_layout(&[pos(1, 1), pos(10, 12)], 10, 12).is_ok());
        for seat in [pos(0, 1), pos(1, 0), pos(11, 1), pos(1, 13)] {
            let err = SeatSelection::check_layout(&[seat], 10, 12).unwrap_err();
            assert!(matches!(err, CinemaError::InvalidInput(ref m) if m == OUTSIDE_LAYOUT));
        }
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(SeatSelection::check_duplicates(&[pos(1, 1), pos(1, 2)]).is_ok());
        let err = SeatSelection::check_duplicates(&[pos(1, 1), pos(2, 2), pos(1, 1)]).unwrap_err();
        assert!(matches!(err, CinemaError::InvalidInput(ref m) if m == "Duplicate seats in request"));
    }

    #[test]
    fn test_conflict_reports_first_taken_seat() {
        let occupied: HashSet<_> = [pos(3, 4), pos(3, 5)].into_iter().collect();
        let err = SeatSelection::check_conflicts(&[pos(1, 1), pos(3, 5), pos(3, 4)], &occupied)
            .unwrap_err();
        assert!(matches!(err, CinemaError::Conflict(ref m) if m == "Seat 3-5 is already booked"));
        assert!(SeatSelection::check_conflicts(&[pos(1, 1)], &occupied).is_ok());
    }

    #[test]
    fn test_validate_runs_layout_before_duplicates() {
        let occupied = HashSet::new();
        let err = SeatSelection::validate(
            &[input(json!(1), json!(1)), input(json!(1), json!(1)), input(json!(99), json!(1))],
            10,
            10,
            &occupied,
        )
        .unwrap_err();
        assert!(matches!(err, CinemaError::InvalidInput(ref m) if m == OUTSIDE_LAYOUT));
    }

    #[test]
    fn test_resolve_payment() {
        let paid = SeatSelection::resolve_payment(Some("card"), Some("paid"));
        assert_eq!(paid.method, Some(PaymentMethod::Card));
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.status, BookingStatus::Confirmed);

        let unknown = SeatSelection::resolve_payment(Some("crypto"), Some("paid"));
        assert_eq!(unknown.method, None);
        assert_eq!(unknown.payment_status, PaymentStatus::Pending);
        assert_eq!(unknown.status, BookingStatus::Pending);

        let unpaid = SeatSelection::resolve_payment(Some("cash"), None);
        assert_eq!(unpaid.method, Some(PaymentMethod::Cash));
        assert_eq!(unpaid.status, BookingStatus::Pending);
    }
}
