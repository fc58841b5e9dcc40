// src/services/seat_layout.rs
// DOCUMENTATION: Seat grid generation for halls
// PURPOSE: Produce the seat list for a hall from its rows x seats-per-row grid

use crate::models::{SeatSpec, SeatType};
use serde_json::Value;
use std::collections::BTreeSet;

/// Seat layout generator
/// DOCUMENTATION: Rows and seat numbers both start at 1
pub struct SeatLayout;

impl SeatLayout {
    /// Parse a VIP/twin row list
    /// DOCUMENTATION: Accepts a JSON array or a comma separated string.
    /// Keeps unique positive integers in ascending order, ignores the rest.
    pub fn parse_row_config(value: Option<&Value>) -> Vec<i32> {
        let candidates: Vec<Value> = match value {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(raw)) => raw
                .split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect(),
            Some(Value::Number(n)) => vec![Value::Number(n.clone())],
            _ => Vec::new(),
        };

        candidates
            .iter()
            .filter_map(|candidate| match candidate {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            })
            .filter(|row| *row > 0 && *row <= i64::from(i32::MAX))
            .map(|row| row as i32)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn grid(rows: i32, seats_per_row: i32, seat_type: impl Fn(i32, i32) -> SeatType) -> Vec<SeatSpec> {
        (1..=rows.max(0))
            .flat_map(|row| {
                let seat_type = &seat_type;
                (1..=seats_per_row.max(0)).map(move |number| SeatSpec {
                    row,
                    number,
                    seat_type: seat_type(row, number),
                })
            })
            .collect()
    }

    /// Layout with admin-chosen VIP and twin rows
    /// VIP rows win over twin rows; twin rows pair up even-numbered seats
    pub fn custom(rows: i32, seats_per_row: i32, vip_rows: &[i32], twin_rows: &[i32]) -> Vec<SeatSpec> {
        Self::grid(rows, seats_per_row, |row, number| {
            if vip_rows.contains(&row) {
                SeatType::Vip
            } else if twin_rows.contains(&row) && number % 2 == 0 {
                SeatType::Twin
            } else {
                SeatType::Standard
            }
        })
    }

    /// All-standard layout used for new and resized halls
    pub fn standard(rows: i32, seats_per_row: i32) -> Vec<SeatSpec> {
        Self::custom(rows, seats_per_row, &[], &[])
    }

    /// Layout written by a full Apollo refresh
    /// DOCUMENTATION: The first two rows and the two outermost seats on each
    /// side of every row are VIP
    pub fn refresh_default(rows: i32, seats_per_row: i32) -> Vec<SeatSpec> {
        Self::grid(rows, seats_per_row, |row, number| {
            if row <= 2 || number <= 2 || number >= seats_per_row - 1 {
                SeatType::Vip
            } else {
                SeatType::Standard
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count(seats: &[SeatSpec], seat_type: SeatType) -> usize {
        seats.iter().filter(|s| s.seat_type == seat_type).count()
    }

    #[test]
    fn test_parse_row_config() {
        assert_eq!(SeatLayout::parse_row_config(Some(&json!([3, "1", 3, -2, "x"]))), vec![1, 3]);
        assert_eq!(SeatLayout::parse_row_config(Some(&json!("5, 2,,abc,0"))), vec![2, 5]);
        assert_eq!(SeatLayout::parse_row_config(Some(&json!(4))), vec![4]);
        assert!(SeatLayout::parse_row_config(Some(&json!(null))).is_empty());
        assert!(SeatLayout::parse_row_config(None).is_empty());
    }

    #[test]
    fn test_standard_layout_covers_grid() {
        let seats = SeatLayout::standard(3, 4);
        assert_eq!(seats.len(), 12);
        assert_eq!(count(&seats, SeatType::Standard), 12);
        assert_eq!(seats[0], SeatSpec { row: 1, number: 1, seat_type: SeatType::Standard });
        assert_eq!(seats[11].row, 3);
        assert_eq!(seats[11].number, 4);
    }

    #[test]
    fn test_custom_layout_vip_wins() {
        let seats = SeatLayout::custom(4, 6, &[1, 2], &[2, 4]);
        assert_eq!(count(&seats, SeatType::Vip), 12);
        // row 4 has seats 2, 4, 6 as twins
        assert_eq!(count(&seats, SeatType::Twin), 3);
        assert_eq!(count(&seats, SeatType::Standard), 9);
        assert!(seats
            .iter()
            .filter(|s| s.seat_type == SeatType::Twin)
            .all(|s| s.row == 4 && s.number % 2 == 0));
    }

    #[test]
    fn test_refresh_default_layout() {
        let seats = SeatLayout::refresh_default(9, 13);
        assert_eq!(seats.len(), 117);

        let seat = |row: i32, number: i32| {
            seats
                .iter()
                .find(|s| s.row == row && s.number == number)
                .map(|s| s.seat_type)
                .unwrap()
        };
        assert_eq!(seat(1, 7), SeatType::Vip);
        assert_eq!(seat(2, 7), SeatType::Vip);
        assert_eq!(seat(5, 2), SeatType::Vip);
        assert_eq!(seat(5, 12), SeatType::Vip);
        assert_eq!(seat(5, 13), SeatType::Vip);
        assert_eq!(seat(5, 3), SeatType::Standard);
        assert_eq!(seat(5, 11), SeatType::Standard);
        // rows 1-2 fully VIP (26) plus 4 edge seats in each of rows 3-9 (28)
        assert_eq!(count(&seats, SeatType::Vip), 54);
    }

    #[test]
    fn test_empty_grid() {
        assert!(SeatLayout::standard(0, 10).is_empty());
        assert!(SeatLayout::refresh_default(-1, 10).is_empty());
    }
}
