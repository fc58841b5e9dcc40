// src/db/booking_repository.rs
// DOCUMENTATION: Booking database operations
// PURPOSE: Occupied-seat queries, transactional booking writes and admin listings

use crate::errors::CinemaError;
use crate::models::{Booking, BookingStatus, NewBooking, SeatPosition};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct BookedSeatRow {
    booking_id: Uuid,
    #[sqlx(flatten)]
    seat: SeatPosition,
}

#[derive(Debug, FromRow)]
struct OccupancyRow {
    session_id: Uuid,
    occupied: i64,
}

pub struct BookingRepository;

impl BookingRepository {
    /// Seats held by pending or confirmed bookings of a session
    pub async fn occupied_seats(
        conn: &mut PgConnection,
        session_id: Uuid,
    ) -> Result<Vec<SeatPosition>, CinemaError> {
        sqlx::query_as::<_, SeatPosition>(
            r#"
            SELECT s."row", s.number
            FROM bookings b
            JOIN booking_seats bs ON bs.booking_id = b.id
            JOIN seats s ON s.id = bs.seat_id
            WHERE b.session_id = $1 AND b.status = ANY($2)
            ORDER BY s."row", s.number
            "#,
        )
        .bind(session_id)
        .bind(BookingStatus::active_values())
        .fetch_all(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to load occupied seats of session {}: {}", session_id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Seat counts held by active bookings, per session
    pub async fn occupied_counts(
        pool: &PgPool,
        session_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, CinemaError> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OccupancyRow>(
            r#"
            SELECT b.session_id, COUNT(bs.seat_id) AS occupied
            FROM bookings b
            JOIN booking_seats bs ON bs.booking_id = b.id
            WHERE b.session_id = ANY($1) AND b.status = ANY($2)
            GROUP BY b.session_id
            "#,
        )
        .bind(session_ids)
        .bind(BookingStatus::active_values())
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to count occupied seats: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|r| (r.session_id, r.occupied)).collect())
    }

    pub async fn count_active_for_session(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<i64, CinemaError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE session_id = $1 AND status = ANY($2)",
        )
        .bind(session_id)
        .bind(BookingStatus::active_values())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to count bookings of session {}: {}", session_id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    pub async fn number_exists(
        conn: &mut PgConnection,
        booking_number: &str,
    ) -> Result<bool, CinemaError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM bookings WHERE booking_number = $1)",
        )
        .bind(booking_number)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to check booking number {}: {}", booking_number, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Insert a booking and link its seats
    pub async fn insert(
        conn: &mut PgConnection,
        booking: &NewBooking,
        seat_ids: &[Uuid],
    ) -> Result<Booking, CinemaError> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                user_id, session_id, total_price, booking_number, status,
                payment_status, payment_method, contact_email, contact_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.session_id)
        .bind(booking.total_price)
        .bind(&booking.booking_number)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_method.map(|m| m.as_str()))
        .bind(&booking.contact_email)
        .bind(&booking.contact_phone)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to create booking {}: {}", booking.booking_number, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO booking_seats (booking_id, seat_id)
            SELECT $1, seat_id FROM UNNEST($2::uuid[]) AS t(seat_id)
            "#,
        )
        .bind(created.id)
        .bind(seat_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to link seats to booking {}: {}", created.id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        Ok(created)
    }

    pub async fn find_by_number(
        pool: &PgPool,
        booking_number: &str,
    ) -> Result<Option<Booking>, CinemaError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_number = $1")
            .bind(booking_number)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch booking {}: {}", booking_number, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Every booking, newest first (admin listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Booking>, CinemaError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list bookings: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Seat positions per booking
    pub async fn seats_for(
        pool: &PgPool,
        booking_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<SeatPosition>>, CinemaError> {
        if booking_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, BookedSeatRow>(
            r#"
            SELECT bs.booking_id, s."row", s.number
            FROM booking_seats bs
            JOIN seats s ON s.id = bs.seat_id
            WHERE bs.booking_id = ANY($1)
            ORDER BY s."row", s.number
            "#,
        )
        .bind(booking_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to load booked seats: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        let mut seats: HashMap<Uuid, Vec<SeatPosition>> = HashMap::new();
        for booked in rows {
            seats.entry(booked.booking_id).or_default().push(booked.seat);
        }
        Ok(seats)
    }

    /// Lock a booking row and return it with its seat count
    pub async fn lock_with_seat_count(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<(Booking, i64)>, CinemaError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                log::error!("Failed to lock booking {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        let Some(booking) = booking else {
            return Ok(None);
        };

        let seats = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM booking_seats WHERE booking_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to count seats of booking {}: {}", id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        Ok(Some((booking, seats)))
    }

    /// Delete a booking; booking_seats rows cascade
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), CinemaError> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to delete booking {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
