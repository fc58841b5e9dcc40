// src/db/seat_repository.rs
// DOCUMENTATION: Seat database operations
// PURPOSE: Seat layout regeneration and seat lookups for seat maps and bookings

use crate::errors::CinemaError;
use crate::models::{Seat, SeatPosition, SeatSpec};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct SeatRepository;

impl SeatRepository {
    /// Active seats of a hall in row/number order
    pub async fn list_active(pool: &PgPool, hall_id: Uuid) -> Result<Vec<Seat>, CinemaError> {
        sqlx::query_as::<_, Seat>(
            r#"
            SELECT * FROM seats
            WHERE hall_id = $1 AND is_active = TRUE
            ORDER BY "row" ASC, number ASC
            "#,
        )
        .bind(hall_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list seats for hall {}: {}", hall_id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Write a full rows x seats_per_row layout for a hall
    /// DOCUMENTATION: Seats inside the grid are upserted and reactivated.
    /// Seats outside it are deleted, or deactivated when a booking still
    /// references them. Returns the number of seats written.
    pub async fn replace_layout(
        pool: &PgPool,
        hall_id: Uuid,
        rows: i32,
        seats_per_row: i32,
        layout: &[SeatSpec],
    ) -> Result<usize, CinemaError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to start seat layout transaction: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        let row_values: Vec<i32> = layout.iter().map(|s| s.row).collect();
        let number_values: Vec<i32> = layout.iter().map(|s| s.number).collect();
        let type_values: Vec<String> = layout
            .iter()
            .map(|s| s.seat_type.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO seats (hall_id, "row", number, seat_type, is_active)
            SELECT $1, r, n, t, TRUE
            FROM UNNEST($2::int4[], $3::int4[], $4::text[]) AS layout(r, n, t)
            ON CONFLICT (hall_id, "row", number) DO UPDATE
            SET seat_type = EXCLUDED.seat_type,
                is_active = TRUE
            "#,
        )
        .bind(hall_id)
        .bind(&row_values)
        .bind(&number_values)
        .bind(&type_values)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to write seat layout for hall {}: {}", hall_id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            r#"
            DELETE FROM seats s
            WHERE s.hall_id = $1
              AND (s."row" > $2 OR s.number > $3)
              AND NOT EXISTS (SELECT 1 FROM booking_seats bs WHERE bs.seat_id = s.id)
            "#,
        )
        .bind(hall_id)
        .bind(rows)
        .bind(seats_per_row)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to remove stale seats for hall {}: {}", hall_id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            r#"
            UPDATE seats SET is_active = FALSE
            WHERE hall_id = $1 AND ("row" > $2 OR number > $3)
            "#,
        )
        .bind(hall_id)
        .bind(rows)
        .bind(seats_per_row)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to deactivate stale seats for hall {}: {}", hall_id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit seat layout for hall {}: {}", hall_id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        log::debug!("Wrote {} seats for hall {}", layout.len(), hall_id);
        Ok(layout.len())
    }

    /// Seat IDs for booked positions, creating missing seat rows
    /// DOCUMENTATION: Runs inside the booking transaction
    pub async fn upsert_positions(
        conn: &mut PgConnection,
        hall_id: Uuid,
        seats: &[SeatPosition],
    ) -> Result<Vec<Uuid>, CinemaError> {
        let mut ids = Vec::with_capacity(seats.len());

        for seat in seats {
            let (id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO seats (hall_id, "row", number)
                VALUES ($1, $2, $3)
                ON CONFLICT (hall_id, "row", number) DO UPDATE
                SET hall_id = EXCLUDED.hall_id
                RETURNING id
                "#,
            )
            .bind(hall_id)
            .bind(seat.row)
            .bind(seat.number)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                log::error!("Failed to upsert seat {} in hall {}: {}", seat.key(), hall_id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;
            ids.push(id);
        }

        Ok(ids)
    }
}
