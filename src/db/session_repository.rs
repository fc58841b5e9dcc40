// src/db/session_repository.rs
// DOCUMENTATION: Session (screening) database operations
// PURPOSE: Listings, admin CRUD, bulk inserts from the Apollo import and row locking for bookings

use crate::errors::CinemaError;
use crate::models::{NewSession, Session, SessionStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Rows per multi-row INSERT (12 binds each, well under the 65535 limit)
const INSERT_CHUNK: usize = 1000;

/// Filters for scheduled session listings
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub film_id: Option<Uuid>,
    pub hall_id: Option<Uuid>,
    /// Inclusive lower bound on start_time
    pub starts_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on start_time
    pub starts_before: Option<DateTime<Utc>>,
}

pub struct SessionRepository;

impl SessionRepository {
    /// Scheduled sessions matching the filter, earliest first
    pub async fn list_scheduled(
        pool: &PgPool,
        filter: &SessionFilter,
    ) -> Result<Vec<Session>, CinemaError> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT * FROM sessions
            WHERE status = $1
              AND ($2::uuid IS NULL OR film_id = $2)
              AND ($3::uuid IS NULL OR hall_id = $3)
              AND ($4::timestamptz IS NULL OR start_time >= $4)
              AND ($5::timestamptz IS NULL OR start_time < $5)
            ORDER BY start_time ASC
            "#,
        )
        .bind(SessionStatus::Scheduled.as_str())
        .bind(filter.film_id)
        .bind(filter.hall_id)
        .bind(filter.starts_from)
        .bind(filter.starts_before)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list sessions: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Every session, latest start first (admin listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Session>, CinemaError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions ORDER BY start_time DESC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list all sessions: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Session>, CinemaError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch session {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Session>, CinemaError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch sessions: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Load a session and hold its row lock until the transaction ends
    /// DOCUMENTATION: Serializes concurrent bookings of the same session
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Session>, CinemaError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to lock session {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn insert(pool: &PgPool, session: &NewSession) -> Result<Session, CinemaError> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (
                film_id, hall_id, start_time, end_time,
                price_standard, price_vip, price_student, price_child,
                is_3d, language, subtitles, available_seats, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(session.film_id)
        .bind(session.hall_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.price.standard)
        .bind(session.price.vip)
        .bind(session.price.student)
        .bind(session.price.child)
        .bind(session.is_3d)
        .bind(&session.language)
        .bind(&session.subtitles)
        .bind(session.available_seats)
        .bind(session.status.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create session: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Insert many sessions with multi-row INSERTs
    /// DOCUMENTATION: A failing chunk is logged and skipped; the count of
    /// inserted rows is returned
    pub async fn insert_many(pool: &PgPool, sessions: &[NewSession]) -> Result<u64, CinemaError> {
        let mut inserted = 0u64;

        for chunk in sessions.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO sessions (film_id, hall_id, start_time, end_time, \
                 price_standard, price_vip, price_student, price_child, \
                 is_3d, language, subtitles, available_seats, status) ",
            );
            builder.push_values(chunk, |mut row, session| {
                row.push_bind(session.film_id)
                    .push_bind(session.hall_id)
                    .push_bind(session.start_time)
                    .push_bind(session.end_time)
                    .push_bind(session.price.standard)
                    .push_bind(session.price.vip)
                    .push_bind(session.price.student)
                    .push_bind(session.price.child)
                    .push_bind(session.is_3d)
                    .push_bind(session.language.clone())
                    .push_bind(session.subtitles.clone())
                    .push_bind(session.available_seats)
                    .push_bind(session.status.as_str());
            });

            match builder.build().execute(pool).await {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    log::error!("Bulk session insert failed for {} rows: {}", chunk.len(), e);
                }
            }
        }

        Ok(inserted)
    }

    /// Overwrite every column of a session
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        session: &NewSession,
    ) -> Result<Option<Session>, CinemaError> {
        sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET film_id = $2,
                hall_id = $3,
                start_time = $4,
                end_time = $5,
                price_standard = $6,
                price_vip = $7,
                price_student = $8,
                price_child = $9,
                is_3d = $10,
                language = $11,
                subtitles = $12,
                available_seats = $13,
                status = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(session.film_id)
        .bind(session.hall_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.price.standard)
        .bind(session.price.vip)
        .bind(session.price.student)
        .bind(session.price.child)
        .bind(session.is_3d)
        .bind(&session.language)
        .bind(&session.subtitles)
        .bind(session.available_seats)
        .bind(session.status.as_str())
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update session {}: {}", id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, CinemaError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete session {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove sessions that started before `cutoff`; their bookings cascade
    pub async fn delete_started_before(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CinemaError> {
        let result = sqlx::query("DELETE FROM sessions WHERE start_time < $1")
            .bind(cutoff)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete past sessions: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }

    pub async fn count_for_film(pool: &PgPool, film_id: Uuid) -> Result<i64, CinemaError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE film_id = $1")
            .bind(film_id)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to count sessions of film {}: {}", film_id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn count_for_hall(pool: &PgPool, hall_id: Uuid) -> Result<i64, CinemaError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE hall_id = $1")
            .bind(hall_id)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to count sessions of hall {}: {}", hall_id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Take seats from a session's stored availability, stopping at zero
    pub async fn reserve_seats(
        conn: &mut PgConnection,
        id: Uuid,
        seats: i64,
    ) -> Result<(), CinemaError> {
        sqlx::query(
            "UPDATE sessions SET available_seats = GREATEST(available_seats - $2, 0) WHERE id = $1",
        )
        .bind(id)
        .bind(i32::try_from(seats).unwrap_or(i32::MAX))
        .execute(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to reserve seats for session {}: {}", id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Return seats to a session after a booking is removed
    pub async fn release_seats(
        conn: &mut PgConnection,
        id: Uuid,
        seats: i64,
    ) -> Result<(), CinemaError> {
        sqlx::query("UPDATE sessions SET available_seats = available_seats + $2 WHERE id = $1")
            .bind(id)
            .bind(i32::try_from(seats).unwrap_or(i32::MAX))
            .execute(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to release seats for session {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
