// src/db/hall_repository.rs
// DOCUMENTATION: Hall database operations
// PURPOSE: CRUD for halls and hall lookups used by the Apollo import

use crate::errors::CinemaError;
use crate::models::{Hall, HallChanges, NewHall};
use sqlx::PgPool;
use uuid::Uuid;

pub struct HallRepository;

impl HallRepository {
    /// All halls, oldest first (stable order for round-robin assignment)
    pub async fn list(pool: &PgPool) -> Result<Vec<Hall>, CinemaError> {
        sqlx::query_as::<_, Hall>("SELECT * FROM halls ORDER BY created_at ASC, name ASC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list halls: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn list_by_cinema(pool: &PgPool, cinema_id: Uuid) -> Result<Vec<Hall>, CinemaError> {
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE cinema_id = $1 ORDER BY name ASC")
            .bind(cinema_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list halls for cinema {}: {}", cinema_id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Hall>, CinemaError> {
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch hall {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Hall>, CinemaError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch halls: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_cinema_and_name(
        pool: &PgPool,
        cinema_id: Uuid,
        name: &str,
    ) -> Result<Option<Hall>, CinemaError> {
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE cinema_id = $1 AND name = $2")
            .bind(cinema_id)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch hall {} of cinema {}: {}", name, cinema_id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn insert(pool: &PgPool, hall: &NewHall) -> Result<Hall, CinemaError> {
        sqlx::query_as::<_, Hall>(
            r#"
            INSERT INTO halls (cinema_id, name, capacity, rows, seats_per_row, screen_type, sound_system)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(hall.cinema_id)
        .bind(&hall.name)
        .bind(hall.capacity)
        .bind(hall.rows)
        .bind(hall.seats_per_row)
        .bind(hall.screen_type.as_str())
        .bind(hall.sound_system.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create hall {}: {}", hall.name, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Apply a partial update; absent fields keep their stored values
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &HallChanges,
    ) -> Result<Option<Hall>, CinemaError> {
        sqlx::query_as::<_, Hall>(
            r#"
            UPDATE halls
            SET cinema_id = COALESCE($2, cinema_id),
                name = COALESCE($3, name),
                capacity = COALESCE($4, capacity),
                rows = COALESCE($5, rows),
                seats_per_row = COALESCE($6, seats_per_row),
                screen_type = COALESCE($7, screen_type),
                sound_system = COALESCE($8, sound_system)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.cinema_id)
        .bind(&changes.name)
        .bind(changes.capacity)
        .bind(changes.rows)
        .bind(changes.seats_per_row)
        .bind(changes.screen_type.map(|s| s.as_str()))
        .bind(changes.sound_system.map(|s| s.as_str()))
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update hall {}: {}", id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Delete a hall; its seats go with it (ON DELETE CASCADE)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, CinemaError> {
        let result = sqlx::query("DELETE FROM halls WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete hall {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
