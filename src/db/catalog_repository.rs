// src/db/catalog_repository.rs
// DOCUMENTATION: Whole-catalogue maintenance
// PURPOSE: Clear imported data before a refresh and report table counts

use crate::errors::CinemaError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Row counts after an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CatalogCounts {
    pub cinemas: i64,
    pub halls: i64,
    pub films: i64,
    pub sessions: i64,
}

pub struct CatalogRepository;

impl CatalogRepository {
    /// Remove bookings, seats, sessions, films, halls and cinemas
    /// DOCUMENTATION: Users are kept
    pub async fn clear(pool: &PgPool) -> Result<(), CinemaError> {
        sqlx::query("TRUNCATE booking_seats, bookings, seats, sessions, films, halls, cinemas")
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to clear catalogue: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        log::info!("Cleared cinemas, halls, seats, films, sessions and bookings");
        Ok(())
    }

    pub async fn counts(pool: &PgPool) -> Result<CatalogCounts, CinemaError> {
        sqlx::query_as::<_, CatalogCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cinemas) AS cinemas,
                (SELECT COUNT(*) FROM halls) AS halls,
                (SELECT COUNT(*) FROM films) AS films,
                (SELECT COUNT(*) FROM sessions) AS sessions
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to count catalogue rows: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })
    }
}
