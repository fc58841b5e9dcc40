// src/db/cinema_repository.rs
// DOCUMENTATION: Cinema database operations
// PURPOSE: Lookup and upsert of cinemas, keyed by UUID or Apollo TheatreArea ID

use crate::errors::CinemaError;
use crate::models::{Cinema, CinemaSummary, NewCinema};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

pub struct CinemaRepository;

impl CinemaRepository {
    /// All cinemas ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Cinema>, CinemaError> {
        sqlx::query_as::<_, Cinema>("SELECT * FROM cinemas ORDER BY name ASC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list cinemas: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Cinema>, CinemaError> {
        sqlx::query_as::<_, Cinema>("SELECT * FROM cinemas WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch cinema {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_apollo_id(
        pool: &PgPool,
        apollo_id: &str,
    ) -> Result<Option<Cinema>, CinemaError> {
        sqlx::query_as::<_, Cinema>("SELECT * FROM cinemas WHERE apollo_id = $1")
            .bind(apollo_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch cinema by apollo_id {}: {}", apollo_id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Resolve a path identifier that is either a UUID or an Apollo ID
    /// DOCUMENTATION: Used by GET /api/cinemas/{id}/halls
    pub async fn find_by_id_or_apollo_id(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Cinema>, CinemaError> {
        if let Ok(id) = Uuid::parse_str(identifier) {
            if let Some(cinema) = Self::find_by_id(pool, id).await? {
                return Ok(Some(cinema));
            }
        }
        Self::find_by_apollo_id(pool, identifier.trim()).await
    }

    /// Cinema summaries for a set of IDs
    pub async fn summaries(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, CinemaSummary>, CinemaError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cinemas = sqlx::query_as::<_, Cinema>("SELECT * FROM cinemas WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch cinema summaries: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(cinemas.iter().map(|c| (c.id, c.to_summary())).collect())
    }

    pub async fn insert(pool: &PgPool, cinema: &NewCinema) -> Result<Cinema, CinemaError> {
        let created = sqlx::query_as::<_, Cinema>(
            r#"
            INSERT INTO cinemas (name, street, city, postal_code, country, phone, email, facilities, apollo_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&cinema.name)
        .bind(&cinema.address.street)
        .bind(&cinema.address.city)
        .bind(&cinema.address.postal_code)
        .bind(&cinema.address.country)
        .bind(&cinema.phone)
        .bind(&cinema.email)
        .bind(&cinema.facilities)
        .bind(&cinema.apollo_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create cinema {}: {}", cinema.name, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        log::debug!("Created cinema {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Insert or update a cinema identified by its Apollo ID
    /// DOCUMENTATION: Returns the stored cinema and whether it was created
    pub async fn upsert_by_apollo_id(
        pool: &PgPool,
        cinema: &NewCinema,
    ) -> Result<(Cinema, bool), CinemaError> {
        let Some(apollo_id) = cinema.apollo_id.as_deref() else {
            return Ok((Self::insert(pool, cinema).await?, true));
        };

        let updated = sqlx::query_as::<_, Cinema>(
            r#"
            UPDATE cinemas
            SET name = $1,
                street = $2,
                city = $3,
                postal_code = $4,
                country = $5,
                phone = $6,
                email = $7,
                facilities = $8
            WHERE apollo_id = $9
            RETURNING *
            "#,
        )
        .bind(&cinema.name)
        .bind(&cinema.address.street)
        .bind(&cinema.address.city)
        .bind(&cinema.address.postal_code)
        .bind(&cinema.address.country)
        .bind(&cinema.phone)
        .bind(&cinema.email)
        .bind(&cinema.facilities)
        .bind(apollo_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update cinema {}: {}", apollo_id, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        match updated {
            Some(existing) => Ok((existing, false)),
            None => Ok((Self::insert(pool, cinema).await?, true)),
        }
    }
}
