// src/db/film_repository.rs
// DOCUMENTATION: Film database operations
// PURPOSE: Catalogue queries, admin CRUD and Apollo film matching

use crate::errors::CinemaError;
use crate::models::{Film, FilmQuery, NewFilm};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FilmRepository;

impl FilmRepository {
    /// Active films, newest release first
    /// DOCUMENTATION: Used by GET /api/films; genre matches any element of the
    /// genre array, a missing limit returns everything
    pub async fn list_active(pool: &PgPool, query: &FilmQuery) -> Result<Vec<Film>, CinemaError> {
        sqlx::query_as::<_, Film>(
            r#"
            SELECT * FROM films
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR $1 = ANY(genre))
              AND ($2::text IS NULL OR age_rating = $2)
            ORDER BY release_date DESC
            LIMIT $3
            "#,
        )
        .bind(&query.genre)
        .bind(&query.age_rating)
        .bind(query.limit.filter(|l| *l > 0))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list films: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    /// Every film, newest first (admin listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Film>, CinemaError> {
        sqlx::query_as::<_, Film>("SELECT * FROM films ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list all films: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Films in insertion order, input for session planning
    pub async fn list_for_planning(pool: &PgPool) -> Result<Vec<Film>, CinemaError> {
        sqlx::query_as::<_, Film>("SELECT * FROM films ORDER BY created_at ASC, title ASC")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list films for planning: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Film>, CinemaError> {
        sqlx::query_as::<_, Film>("SELECT * FROM films WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch film {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Film>, CinemaError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Film>("SELECT * FROM films WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch films: {}", e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    /// Existing film for an Apollo event: by apollo id, then by original title
    pub async fn find_for_event(
        pool: &PgPool,
        apollo_id: Option<&str>,
        original_title: Option<&str>,
    ) -> Result<Option<Film>, CinemaError> {
        sqlx::query_as::<_, Film>(
            r#"
            SELECT * FROM films
            WHERE ($1::text IS NOT NULL AND apollo_id = $1)
               OR ($2::text IS NOT NULL AND original_title = $2)
            ORDER BY (apollo_id IS NOT DISTINCT FROM $1) DESC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(apollo_id)
        .bind(original_title)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to match film for event {:?}: {}", apollo_id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    pub async fn insert(pool: &PgPool, film: &NewFilm) -> Result<Film, CinemaError> {
        let created = sqlx::query_as::<_, Film>(
            r#"
            INSERT INTO films (
                title, original_title, description, duration, genre,
                director, cast_members, release_date, language, subtitles,
                age_rating, poster_url, trailer_url, rating, is_active,
                apollo_id, production_year, event_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(&film.title) // $1
        .bind(&film.original_title) // $2
        .bind(&film.description) // $3
        .bind(film.duration) // $4
        .bind(&film.genre) // $5
        .bind(&film.director) // $6
        .bind(&film.cast_members) // $7
        .bind(film.release_date) // $8
        .bind(&film.language) // $9
        .bind(&film.subtitles) // $10
        .bind(&film.age_rating) // $11
        .bind(&film.poster_url) // $12
        .bind(&film.trailer_url) // $13
        .bind(film.rating) // $14
        .bind(film.is_active) // $15
        .bind(&film.apollo_id) // $16
        .bind(film.production_year) // $17
        .bind(&film.event_url) // $18
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create film {}: {}", film.title, e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        log::debug!("Created film {} ({})", created.title, created.id);
        Ok(created)
    }

    /// Overwrite every column of a film
    pub async fn update(pool: &PgPool, id: Uuid, film: &NewFilm) -> Result<Option<Film>, CinemaError> {
        sqlx::query_as::<_, Film>(
            r#"
            UPDATE films
            SET title = $2,
                original_title = $3,
                description = $4,
                duration = $5,
                genre = $6,
                director = $7,
                cast_members = $8,
                release_date = $9,
                language = $10,
                subtitles = $11,
                age_rating = $12,
                poster_url = $13,
                trailer_url = $14,
                rating = $15,
                is_active = $16,
                apollo_id = $17,
                production_year = $18,
                event_url = $19
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&film.title)
        .bind(&film.original_title)
        .bind(&film.description)
        .bind(film.duration)
        .bind(&film.genre)
        .bind(&film.director)
        .bind(&film.cast_members)
        .bind(film.release_date)
        .bind(&film.language)
        .bind(&film.subtitles)
        .bind(&film.age_rating)
        .bind(&film.poster_url)
        .bind(&film.trailer_url)
        .bind(film.rating)
        .bind(film.is_active)
        .bind(&film.apollo_id)
        .bind(film.production_year)
        .bind(&film.event_url)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update film {}: {}", id, e);
            CinemaError::DatabaseError(e.to_string())
        })
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, CinemaError> {
        let result = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete film {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
