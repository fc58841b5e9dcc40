// src/db/user_repository.rs
// DOCUMENTATION: User lookups
// PURPOSE: Attach optional users to bookings; accounts themselves are managed elsewhere

use crate::errors::CinemaError;
use crate::models::UserSummary;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    pub async fn exists(conn: &mut PgConnection, id: Uuid) -> Result<bool, CinemaError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to check user {}: {}", id, e);
                CinemaError::DatabaseError(e.to_string())
            })
    }

    pub async fn summaries(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserSummary>, CinemaError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch users: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}
