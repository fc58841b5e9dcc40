// src/services/admin_service.rs
// DOCUMENTATION: Business logic behind the admin API
// PURPOSE: Film, session and hall management with referential checks

use crate::db::{
    BookingRepository, CinemaRepository, FilmRepository, HallRepository, SeatRepository,
    SessionRepository,
};
use crate::errors::CinemaError;
use crate::models::{
    CreateFilmRequest, CreateSessionRequest, Film, Hall, HallChanges, HallRequest,
    HallWithCinema, NewHall, NewSession, Seat, SeatLayoutRequest, SeatStats, ScreenType,
    SessionListItem, SoundSystem, UpdateFilmRequest, UpdateSessionRequest,
};
use crate::services::catalog_service::parse_id;
use crate::services::date_range::parse_timestamp;
use crate::services::{CatalogService, SeatLayout};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

/// Hall with its active seats and seat counts
#[derive(Debug, Clone, Serialize)]
pub struct HallSeats {
    pub hall: HallWithCinema,
    pub seats: Vec<Seat>,
    pub stats: SeatStats,
}

/// Outcome of a seat layout regeneration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLayoutResult {
    pub hall_id: uuid::Uuid,
    pub rows: i32,
    pub seats_per_row: i32,
    #[serde(flatten)]
    pub stats: SeatStats,
}

fn parse_time(value: &str, field: &str) -> Result<DateTime<Utc>, CinemaError> {
    parse_timestamp(value).ok_or_else(|| CinemaError::InvalidInput(format!("Invalid {}", field)))
}

fn check_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CinemaError> {
    if end <= start {
        return Err(CinemaError::InvalidInput(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}

/// Grid dimensions and capacity must all be positive
fn check_hall_numbers(rows: i32, seats_per_row: i32, capacity: i32) -> Result<(), CinemaError> {
    if rows < 1 || seats_per_row < 1 || capacity < 1 {
        return Err(CinemaError::ValidationError(
            "rows, seatsPerRow and capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub struct AdminService;

impl AdminService {
    // ---- Films ----

    pub async fn list_films(pool: &PgPool) -> Result<Vec<Film>, CinemaError> {
        FilmRepository::list_all(pool).await
    }

    pub async fn create_film(pool: &PgPool, req: CreateFilmRequest) -> Result<Film, CinemaError> {
        req.validate()
            .map_err(|e| CinemaError::ValidationError(e.to_string()))?;

        let film = FilmRepository::insert(pool, &req.into_new_film()).await?;
        log::info!("Admin created film {} ({})", film.title, film.id);
        Ok(film)
    }

    pub async fn update_film(
        pool: &PgPool,
        id: &str,
        req: UpdateFilmRequest,
    ) -> Result<Film, CinemaError> {
        let id = parse_id(id, "movie")?;
        req.validate()
            .map_err(|e| CinemaError::ValidationError(e.to_string()))?;

        let not_found = || CinemaError::NotFound("Movie not found".to_string());
        let film = FilmRepository::find_by_id(pool, id).await?.ok_or_else(not_found)?;

        FilmRepository::update(pool, id, &req.apply_to(&film))
            .await?
            .ok_or_else(not_found)
    }

    /// Delete a film that no session references
    pub async fn delete_film(pool: &PgPool, id: &str) -> Result<(), CinemaError> {
        let id = parse_id(id, "movie")?;
        FilmRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Movie not found".to_string()))?;

        let sessions = SessionRepository::count_for_film(pool, id).await?;
        if sessions > 0 {
            return Err(CinemaError::InvalidInput(format!(
                "Cannot delete movie with {} session(s).",
                sessions
            )));
        }

        FilmRepository::delete(pool, id).await?;
        log::info!("Admin deleted film {}", id);
        Ok(())
    }

    // ---- Sessions ----

    /// Every session, latest first, film and hall expanded
    pub async fn list_sessions(pool: &PgPool) -> Result<Vec<SessionListItem>, CinemaError> {
        let sessions = SessionRepository::list_all(pool).await?;
        CatalogService::expand_sessions(pool, &sessions, false).await
    }

    pub async fn get_session(pool: &PgPool, id: &str) -> Result<SessionListItem, CinemaError> {
        let id = parse_id(id, "session")?;
        let session = SessionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Session not found".to_string()))?;

        Self::expanded(pool, session).await
    }

    async fn expanded(
        pool: &PgPool,
        session: crate::models::Session,
    ) -> Result<SessionListItem, CinemaError> {
        CatalogService::expand_sessions(pool, std::slice::from_ref(&session), false)
            .await?
            .pop()
            .ok_or_else(|| CinemaError::NotFound("Session not found".to_string()))
    }

    async fn existing_film(pool: &PgPool, id: &str) -> Result<Film, CinemaError> {
        let id = parse_id(id, "film")?;
        FilmRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Film not found".to_string()))
    }

    async fn existing_hall(pool: &PgPool, id: &str) -> Result<Hall, CinemaError> {
        let id = parse_id(id, "hall")?;
        HallRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Hall not found".to_string()))
    }

    /// Create a session
    /// DOCUMENTATION: Starts with the full hall capacity available
    pub async fn create_session(
        pool: &PgPool,
        req: CreateSessionRequest,
    ) -> Result<SessionListItem, CinemaError> {
        let required = || {
            CinemaError::InvalidInput(
                "film, hall, startTime, endTime, and price.standard are required".to_string(),
            )
        };

        let film_id = req.film.as_deref().filter(|v| !v.is_empty()).ok_or_else(required)?;
        let hall_id = req.hall.as_deref().filter(|v| !v.is_empty()).ok_or_else(required)?;
        let start_time = req.start_time.as_deref().filter(|v| !v.is_empty()).ok_or_else(required)?;
        let end_time = req.end_time.as_deref().filter(|v| !v.is_empty()).ok_or_else(required)?;
        let price = req.price.filter(|p| p.standard != 0.0).ok_or_else(required)?;

        req.validate()
            .map_err(|e| CinemaError::ValidationError(e.to_string()))?;

        parse_id(film_id, "film")?;
        parse_id(hall_id, "hall")?;
        let film = Self::existing_film(pool, film_id).await?;
        let hall = Self::existing_hall(pool, hall_id).await?;

        let start = parse_time(start_time, "startTime")?;
        let end = parse_time(end_time, "endTime")?;
        check_time_range(start, end)?;

        let new_session = NewSession {
            film_id: film.id,
            hall_id: hall.id,
            start_time: start,
            end_time: end,
            price,
            is_3d: req.is_3d.unwrap_or(false),
            language: req.language.or(Some(film.language)),
            subtitles: Some(req.subtitles.unwrap_or_default()),
            available_seats: hall.capacity,
            status: req.status.unwrap_or_default(),
        };

        let session = SessionRepository::insert(pool, &new_session).await?;
        log::info!("Admin created session {} for film {}", session.id, film.id);
        Self::expanded(pool, session).await
    }

    /// Partial session update
    /// DOCUMENTATION: Moving to another hall resets availableSeats to its
    /// capacity unless availableSeats is part of the update
    pub async fn update_session(
        pool: &PgPool,
        id: &str,
        req: UpdateSessionRequest,
    ) -> Result<SessionListItem, CinemaError> {
        let id = parse_id(id, "session")?;
        let session = SessionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Session not found".to_string()))?;

        if let Some(film) = req.film.as_deref() {
            parse_id(film, "film")?;
        }
        if let Some(hall) = req.hall.as_deref() {
            parse_id(hall, "hall")?;
        }
        req.validate()
            .map_err(|e| CinemaError::ValidationError(e.to_string()))?;

        let mut updated = session.to_new_session();

        if let Some(film) = req.film.as_deref() {
            updated.film_id = Self::existing_film(pool, film).await?.id;
        }
        if let Some(hall) = req.hall.as_deref() {
            let hall = Self::existing_hall(pool, hall).await?;
            updated.hall_id = hall.id;
            if req.available_seats.is_none() {
                updated.available_seats = hall.capacity;
            }
        }

        let new_start = req.start_time.as_deref().map(|v| parse_time(v, "startTime")).transpose()?;
        let new_end = req.end_time.as_deref().map(|v| parse_time(v, "endTime")).transpose()?;
        if new_start.is_some() || new_end.is_some() {
            updated.start_time = new_start.unwrap_or(updated.start_time);
            updated.end_time = new_end.unwrap_or(updated.end_time);
            check_time_range(updated.start_time, updated.end_time)?;
        }

        if let Some(price) = req.price {
            updated.price = price;
        }
        if let Some(is_3d) = req.is_3d {
            updated.is_3d = is_3d;
        }
        if let Some(language) = req.language {
            updated.language = Some(language);
        }
        if let Some(subtitles) = req.subtitles {
            updated.subtitles = Some(subtitles);
        }
        if let Some(status) = req.status {
            updated.status = status;
        }
        if let Some(available) = req.available_seats {
            updated.available_seats = available;
        }

        let saved = SessionRepository::update(pool, id, &updated)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Session not found".to_string()))?;
        Self::expanded(pool, saved).await
    }

    /// Delete a session without active bookings
    pub async fn delete_session(pool: &PgPool, id: &str) -> Result<(), CinemaError> {
        let id = parse_id(id, "session")?;
        SessionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Session not found".to_string()))?;

        let active = BookingRepository::count_active_for_session(pool, id).await?;
        if active > 0 {
            return Err(CinemaError::InvalidInput(format!(
                "Cannot delete session with {} active booking(s). Cancel bookings first.",
                active
            )));
        }

        SessionRepository::delete(pool, id).await?;
        log::info!("Admin deleted session {}", id);
        Ok(())
    }

    // ---- Halls ----

    /// Halls ordered by cinema name, then hall name
    pub async fn list_halls(pool: &PgPool) -> Result<Vec<HallWithCinema>, CinemaError> {
        let halls = HallRepository::list(pool).await?;
        let cinemas = CatalogService::cinemas_for_halls(pool, &halls).await?;

        let mut listed: Vec<HallWithCinema> = halls
            .into_iter()
            .map(|hall| {
                let cinema = cinemas.get(&hall.cinema_id).cloned();
                hall.with_cinema(cinema)
            })
            .collect();
        listed.sort_by(|a, b| {
            let cinema_a = a.cinema.as_ref().map(|c| c.name.as_str()).unwrap_or("");
            let cinema_b = b.cinema.as_ref().map(|c| c.name.as_str()).unwrap_or("");
            cinema_a.cmp(cinema_b).then_with(|| a.name.cmp(&b.name))
        });
        Ok(listed)
    }

    async fn with_cinema(pool: &PgPool, hall: Hall) -> Result<HallWithCinema, CinemaError> {
        let cinema = CinemaRepository::find_by_id(pool, hall.cinema_id).await?;
        Ok(hall.with_cinema(cinema.map(|c| c.to_summary())))
    }

    async fn existing_cinema(pool: &PgPool, id: &str) -> Result<uuid::Uuid, CinemaError> {
        let id = parse_id(id, "cinema")?;
        CinemaRepository::find_by_id(pool, id)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| CinemaError::NotFound("Cinema not found".to_string()))
    }

    /// Create a hall and its standard seat grid
    pub async fn create_hall(pool: &PgPool, req: HallRequest) -> Result<HallWithCinema, CinemaError> {
        let (Some(cinema), Some(name), Some(rows), Some(seats_per_row), Some(capacity)) = (
            req.cinema.as_deref().filter(|v| !v.is_empty()),
            req.name.as_deref().map(str::trim).filter(|v| !v.is_empty()),
            req.rows.filter(|v| *v != 0),
            req.seats_per_row.filter(|v| *v != 0),
            req.capacity.filter(|v| *v != 0),
        ) else {
            return Err(CinemaError::InvalidInput(
                "Missing required fields: cinema, name, rows, seatsPerRow, capacity".to_string(),
            ));
        };
        check_hall_numbers(rows, seats_per_row, capacity)?;
        let cinema_id = Self::existing_cinema(pool, cinema).await?;

        let hall = HallRepository::insert(
            pool,
            &NewHall {
                cinema_id,
                name: name.to_string(),
                capacity,
                rows,
                seats_per_row,
                screen_type: req.screen_type.unwrap_or(ScreenType::Standard),
                sound_system: req.sound_system.unwrap_or(SoundSystem::Digital51),
            },
        )
        .await?;

        let layout = SeatLayout::standard(hall.rows, hall.seats_per_row);
        SeatRepository::replace_layout(pool, hall.id, hall.rows, hall.seats_per_row, &layout).await?;

        log::info!("Admin created hall {} ({})", hall.name, hall.id);
        Self::with_cinema(pool, hall).await
    }

    /// Partial hall update; seats are regenerated when the grid changes
    pub async fn update_hall(
        pool: &PgPool,
        id: &str,
        req: HallRequest,
    ) -> Result<HallWithCinema, CinemaError> {
        let hall = Self::existing_hall(pool, id).await?;

        let cinema_id = match req.cinema.as_deref().filter(|v| !v.is_empty()) {
            Some(cinema) => Some(Self::existing_cinema(pool, cinema).await?),
            None => None,
        };

        let changes = HallChanges {
            cinema_id,
            name: req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            capacity: req.capacity.filter(|v| *v != 0),
            rows: req.rows.filter(|v| *v != 0),
            seats_per_row: req.seats_per_row.filter(|v| *v != 0),
            screen_type: req.screen_type,
            sound_system: req.sound_system,
        };
        check_hall_numbers(
            changes.rows.unwrap_or(hall.rows),
            changes.seats_per_row.unwrap_or(hall.seats_per_row),
            changes.capacity.unwrap_or(hall.capacity),
        )?;

        let updated = HallRepository::update(pool, hall.id, &changes)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Hall not found".to_string()))?;

        if changes.changes_layout() {
            let layout = SeatLayout::standard(updated.rows, updated.seats_per_row);
            SeatRepository::replace_layout(pool, updated.id, updated.rows, updated.seats_per_row, &layout)
                .await?;
        }

        Self::with_cinema(pool, updated).await
    }

    /// Delete a hall that no session uses; its seats go with it
    pub async fn delete_hall(pool: &PgPool, id: &str) -> Result<(), CinemaError> {
        let hall = Self::existing_hall(pool, id).await?;

        let sessions = SessionRepository::count_for_hall(pool, hall.id).await?;
        if sessions > 0 {
            return Err(CinemaError::InvalidInput(format!(
                "Cannot delete hall. It has {} session(s) scheduled. Please delete or reassign those sessions first.",
                sessions
            )));
        }

        HallRepository::delete(pool, hall.id).await?;
        log::info!("Admin deleted hall {} ({})", hall.name, hall.id);
        Ok(())
    }

    pub async fn hall_seats(pool: &PgPool, id: &str) -> Result<HallSeats, CinemaError> {
        let hall = Self::existing_hall(pool, id).await?;
        let seats = SeatRepository::list_active(pool, hall.id).await?;
        let stats = SeatStats::from_types(seats.iter().map(|s| s.seat_type.as_str()));

        Ok(HallSeats {
            hall: Self::with_cinema(pool, hall).await?,
            seats,
            stats,
        })
    }

    /// Rewrite a hall's seats with VIP and twin rows
    pub async fn generate_seats(
        pool: &PgPool,
        id: &str,
        req: SeatLayoutRequest,
    ) -> Result<SeatLayoutResult, CinemaError> {
        let hall = Self::existing_hall(pool, id).await?;

        let vip_rows = SeatLayout::parse_row_config(req.vip_rows.as_ref());
        let twin_rows = SeatLayout::parse_row_config(req.twin_rows.as_ref());
        let layout = SeatLayout::custom(hall.rows, hall.seats_per_row, &vip_rows, &twin_rows);

        SeatRepository::replace_layout(pool, hall.id, hall.rows, hall.seats_per_row, &layout).await?;

        log::info!(
            "Regenerated {} seats for hall {} (vip rows {:?}, twin rows {:?})",
            layout.len(),
            hall.id,
            vip_rows,
            twin_rows
        );

        Ok(SeatLayoutResult {
            hall_id: hall.id,
            rows: hall.rows,
            seats_per_row: hall.seats_per_row,
            stats: SeatStats::from_types(layout.iter().map(|s| s.seat_type.as_str())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    #[test]
    fn test_time_range() {
        let start = Utc::now();
        assert!(check_time_range(start, start + Duration::minutes(90)).is_ok());

        let err = check_time_range(start, start).unwrap_err();
        assert_eq!(err.to_string(), "End time must be after start time");
    }

    #[test]
    fn test_hall_numbers() {
        assert!(check_hall_numbers(10, 12, 120).is_ok());
        assert!(check_hall_numbers(-1, 12, 120).is_err());
        assert!(check_hall_numbers(10, 12, 0).is_err());
    }

    #[actix_web::test]
    async fn test_create_session_requires_fields() {
        let pool = lazy_pool();
        let err = AdminService::create_session(
            &pool,
            CreateSessionRequest {
                film: Some("x".into()),
                hall: Some("y".into()),
                start_time: Some("2030-01-01T10:00:00Z".into()),
                end_time: Some("2030-01-01T12:00:00Z".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "film, hall, startTime, endTime, and price.standard are required"
        );
    }

    #[actix_web::test]
    async fn test_create_hall_requires_fields() {
        let pool = lazy_pool();
        let err = AdminService::create_hall(
            &pool,
            HallRequest {
                name: Some("Hall 9".into()),
                rows: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required fields: cinema, name, rows, seatsPerRow, capacity"
        );
    }

    #[actix_web::test]
    async fn test_malformed_ids() {
        let pool = lazy_pool();

        let err = AdminService::delete_film(&pool, "42").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid movie ID");

        let err = AdminService::delete_hall(&pool, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid hall ID");
    }
}
