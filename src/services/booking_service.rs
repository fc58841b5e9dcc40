// src/services/booking_service.rs
// DOCUMENTATION: Business logic for seat bookings
// PURPOSE: Conflict-free booking creation plus booking lookups and removal

use crate::db::{
    BookingRepository, CinemaRepository, FilmRepository, HallRepository, SeatRepository,
    SessionRepository, UserRepository,
};
use crate::errors::CinemaError;
use crate::models::{
    Booking, BookingCreated, BookingDetail, BookingSession, CreateBookingRequest, Film, Hall,
    NewBooking, SeatPosition, Session,
};
use crate::services::catalog_service::{parse_id, unique};
use crate::services::SeatSelection;
use sqlx::{PgConnection, PgPool};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Hex characters after the "BK-" prefix
const BOOKING_NUMBER_HEX: usize = 12;

fn db_error(context: &str, e: sqlx::Error) -> CinemaError {
    log::error!("{}: {}", context, e);
    CinemaError::DatabaseError(e.to_string())
}

/// Random booking reference, "BK-" + 12 lowercase hex characters
pub fn new_booking_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("BK-{}", &hex[..BOOKING_NUMBER_HEX])
}

/// Price of a booking: standard ticket price per seat
pub fn total_price(standard_price: f64, seats: usize) -> f64 {
    let total = standard_price.max(0.0) * seats as f64;
    (total * 100.0).round() / 100.0
}

pub struct BookingService;

impl BookingService {
    /// Create a booking
    /// DOCUMENTATION: Runs in one transaction holding the session row lock, so
    /// two requests for the same session cannot both pass the conflict check
    ///
    /// Process:
    /// 1. Check required fields and the session id
    /// 2. Lock the session and load its hall
    /// 3. Validate seats against layout, duplicates and active bookings
    /// 4. Upsert seat rows and pick an unused booking number
    /// 5. Insert the booking with its seats
    pub async fn create_booking(
        pool: &PgPool,
        req: CreateBookingRequest,
    ) -> Result<BookingCreated, CinemaError> {
        let required =
            || CinemaError::InvalidInput("sessionId, seats[], and contactEmail are required".to_string());

        let session_id = req
            .session_id
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(required)?;
        let seats = req.seats.as_ref().filter(|s| !s.is_empty()).ok_or_else(required)?;
        let contact_email = req
            .contact_email
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(required)?
            .to_string();
        let session_id = parse_id(session_id, "session")?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start booking transaction", e))?;

        let not_found = || CinemaError::NotFound("Session not found".to_string());
        let session = SessionRepository::lock_by_id(&mut *tx, session_id)
            .await?
            .ok_or_else(not_found)?;
        let hall = HallRepository::find_by_id(pool, session.hall_id)
            .await?
            .ok_or_else(not_found)?;

        let occupied: HashSet<SeatPosition> =
            BookingRepository::occupied_seats(&mut *tx, session.id)
                .await?
                .into_iter()
                .collect();
        let requested = SeatSelection::validate(seats, hall.rows, hall.seats_per_row, &occupied)?;

        let seat_ids = SeatRepository::upsert_positions(&mut *tx, hall.id, &requested).await?;
        let booking_number = Self::unused_booking_number(&mut *tx).await?;
        let user_id = Self::existing_user(&mut *tx, req.user_id.as_deref()).await?;
        let payment =
            SeatSelection::resolve_payment(req.payment_method.as_deref(), req.payment_status.as_deref());

        let new_booking = NewBooking {
            user_id,
            session_id: session.id,
            total_price: total_price(session.price_standard, seat_ids.len()),
            booking_number,
            status: payment.status,
            payment_status: payment.payment_status,
            payment_method: payment.method,
            contact_email,
            contact_phone: req
                .contact_phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        };

        let booking = BookingRepository::insert(&mut *tx, &new_booking, &seat_ids).await?;
        SessionRepository::reserve_seats(&mut *tx, session.id, seat_ids.len() as i64).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit booking", e))?;

        log::info!(
            "Booking {} created for session {} ({} seats)",
            booking.booking_number,
            session.id,
            requested.len()
        );

        Ok(BookingCreated {
            booking_id: booking.id,
            booking_number: booking.booking_number,
            total_price: booking.total_price,
            seats: requested,
            session: session.id,
            status: booking.status,
        })
    }

    async fn unused_booking_number(conn: &mut PgConnection) -> Result<String, CinemaError> {
        loop {
            let candidate = new_booking_number();
            if !BookingRepository::number_exists(conn, &candidate).await? {
                return Ok(candidate);
            }
            log::debug!("Booking number {} taken, retrying", candidate);
        }
    }

    /// The user id only sticks when it names an existing user
    async fn existing_user(
        conn: &mut PgConnection,
        user_id: Option<&str>,
    ) -> Result<Option<Uuid>, CinemaError> {
        let Some(id) = user_id.and_then(|v| Uuid::parse_str(v.trim()).ok()) else {
            return Ok(None);
        };
        if UserRepository::exists(conn, id).await? {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    /// Booking by its public reference
    pub async fn get_by_number(
        pool: &PgPool,
        booking_number: &str,
    ) -> Result<BookingDetail, CinemaError> {
        let booking = BookingRepository::find_by_number(pool, booking_number.trim())
            .await?
            .ok_or_else(|| CinemaError::NotFound("Booking not found".to_string()))?;

        let mut details = Self::expand(pool, vec![booking]).await?;
        details
            .pop()
            .ok_or_else(|| CinemaError::NotFound("Booking not found".to_string()))
    }

    /// Every booking, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<BookingDetail>, CinemaError> {
        let bookings = BookingRepository::list_all(pool).await?;
        Self::expand(pool, bookings).await
    }

    /// Attach session (film, hall, cinema), seats and user to bookings
    async fn expand(pool: &PgPool, bookings: Vec<Booking>) -> Result<Vec<BookingDetail>, CinemaError> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let session_ids = unique(bookings.iter().map(|b| b.session_id));
        let sessions = SessionRepository::find_many(pool, &session_ids).await?;

        let film_ids = unique(sessions.iter().map(|s| s.film_id));
        let films: HashMap<Uuid, Film> = FilmRepository::find_many(pool, &film_ids)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let hall_ids = unique(sessions.iter().map(|s| s.hall_id));
        let halls = HallRepository::find_many(pool, &hall_ids).await?;
        let cinema_ids = unique(halls.iter().map(|h| h.cinema_id));
        let cinemas = CinemaRepository::summaries(pool, &cinema_ids).await?;
        let halls: HashMap<Uuid, Hall> = halls.into_iter().map(|h| (h.id, h)).collect();

        let sessions: HashMap<Uuid, Session> = sessions.into_iter().map(|s| (s.id, s)).collect();

        let booking_ids: Vec<Uuid> = bookings.iter().map(|b| b.id).collect();
        let mut seats = BookingRepository::seats_for(pool, &booking_ids).await?;

        let user_ids = unique(bookings.iter().filter_map(|b| b.user_id));
        let users = UserRepository::summaries(pool, &user_ids).await?;

        Ok(bookings
            .iter()
            .map(|booking| {
                let session = sessions.get(&booking.session_id).map(|s| BookingSession {
                    id: s.id,
                    start_time: s.start_time,
                    end_time: s.end_time,
                    film: films.get(&s.film_id).map(Film::to_summary),
                    hall: halls
                        .get(&s.hall_id)
                        .map(|h| h.to_summary(cinemas.get(&h.cinema_id).cloned())),
                });
                booking.to_detail(
                    session,
                    seats.remove(&booking.id).unwrap_or_default(),
                    booking.user_id.and_then(|id| users.get(&id).cloned()),
                )
            })
            .collect())
    }

    /// Remove a booking and hand its seats back to the session
    pub async fn delete(pool: &PgPool, id: &str) -> Result<(), CinemaError> {
        let id = parse_id(id, "booking")?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let (booking, seat_count) = BookingRepository::lock_with_seat_count(&mut *tx, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Booking not found".to_string()))?;

        SessionRepository::release_seats(&mut *tx, booking.session_id, seat_count).await?;
        BookingRepository::delete(&mut *tx, booking.id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit booking removal", e))?;

        log::info!("Booking {} deleted, {} seats released", booking.booking_number, seat_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_number_format() {
        let number = new_booking_number();

        assert!(number.starts_with("BK-"));
        assert_eq!(number.len(), 3 + BOOKING_NUMBER_HEX);
        assert!(number[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(number, new_booking_number());
    }

    #[test]
    fn test_total_price() {
        assert_eq!(total_price(9.5, 3), 28.5);
        assert_eq!(total_price(0.1, 3), 0.3);
        assert_eq!(total_price(-4.0, 2), 0.0);
        assert_eq!(total_price(12.0, 0), 0.0);
    }

    #[actix_web::test]
    async fn test_create_requires_fields() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        let err = BookingService::create_booking(
            &pool,
            CreateBookingRequest {
                session_id: Some(Uuid::new_v4().to_string()),
                seats: Some(Vec::new()),
                contact_email: Some("guest@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "sessionId, seats[], and contactEmail are required");

        let err = BookingService::create_booking(
            &pool,
            CreateBookingRequest {
                session_id: Some("abc".into()),
                seats: Some(vec![crate::models::SeatInput {
                    row: serde_json::json!(1),
                    number: serde_json::json!(1),
                }]),
                contact_email: Some("guest@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid session ID");
    }

    // The tests below need a Postgres server: DATABASE_URL=... cargo test -- --ignored

    /// Cinema, a 4x5 hall, a film and one session with every seat free
    async fn seed_session(pool: &PgPool) -> (Uuid, Uuid) {
        let cinema_id: Uuid = sqlx::query_scalar(
            "INSERT INTO cinemas (name, street, city, postal_code) \
             VALUES ('Apollo Kino Solaris', 'Estonia pst 9', 'Tallinn', '10143') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let hall_id: Uuid = sqlx::query_scalar(
            "INSERT INTO halls (cinema_id, name, capacity, rows, seats_per_row) \
             VALUES ($1, 'Saal 1', 20, 4, 5) RETURNING id",
        )
        .bind(cinema_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let film_id: Uuid = sqlx::query_scalar(
            "INSERT INTO films (title, description, duration, director, release_date, language, age_rating) \
             VALUES ('Dune: Part Two', 'Sand', 166, 'Denis Villeneuve', NOW(), 'English', 'MS-12') \
             RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let session_id: Uuid = sqlx::query_scalar(
            "INSERT INTO sessions (film_id, hall_id, start_time, end_time, price_standard, available_seats) \
             VALUES ($1, $2, NOW() + INTERVAL '1 day', NOW() + INTERVAL '1 day 3 hours', 8.5, 20) \
             RETURNING id",
        )
        .bind(film_id)
        .bind(hall_id)
        .fetch_one(pool)
        .await
        .unwrap();

        (session_id, hall_id)
    }

    fn booking_for(session_id: Uuid, seats: &[(i32, i32)]) -> CreateBookingRequest {
        CreateBookingRequest {
            session_id: Some(session_id.to_string()),
            seats: Some(
                seats
                    .iter()
                    .map(|(row, number)| crate::models::SeatInput {
                        row: serde_json::json!(row),
                        number: serde_json::json!(number),
                    })
                    .collect(),
            ),
            contact_email: Some("guest@example.com".into()),
            ..Default::default()
        }
    }

    async fn available_seats(pool: &PgPool, session_id: Uuid) -> i32 {
        sqlx::query_scalar("SELECT available_seats FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_double_booking_conflicts(pool: PgPool) {
        let (session_id, hall_id) = seed_session(&pool).await;

        let created = BookingService::create_booking(&pool, booking_for(session_id, &[(1, 1), (1, 2)]))
            .await
            .unwrap();
        assert_eq!(created.total_price, 17.0);
        assert_eq!(available_seats(&pool, session_id).await, 18);

        let err = BookingService::create_booking(&pool, booking_for(session_id, &[(1, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(&err, CinemaError::Conflict(msg) if msg == "Seat 1-1 is already booked"));
        assert_eq!(available_seats(&pool, session_id).await, 18);

        let detail = BookingService::get_by_number(&pool, &created.booking_number)
            .await
            .unwrap();
        assert_eq!(
            detail.seats,
            vec![SeatPosition { row: 1, number: 1 }, SeatPosition { row: 1, number: 2 }]
        );

        let seats = SeatRepository::list_active(&pool, hall_id).await.unwrap();
        assert_eq!(seats.len(), 2);
        assert_eq!((seats[0].row, seats[0].number), (1, 1));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_cancelled_booking_frees_seats(pool: PgPool) {
        let (session_id, _) = seed_session(&pool).await;

        let first = BookingService::create_booking(&pool, booking_for(session_id, &[(2, 3)]))
            .await
            .unwrap();

        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1")
            .bind(first.booking_id)
            .execute(&pool)
            .await
            .unwrap();

        let second = BookingService::create_booking(&pool, booking_for(session_id, &[(2, 3)]))
            .await
            .unwrap();
        assert_ne!(second.booking_id, first.booking_id);
        assert_eq!(second.seats, vec![SeatPosition { row: 2, number: 3 }]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_delete_returns_seats_to_session(pool: PgPool) {
        let (session_id, _) = seed_session(&pool).await;

        let created = BookingService::create_booking(&pool, booking_for(session_id, &[(4, 4), (4, 5)]))
            .await
            .unwrap();
        assert_eq!(available_seats(&pool, session_id).await, 18);

        BookingService::delete(&pool, &created.booking_id.to_string())
            .await
            .unwrap();
        assert_eq!(available_seats(&pool, session_id).await, 20);

        let err = BookingService::get_by_number(&pool, &created.booking_number)
            .await
            .unwrap_err();
        assert!(matches!(err, CinemaError::NotFound(_)));

        BookingService::create_booking(&pool, booking_for(session_id, &[(4, 4)]))
            .await
            .unwrap();
    }
}
