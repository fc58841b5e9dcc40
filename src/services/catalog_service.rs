// src/services/catalog_service.rs
// DOCUMENTATION: Business logic for the public read API
// PURPOSE: Films, sessions, seat maps, cinemas and halls with their references expanded

use crate::db::{
    BookingRepository, CinemaRepository, FilmRepository, HallRepository, SeatRepository,
    SessionFilter, SessionRepository,
};
use crate::errors::CinemaError;
use crate::models::{
    Cinema, CinemaSummary, Film, FilmQuery, Hall, HallSummary, SeatMap, SeatMapLayout,
    SeatMapSession, Session, SessionListItem, SessionQuery, DEFAULT_COUNTRY,
};
use crate::services::apollo_feed::{normalize_apollo_id, text};
use crate::services::date_range::{local_day_bounds, validate_iso_date};
use crate::services::ApolloKinoClient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Film header of GET /api/films/{id}/sessions
#[derive(Debug, Clone, Serialize)]
pub struct FilmHeader {
    pub id: Uuid,
    pub title: String,
    pub duration: i32,
}

/// Cinema header of GET /api/cinemas/{id}/halls
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaHeader {
    pub id: Uuid,
    pub name: String,
    pub apollo_id: Option<String>,
}

/// Parse a path or query identifier
/// DOCUMENTATION: `kind` names the entity in the error ("Invalid film ID")
pub fn parse_id(value: &str, kind: &str) -> Result<Uuid, CinemaError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CinemaError::InvalidInput(format!("Invalid {} ID", kind)))
}

/// Seats left once active bookings are subtracted
pub fn seats_left(capacity: i32, occupied: i64) -> i32 {
    let left = i64::from(capacity) - occupied;
    left.clamp(0, i64::from(i32::MAX)) as i32
}

/// Upstream TheatreArea enriched with the matching local cinema
pub fn merge_theatre_area(area: &Value, cinema: Option<&Cinema>) -> Value {
    let apollo_id = normalize_apollo_id(area.get("ID"));
    let mut merged = match area {
        Value::Object(fields) => fields.clone(),
        _ => Map::new(),
    };

    let name = cinema
        .map(|c| c.name.clone())
        .or_else(|| text(area.get("Name")))
        .or_else(|| text(area.get("name")));
    let address = match cinema {
        Some(c) => json!(c.address()),
        None => json!({
            "street": text(area.get("Address")),
            "city": text(area.get("City")),
            "postalCode": text(area.get("PostalCode")),
            "country": text(area.get("Country")).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        }),
    };

    merged.insert("id".into(), json!(apollo_id));
    merged.insert("cinemaId".into(), json!(cinema.map(|c| c.id)));
    merged.insert("name".into(), json!(name));
    merged.insert("address".into(), address);
    merged.insert(
        "apolloId".into(),
        json!(apollo_id.or_else(|| cinema.and_then(|c| c.apollo_id.clone()))),
    );
    Value::Object(merged)
}

/// Local cinema in TheatreArea shape, used when Apollo has nothing
pub fn cinema_as_theatre_area(cinema: &Cinema) -> Value {
    json!({
        "ID": cinema.apollo_id,
        "id": cinema.apollo_id,
        "Name": cinema.name,
        "Address": cinema.street,
        "City": cinema.city,
        "PostalCode": cinema.postal_code,
        "Phone": cinema.phone,
        "Email": cinema.email,
        "Facilities": cinema.facilities,
        "cinemaId": cinema.id,
        "name": cinema.name,
        "address": cinema.address(),
        "apolloId": cinema.apollo_id,
    })
}

pub struct CatalogService;

impl CatalogService {
    /// Active films
    pub async fn list_films(pool: &PgPool, query: &FilmQuery) -> Result<Vec<Film>, CinemaError> {
        FilmRepository::list_active(pool, query).await
    }

    pub async fn get_film(pool: &PgPool, id: &str) -> Result<Film, CinemaError> {
        let id = parse_id(id, "film")?;
        FilmRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Film not found".to_string()))
    }

    /// Future scheduled sessions of a film with hall info
    pub async fn film_sessions(
        pool: &PgPool,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<(FilmHeader, Vec<SessionListItem>), CinemaError> {
        let film = Self::get_film(pool, id).await?;

        let filter = SessionFilter {
            film_id: Some(film.id),
            starts_from: Some(now),
            ..Default::default()
        };
        let sessions = SessionRepository::list_scheduled(pool, &filter).await?;
        let halls = Self::hall_summaries(pool, &sessions).await?;

        let items = sessions
            .iter()
            .map(|s| s.to_list_item(None, halls.get(&s.hall_id).cloned()))
            .collect();

        Ok((
            FilmHeader {
                id: film.id,
                title: film.title,
                duration: film.duration,
            },
            items,
        ))
    }

    /// Scheduled sessions with film, hall and cinema expanded
    /// DOCUMENTATION: A date limits results to that local day, otherwise only
    /// sessions that have not started are returned. availableSeats is the hall
    /// capacity minus seats held by active bookings.
    pub async fn list_sessions(
        pool: &PgPool,
        query: &SessionQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionListItem>, CinemaError> {
        let mut filter = SessionFilter::default();

        if let Some(film_id) = query.film_id.as_deref().filter(|v| !v.is_empty()) {
            filter.film_id = Some(parse_id(film_id, "film")?);
        }
        if let Some(hall_id) = query.hall_id.as_deref().filter(|v| !v.is_empty()) {
            filter.hall_id = Some(parse_id(hall_id, "hall")?);
        }

        match query.date.as_deref().filter(|v| !v.is_empty()) {
            Some(date) => {
                let day = validate_iso_date(date)?;
                let (start, end) = local_day_bounds(day).ok_or_else(|| {
                    CinemaError::InvalidInput(format!("Invalid date: {}", date))
                })?;
                filter.starts_from = Some(start);
                filter.starts_before = Some(end);
            }
            None => filter.starts_from = Some(now),
        }

        let sessions = SessionRepository::list_scheduled(pool, &filter).await?;
        Self::expand_sessions(pool, &sessions, true).await
    }

    /// Attach film and hall summaries to sessions
    /// DOCUMENTATION: With `live_availability` the stored availableSeats is
    /// replaced by capacity minus active booked seats
    pub async fn expand_sessions(
        pool: &PgPool,
        sessions: &[Session],
        live_availability: bool,
    ) -> Result<Vec<SessionListItem>, CinemaError> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let film_ids: Vec<Uuid> = unique(sessions.iter().map(|s| s.film_id));
        let films: HashMap<Uuid, Film> = FilmRepository::find_many(pool, &film_ids)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let hall_ids: Vec<Uuid> = unique(sessions.iter().map(|s| s.hall_id));
        let halls = HallRepository::find_many(pool, &hall_ids).await?;
        let cinema_ids: Vec<Uuid> = unique(halls.iter().map(|h| h.cinema_id));
        let cinemas = CinemaRepository::summaries(pool, &cinema_ids).await?;
        let halls: HashMap<Uuid, Hall> = halls.into_iter().map(|h| (h.id, h)).collect();

        let occupied = if live_availability {
            let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
            BookingRepository::occupied_counts(pool, &ids).await?
        } else {
            HashMap::new()
        };

        Ok(sessions
            .iter()
            .map(|session| {
                let hall = halls.get(&session.hall_id);
                let mut item = session.to_list_item(
                    films.get(&session.film_id).map(Film::to_summary),
                    hall.map(|h| h.to_summary(cinemas.get(&h.cinema_id).cloned())),
                );
                if live_availability {
                    let capacity = hall.map(|h| h.capacity).unwrap_or(0);
                    let booked = occupied.get(&session.id).copied().unwrap_or(0);
                    item.available_seats = seats_left(capacity, booked);
                }
                item
            })
            .collect())
    }

    /// Hall summaries (with cinema) for the halls of some sessions
    async fn hall_summaries(
        pool: &PgPool,
        sessions: &[Session],
    ) -> Result<HashMap<Uuid, HallSummary>, CinemaError> {
        let hall_ids: Vec<Uuid> = unique(sessions.iter().map(|s| s.hall_id));
        let halls = HallRepository::find_many(pool, &hall_ids).await?;
        let cinema_ids: Vec<Uuid> = unique(halls.iter().map(|h| h.cinema_id));
        let cinemas = CinemaRepository::summaries(pool, &cinema_ids).await?;

        Ok(halls
            .iter()
            .map(|h| (h.id, h.to_summary(cinemas.get(&h.cinema_id).cloned())))
            .collect())
    }

    /// Seat map of a session: layout, occupied seats and seat types
    pub async fn session_seats(pool: &PgPool, id: &str) -> Result<SeatMap, CinemaError> {
        let id = parse_id(id, "session")?;
        let not_found = || CinemaError::NotFound("Session not found".to_string());

        let session = SessionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(not_found)?;
        let hall = HallRepository::find_by_id(pool, session.hall_id)
            .await?
            .ok_or_else(not_found)?;
        let film = FilmRepository::find_by_id(pool, session.film_id).await?;
        let cinema = CinemaRepository::find_by_id(pool, hall.cinema_id).await?;

        let mut conn = pool.acquire().await.map_err(|e| {
            log::error!("Failed to acquire connection: {}", e);
            CinemaError::DatabaseError(e.to_string())
        })?;
        let occupied = BookingRepository::occupied_seats(&mut *conn, session.id).await?;
        drop(conn);

        let seat_types: BTreeMap<String, String> = SeatRepository::list_active(pool, hall.id)
            .await?
            .into_iter()
            .map(|seat| (format!("{}-{}", seat.row, seat.number), seat.seat_type))
            .collect();

        Ok(SeatMap {
            session: SeatMapSession {
                id: session.id,
                film: film.map(|f| f.title),
                start_time: session.start_time,
                hall: hall.name.clone(),
                cinema: cinema.map(|c| c.name),
            },
            layout: SeatMapLayout {
                rows: hall.rows,
                seats_per_row: hall.seats_per_row,
                capacity: hall.capacity,
                available: seats_left(hall.capacity, occupied.len() as i64),
            },
            occupied,
            seat_types,
        })
    }

    /// Cinemas as Apollo lists them, merged with local records
    /// DOCUMENTATION: An empty upstream list returns local cinemas; an upstream
    /// failure falls back to local cinemas too
    pub async fn list_cinemas(
        pool: &PgPool,
        client: &ApolloKinoClient,
    ) -> Result<Vec<Value>, CinemaError> {
        let areas = match client.fetch_theatre_areas().await {
            Ok(areas) => areas,
            Err(e) => {
                log::warn!("Apollo unavailable, listing local cinemas: {}", e);
                Vec::new()
            }
        };

        let cinemas = CinemaRepository::list(pool).await.map_err(|e| {
            log::error!("Local cinema fallback failed: {}", e);
            e
        })?;

        if areas.is_empty() {
            return Ok(cinemas.iter().map(cinema_as_theatre_area).collect());
        }

        let by_apollo_id: HashMap<&str, &Cinema> = cinemas
            .iter()
            .filter_map(|c| c.apollo_id.as_deref().map(|id| (id, c)))
            .collect();

        Ok(areas
            .iter()
            .map(|area| {
                let cinema = normalize_apollo_id(area.get("ID"))
                    .and_then(|id| by_apollo_id.get(id.as_str()).copied());
                merge_theatre_area(area, cinema)
            })
            .collect())
    }

    /// Halls of a cinema addressed by UUID or Apollo ID
    pub async fn cinema_halls(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<(CinemaHeader, Vec<Hall>), CinemaError> {
        let cinema = CinemaRepository::find_by_id_or_apollo_id(pool, identifier)
            .await?
            .ok_or_else(|| CinemaError::NotFound("Cinema not found".to_string()))?;
        let halls = HallRepository::list_by_cinema(pool, cinema.id).await?;

        Ok((
            CinemaHeader {
                id: cinema.id,
                name: cinema.name,
                apollo_id: cinema.apollo_id,
            },
            halls,
        ))
    }

    /// Cinema summaries keyed by id for a set of halls
    pub async fn cinemas_for_halls(
        pool: &PgPool,
        halls: &[Hall],
    ) -> Result<HashMap<Uuid, CinemaSummary>, CinemaError> {
        let ids: Vec<Uuid> = unique(halls.iter().map(|h| h.cinema_id));
        CinemaRepository::summaries(pool, &ids).await
    }
}

/// Distinct values in first-seen order
pub fn unique(values: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cinema(apollo_id: Option<&str>) -> Cinema {
        Cinema {
            id: Uuid::new_v4(),
            name: "Apollo Kino Solaris".to_string(),
            street: "Estonia pst 9".to_string(),
            city: "Tallinn".to_string(),
            postal_code: "10143".to_string(),
            country: "Estonia".to_string(),
            phone: None,
            email: Some("info@apollokino.ee".to_string()),
            facilities: vec!["3D".to_string()],
            apollo_id: apollo_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_id_message() {
        let err = parse_id("not-a-uuid", "film").unwrap_err();
        assert_eq!(err.to_string(), "Invalid film ID");
        assert!(parse_id(&Uuid::new_v4().to_string(), "film").is_ok());
    }

    #[test]
    fn test_seats_left_never_negative() {
        assert_eq!(seats_left(150, 10), 140);
        assert_eq!(seats_left(10, 25), 0);
        assert_eq!(seats_left(0, 0), 0);
    }

    #[test]
    fn test_merge_prefers_local_cinema() {
        let local = cinema(Some("1004"));
        let area = json!({ "ID": 1004, "Name": "Solaris (feed)", "City": "Tartu" });

        let merged = merge_theatre_area(&area, Some(&local));

        assert_eq!(merged["id"], "1004");
        assert_eq!(merged["apolloId"], "1004");
        assert_eq!(merged["name"], "Apollo Kino Solaris");
        assert_eq!(merged["cinemaId"], json!(local.id));
        assert_eq!(merged["address"]["city"], "Tallinn");
        // upstream fields stay
        assert_eq!(merged["Name"], "Solaris (feed)");
    }

    #[test]
    fn test_merge_without_local_cinema() {
        let area = json!({ "ID": "1005", "Name": "Ülemiste", "Address": "Suur-Sõjamäe 4" });

        let merged = merge_theatre_area(&area, None);

        assert_eq!(merged["cinemaId"], Value::Null);
        assert_eq!(merged["name"], "Ülemiste");
        assert_eq!(merged["address"]["street"], "Suur-Sõjamäe 4");
        assert_eq!(merged["address"]["country"], "Estonia");
    }

    #[test]
    fn test_cinema_as_theatre_area() {
        let local = cinema(None);
        let value = cinema_as_theatre_area(&local);

        assert_eq!(value["ID"], Value::Null);
        assert_eq!(value["Name"], "Apollo Kino Solaris");
        assert_eq!(value["address"]["postalCode"], "10143");
    }

    #[test]
    fn test_unique_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(unique(vec![a, b, a, b]), vec![a, b]);
    }
}
