// src/services/sync_service.rs
// DOCUMENTATION: Apollo Kino synchronization service
// PURPOSE: Rebuild or incrementally update the catalogue from the Apollo Kino feed

use crate::db::{
    CatalogCounts, CatalogRepository, CinemaRepository, FilmRepository, HallRepository,
    SeatRepository, SessionRepository,
};
use crate::errors::CinemaError;
use crate::models::{Cinema, Film, Hall, HallChanges, NewSession, SessionStatus};
use crate::services::apollo_feed::{
    normalize_apollo_id, normalize_hall_name, session_language, session_subtitles, show_end,
    show_event_id, show_hall_name, show_start, show_theatre_id,
};
use crate::services::date_range::local_to_utc;
use crate::services::{ApolloKinoClient, ApolloMapper, SeatLayout, SessionPlan};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

/// Full refresh statistics
/// DOCUMENTATION: Tracks what a refresh from Apollo created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStats {
    pub cinemas_created: u32,
    pub halls_created: u32,
    pub seats_created: u32,
    pub films_created: u32,
    /// Schedule shows looked at
    pub shows_processed: u32,
    /// Shows without film, hall or a usable future start
    pub skipped_shows: u32,
    pub sessions_created: u64,
    /// Sessions planned because the schedule yielded none
    pub sample_sessions_created: u64,
    pub errors: Vec<String>,
    /// Table counts after the refresh
    pub counts: CatalogCounts,
    pub duration_seconds: u64,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl RefreshStats {
    pub fn new() -> Self {
        Self {
            cinemas_created: 0,
            halls_created: 0,
            seats_created: 0,
            films_created: 0,
            shows_processed: 0,
            skipped_shows: 0,
            sessions_created: 0,
            sample_sessions_created: 0,
            errors: Vec::new(),
            counts: CatalogCounts::default(),
            duration_seconds: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    /// Mark refresh as completed
    pub fn complete(&mut self, duration: u64) {
        self.duration_seconds = duration;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

impl Default for RefreshStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A film that could not be stored during a film sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncError {
    pub title: String,
    pub error: String,
}

/// Added/updated counters for one record kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertCounts {
    pub added: u32,
    pub updated: u32,
    #[serde(default)]
    pub errors: Vec<SyncError>,
}

/// Film sync statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmSyncStats {
    pub movies: UpsertCounts,
    /// Sessions are never touched by a film sync; kept for response shape
    pub sessions: UpsertCounts,
    pub total_movies: usize,
    pub total_shows: usize,
    pub duration_seconds: u64,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl FilmSyncStats {
    pub fn new() -> Self {
        Self {
            movies: UpsertCounts::default(),
            sessions: UpsertCounts::default(),
            total_movies: 0,
            total_shows: 0,
            duration_seconds: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, duration: u64) {
        self.duration_seconds = duration;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

impl Default for FilmSyncStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Seat regeneration counter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeatCounts {
    pub regenerated: u32,
}

/// Cinema and hall sync statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaSyncStats {
    pub cinemas: UpsertCounts,
    pub halls: UpsertCounts,
    pub seats: SeatCounts,
    /// Theatre areas received from Apollo
    pub count: usize,
    pub duration_seconds: u64,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl CinemaSyncStats {
    pub fn new() -> Self {
        Self {
            cinemas: UpsertCounts::default(),
            halls: UpsertCounts::default(),
            seats: SeatCounts::default(),
            count: 0,
            duration_seconds: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, duration: u64) {
        self.duration_seconds = duration;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

impl Default for CinemaSyncStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of planning upcoming sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStats {
    pub films: usize,
    pub halls: usize,
    pub days: i64,
    /// Sessions that started before today and were removed
    pub removed: u64,
    pub created: u64,
}

/// Hall lookup for schedule shows
/// DOCUMENTATION: Shows name a theatre and an auditorium. A show is placed in
/// the hall with the same normalized name, else in the first hall of its
/// theatre, else in the next hall of a fixed rotation over all halls.
#[derive(Debug, Default)]
pub struct HallIndex {
    /// Positions in `all`, per theatre key
    by_theatre: HashMap<String, Vec<usize>>,
    all: Vec<Hall>,
    next_fallback: usize,
}

impl HallIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hall under a theatre key
    pub fn insert(&mut self, theatre_key: &str, hall: Hall) {
        self.by_theatre
            .entry(theatre_key.to_string())
            .or_default()
            .push(self.all.len());
        self.all.push(hall);
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn halls(&self) -> &[Hall] {
        &self.all
    }

    /// Resolve the hall for a show
    pub fn resolve(&mut self, theatre_id: Option<&str>, hall_name: Option<&str>) -> Option<&Hall> {
        let index = self
            .theatre_match(theatre_id, hall_name)
            .or_else(|| self.next_fallback_index())?;
        self.all.get(index)
    }

    fn theatre_match(&self, theatre_id: Option<&str>, hall_name: Option<&str>) -> Option<usize> {
        let indices = self.by_theatre.get(theatre_id?)?;

        let wanted = hall_name.map(normalize_hall_name).filter(|n| !n.is_empty());
        if let Some(wanted) = wanted {
            let named = indices
                .iter()
                .copied()
                .find(|&i| normalize_hall_name(&self.all[i].name) == wanted);
            if named.is_some() {
                return named;
            }
        }

        indices.first().copied()
    }

    fn next_fallback_index(&mut self) -> Option<usize> {
        if self.all.is_empty() {
            return None;
        }
        let index = self.next_fallback % self.all.len();
        self.next_fallback += 1;
        Some(index)
    }
}

/// Theatre key used to file a cinema's halls
fn theatre_key(cinema: &Cinema) -> String {
    cinema
        .apollo_id
        .clone()
        .unwrap_or_else(|| "default".to_string())
}

/// Sync service for Apollo Kino integration
/// DOCUMENTATION: Full refresh, incremental film and cinema syncs and
/// timetable generation
pub struct SyncService;

impl SyncService {
    /// Rebuild the catalogue from Apollo Kino
    /// DOCUMENTATION: Destructive; users survive, everything else is replaced
    ///
    /// Process:
    /// 1. Clear bookings, seats, sessions, films, halls and cinemas
    /// 2. Create a cinema per TheatreArea with three default halls and seats
    /// 3. Create films from Events
    /// 4. Turn Schedule shows into sessions
    /// 5. Plan a sample week when the schedule produced nothing
    pub async fn refresh_database(
        pool: &PgPool,
        client: &ApolloKinoClient,
        now: DateTime<Utc>,
    ) -> Result<RefreshStats, CinemaError> {
        let start_time = Instant::now();
        let mut stats = RefreshStats::new();

        log::info!("Starting database refresh from Apollo Kino");

        CatalogRepository::clear(pool).await?;

        // Cinemas, halls, seats
        let areas = client.fetch_theatre_areas().await?;
        log::info!("Found {} theatre areas", areas.len());

        let mut halls = HallIndex::new();
        for area in &areas {
            let cinema = CinemaRepository::insert(pool, &ApolloMapper::theatre_area_to_cinema(area)).await?;
            stats.cinemas_created += 1;
            let key = theatre_key(&cinema);

            for new_hall in ApolloMapper::default_halls_for_cinema(cinema.id) {
                let hall = HallRepository::insert(pool, &new_hall).await?;
                stats.halls_created += 1;

                let layout = SeatLayout::refresh_default(hall.rows, hall.seats_per_row);
                let written =
                    SeatRepository::replace_layout(pool, hall.id, hall.rows, hall.seats_per_row, &layout)
                        .await?;
                stats.seats_created += written as u32;

                halls.insert(&key, hall);
            }
        }

        log::info!(
            "Created {} cinemas, {} halls, {} seats",
            stats.cinemas_created,
            stats.halls_created,
            stats.seats_created
        );

        // Films
        let events = client.fetch_events().await?;
        log::info!("Found {} events", events.len());

        let mut films: HashMap<String, Film> = HashMap::new();
        let mut created_films: Vec<Film> = Vec::new();
        for event in &events {
            let new_film = ApolloMapper::event_to_film(event, now);
            match FilmRepository::insert(pool, &new_film).await {
                Ok(film) => {
                    stats.films_created += 1;
                    if let Some(apollo_id) = normalize_apollo_id(event.get("ID")) {
                        films.insert(apollo_id, film.clone());
                    }
                    created_films.push(film);
                }
                Err(e) => {
                    let message = format!("Failed to store film {}: {}", new_film.title, e);
                    log::warn!("{}", message);
                    stats.errors.push(message);
                }
            }
        }

        // Sessions from the schedule
        let schedule = client.fetch_schedule(None, None, None).await;
        if let Some(error) = &schedule.error {
            stats.errors.push(format!("Schedule unavailable: {}", error));
        }

        let schedule_events: HashMap<String, &Value> = schedule
            .movies
            .iter()
            .filter_map(|event| normalize_apollo_id(event.get("ID")).map(|id| (id, event)))
            .collect();

        log::info!("Processing {} schedule shows", schedule.shows.len());

        let mut sessions: Vec<NewSession> = Vec::new();
        for show in &schedule.shows {
            stats.shows_processed += 1;

            let film = match Self::film_for_show(
                pool,
                show,
                &schedule_events,
                &mut films,
                &mut created_films,
                now,
            )
            .await
            {
                Ok(Some(film)) => film,
                Ok(None) => {
                    stats.skipped_shows += 1;
                    continue;
                }
                Err(e) => {
                    log::warn!("Skipping show, film could not be stored: {}", e);
                    stats.skipped_shows += 1;
                    continue;
                }
            };

            let theatre_id = show_theatre_id(show);
            let hall_name = show_hall_name(show);
            let Some(hall) = halls.resolve(theatre_id.as_deref(), hall_name.as_deref()) else {
                stats.skipped_shows += 1;
                continue;
            };

            let Some(start) = show_start(show) else {
                stats.skipped_shows += 1;
                continue;
            };
            if start < now {
                stats.skipped_shows += 1;
                continue;
            }

            sessions.push(NewSession {
                film_id: film.id,
                hall_id: hall.id,
                start_time: start,
                end_time: show_end(show, start, film.duration),
                price: ApolloMapper::show_pricing(show),
                is_3d: ApolloMapper::is_3d(show),
                language: Some(session_language(show)),
                subtitles: Some(session_subtitles(show)),
                available_seats: hall.capacity,
                status: SessionStatus::Scheduled,
            });
        }

        stats.sessions_created = SessionRepository::insert_many(pool, &sessions).await?;
        log::info!(
            "Created {} sessions from {} shows ({} skipped)",
            stats.sessions_created,
            stats.shows_processed,
            stats.skipped_shows
        );

        if stats.sessions_created == 0 && !created_films.is_empty() {
            log::info!("No sessions from schedule, planning a sample week");
            let plan = SessionPlan::sample_week(now.with_timezone(&chrono::Local).date_naive(), now);
            let sample = plan.plan(&created_films, halls.halls());
            stats.sample_sessions_created = SessionRepository::insert_many(pool, &sample).await?;
        }

        stats.counts = CatalogRepository::counts(pool).await?;

        let duration = start_time.elapsed().as_secs();
        stats.complete(duration);

        log::info!(
            "Refresh completed: {} cinemas, {} halls, {} films, {} sessions in {}s",
            stats.counts.cinemas,
            stats.counts.halls,
            stats.counts.films,
            stats.counts.sessions,
            duration
        );

        Ok(stats)
    }

    /// Film for a schedule show
    /// DOCUMENTATION: Known event → event listed with the schedule → film
    /// synthesized from the show itself. New films are registered under the
    /// show's event id so later shows reuse them.
    async fn film_for_show(
        pool: &PgPool,
        show: &Value,
        schedule_events: &HashMap<String, &Value>,
        films: &mut HashMap<String, Film>,
        created_films: &mut Vec<Film>,
        now: DateTime<Utc>,
    ) -> Result<Option<Film>, CinemaError> {
        let event_id = show_event_id(show);

        if let Some(film) = event_id.as_ref().and_then(|id| films.get(id)) {
            return Ok(Some(film.clone()));
        }

        let new_film = match event_id.as_ref().and_then(|id| schedule_events.get(id)) {
            Some(event) => Some(ApolloMapper::event_to_film(event, now)),
            None => ApolloMapper::show_to_film(show, now),
        };
        let Some(new_film) = new_film else {
            return Ok(None);
        };

        let film = FilmRepository::insert(pool, &new_film).await?;
        log::debug!("Created film {} from schedule", film.title);

        if let Some(id) = event_id {
            films.insert(id, film.clone());
        }
        created_films.push(film.clone());
        Ok(Some(film))
    }

    /// Upsert films from Apollo Events
    /// DOCUMENTATION: Matches existing films by apollo id, then original title.
    /// Fails with 503 when the feed cannot be fetched.
    pub async fn sync_films(
        pool: &PgPool,
        client: &ApolloKinoClient,
    ) -> Result<FilmSyncStats, CinemaError> {
        let start_time = Instant::now();
        let mut stats = FilmSyncStats::new();

        let data = client.fetch_schedule(None, None, None).await;
        if let Some(error) = data.error {
            return Err(CinemaError::ServiceUnavailable(format!(
                "Failed to fetch Apollo Kino data: {}",
                error
            )));
        }

        stats.total_movies = data.movies.len();
        stats.total_shows = data.shows.len();
        let now = Utc::now();

        for event in &data.movies {
            let new_film = ApolloMapper::event_to_film(event, now);

            let result = async {
                let existing = FilmRepository::find_for_event(
                    pool,
                    new_film.apollo_id.as_deref(),
                    new_film.original_title.as_deref(),
                )
                .await?;

                match existing {
                    Some(film) => FilmRepository::update(pool, film.id, &new_film)
                        .await
                        .map(|_| false),
                    None => FilmRepository::insert(pool, &new_film).await.map(|_| true),
                }
            }
            .await;

            match result {
                Ok(true) => stats.movies.added += 1,
                Ok(false) => stats.movies.updated += 1,
                Err(e) => {
                    log::warn!("Failed to sync film {}: {}", new_film.title, e);
                    stats.movies.errors.push(SyncError {
                        title: new_film.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let duration = start_time.elapsed().as_secs();
        stats.complete(duration);

        log::info!(
            "Film sync completed: {} added, {} updated, {} failed",
            stats.movies.added,
            stats.movies.updated,
            stats.movies.errors.len()
        );

        Ok(stats)
    }

    /// Upsert cinemas and their default halls from TheatreAreas
    /// DOCUMENTATION: Every hall touched gets a fresh all-standard seat grid
    pub async fn sync_cinemas(
        pool: &PgPool,
        client: &ApolloKinoClient,
    ) -> Result<CinemaSyncStats, CinemaError> {
        let start_time = Instant::now();
        let mut stats = CinemaSyncStats::new();

        let areas = client.fetch_theatre_areas().await?;
        stats.count = areas.len();

        for area in &areas {
            let new_cinema = ApolloMapper::theatre_area_to_cinema(area);
            let (cinema, created) = CinemaRepository::upsert_by_apollo_id(pool, &new_cinema).await?;
            if created {
                stats.cinemas.added += 1;
            } else {
                stats.cinemas.updated += 1;
            }

            for new_hall in ApolloMapper::default_halls_for_cinema(cinema.id) {
                let existing =
                    HallRepository::find_by_cinema_and_name(pool, cinema.id, &new_hall.name).await?;

                let hall = match existing {
                    Some(hall) => {
                        let changes = HallChanges {
                            cinema_id: None,
                            name: None,
                            capacity: Some(new_hall.capacity),
                            rows: Some(new_hall.rows),
                            seats_per_row: Some(new_hall.seats_per_row),
                            screen_type: Some(new_hall.screen_type),
                            sound_system: Some(new_hall.sound_system),
                        };
                        stats.halls.updated += 1;
                        HallRepository::update(pool, hall.id, &changes)
                            .await?
                            .unwrap_or(hall)
                    }
                    None => {
                        stats.halls.added += 1;
                        HallRepository::insert(pool, &new_hall).await?
                    }
                };

                let layout = SeatLayout::standard(hall.rows, hall.seats_per_row);
                SeatRepository::replace_layout(pool, hall.id, hall.rows, hall.seats_per_row, &layout)
                    .await?;
                stats.seats.regenerated += 1;
            }
        }

        let duration = start_time.elapsed().as_secs();
        stats.complete(duration);

        log::info!(
            "Cinema sync completed: {} cinemas added, {} updated; {} halls added, {} updated",
            stats.cinemas.added,
            stats.cinemas.updated,
            stats.halls.added,
            stats.halls.updated
        );

        Ok(stats)
    }

    /// Replace past sessions with a fresh timetable
    /// DOCUMENTATION: Sessions that started before local midnight of `today`
    /// are removed, then every film gets three shows a day for `days` days
    pub async fn generate_upcoming_sessions(
        pool: &PgPool,
        days: i64,
        today: NaiveDate,
    ) -> Result<GenerateStats, CinemaError> {
        let films = FilmRepository::list_for_planning(pool).await?;
        let halls = HallRepository::list(pool).await?;

        if films.is_empty() {
            return Err(CinemaError::InvalidInput("No films available".to_string()));
        }
        if halls.is_empty() {
            return Err(CinemaError::InvalidInput("No halls available".to_string()));
        }

        let midnight = today
            .and_hms_opt(0, 0, 0)
            .and_then(local_to_utc)
            .ok_or(CinemaError::InternalError)?;
        let removed = SessionRepository::delete_started_before(pool, midnight).await?;

        let sessions = SessionPlan::upcoming(today, days).plan(&films, &halls);
        let created = SessionRepository::insert_many(pool, &sessions).await?;

        log::info!(
            "Generated {} sessions for {} films over {} days ({} past sessions removed)",
            created,
            films.len(),
            days,
            removed
        );

        Ok(GenerateStats {
            films: films.len(),
            halls: halls.len(),
            days,
            removed,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn hall(name: &str) -> Hall {
        Hall {
            id: Uuid::new_v4(),
            cinema_id: Uuid::new_v4(),
            name: name.to_string(),
            capacity: 150,
            rows: 9,
            seats_per_row: 13,
            screen_type: "IMAX".to_string(),
            sound_system: "Dolby Atmos".to_string(),
            created_at: Utc::now(),
        }
    }

    fn index() -> HallIndex {
        let mut index = HallIndex::new();
        index.insert("1004", hall("Hall 1"));
        index.insert("1004", hall("Hall 2"));
        index.insert("1005", hall("Hall 1"));
        index
    }

    #[test]
    fn test_refresh_stats_complete() {
        let mut stats = RefreshStats::new();
        assert!(stats.completed_at.is_none());

        stats.complete(12);

        assert_eq!(stats.duration_seconds, 12);
        assert!(stats.completed_at.is_some());
    }

    #[test]
    fn test_hall_index_matches_name_case_insensitively() {
        let mut index = index();
        let expected = index.halls()[1].id;

        let hall = index.resolve(Some("1004"), Some("  HALL 2 ")).unwrap();

        assert_eq!(hall.id, expected);
    }

    #[test]
    fn test_hall_index_falls_back_to_first_hall_of_theatre() {
        let mut index = index();
        let expected = index.halls()[0].id;

        assert_eq!(index.resolve(Some("1004"), Some("Saal 7")).unwrap().id, expected);
        assert_eq!(index.resolve(Some("1004"), None).unwrap().id, expected);
    }

    #[test]
    fn test_hall_index_rotates_unknown_theatres() {
        let mut index = index();
        let ids: Vec<Uuid> = index.halls().iter().map(|h| h.id).collect();

        let picked: Vec<Uuid> = (0..4)
            .map(|_| index.resolve(Some("9999"), Some("Hall 1")).unwrap().id)
            .collect();

        assert_eq!(picked, vec![ids[0], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_hall_index_empty() {
        let mut index = HallIndex::new();
        assert!(index.is_empty());
        assert!(index.resolve(Some("1004"), Some("Hall 1")).is_none());
    }

    #[test]
    fn test_film_sync_stats_serialize_shape() {
        let mut stats = FilmSyncStats::new();
        stats.movies.added = 2;
        stats.movies.errors.push(SyncError {
            title: "Dune".to_string(),
            error: "boom".to_string(),
        });

        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["movies"]["added"], 2);
        assert_eq!(value["movies"]["errors"][0]["title"], "Dune");
        assert_eq!(value["sessions"]["added"], 0);
        assert!(value.get("totalMovies").is_some());
    }
}
