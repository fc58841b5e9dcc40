// src/models/film.rs
// DOCUMENTATION: Film catalogue records, admin payloads and summaries
// PURPOSE: Films come from Apollo Kino Events or are managed by admins

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Age ratings accepted by the films table
pub const AGE_RATINGS: &[&str] = &[
    "G", "PG", "PG-13", "R", "NC-17", "MS-1", "MS-6", "MS-12", "K-12", "K-14", "K-16", "PERE",
    "-",
];

pub fn is_valid_age_rating(value: &str) -> bool {
    AGE_RATINGS.contains(&value)
}

fn validate_age_rating(value: &str) -> Result<(), ValidationError> {
    if is_valid_age_rating(value) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_age_rating"))
    }
}

/// Film row as stored in the films table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: Uuid,
    pub title: String,
    pub original_title: Option<String>,
    pub description: String,
    /// Running time in minutes
    pub duration: i32,
    pub genre: Vec<String>,
    pub director: String,
    #[serde(rename = "cast")]
    pub cast_members: Vec<String>,
    pub release_date: DateTime<Utc>,
    pub language: String,
    pub subtitles: Vec<String>,
    pub age_rating: String,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub rating: Option<f32>,
    pub is_active: bool,
    /// Apollo Kino event ID
    pub apollo_id: Option<String>,
    pub production_year: Option<i32>,
    pub event_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert/update payload for a film
/// DOCUMENTATION: Produced by the Apollo mapper and by admin requests.
/// Also returned as-is by GET /api/apollo-kino/events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFilm {
    pub title: String,
    pub original_title: Option<String>,
    pub description: String,
    pub duration: i32,
    pub genre: Vec<String>,
    pub director: String,
    #[serde(rename = "cast")]
    pub cast_members: Vec<String>,
    pub release_date: DateTime<Utc>,
    pub language: String,
    pub subtitles: Vec<String>,
    pub age_rating: String,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub rating: Option<f32>,
    pub is_active: bool,
    pub apollo_id: Option<String>,
    pub production_year: Option<i32>,
    pub event_url: Option<String>,
}

/// Film fields embedded in session and booking payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmSummary {
    pub id: Uuid,
    pub title: String,
    pub original_title: Option<String>,
    pub duration: i32,
    pub genre: Vec<String>,
    pub age_rating: String,
    pub poster_url: Option<String>,
    pub rating: Option<f32>,
    pub language: String,
    pub subtitles: Vec<String>,
}

impl Film {
    pub fn to_summary(&self) -> FilmSummary {
        FilmSummary {
            id: self.id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            duration: self.duration,
            genre: self.genre.clone(),
            age_rating: self.age_rating.clone(),
            poster_url: self.poster_url.clone(),
            rating: self.rating,
            language: self.language.clone(),
            subtitles: self.subtitles.clone(),
        }
    }

    /// Current state as an update payload
    pub fn to_new_film(&self) -> NewFilm {
        NewFilm {
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            description: self.description.clone(),
            duration: self.duration,
            genre: self.genre.clone(),
            director: self.director.clone(),
            cast_members: self.cast_members.clone(),
            release_date: self.release_date,
            language: self.language.clone(),
            subtitles: self.subtitles.clone(),
            age_rating: self.age_rating.clone(),
            poster_url: self.poster_url.clone(),
            trailer_url: self.trailer_url.clone(),
            rating: self.rating,
            is_active: self.is_active,
            apollo_id: self.apollo_id.clone(),
            production_year: self.production_year,
            event_url: self.event_url.clone(),
        }
    }
}

/// Request DTO for POST /api/admin/movies
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFilmRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub original_title: Option<String>,

    #[validate(length(min = 1))]
    pub description: String,

    /// Minutes, at least 1
    #[validate(range(min = 1))]
    pub duration: i32,

    #[serde(default)]
    pub genre: Vec<String>,

    #[validate(length(min = 1))]
    pub director: String,

    #[serde(default)]
    pub cast: Vec<String>,

    pub release_date: DateTime<Utc>,

    #[validate(length(min = 1))]
    pub language: String,

    #[serde(default)]
    pub subtitles: Vec<String>,

    #[validate(custom = "validate_age_rating")]
    pub age_rating: String,

    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,

    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f32>,

    pub is_active: Option<bool>,
}

impl CreateFilmRequest {
    pub fn into_new_film(self) -> NewFilm {
        NewFilm {
            title: self.title.trim().to_string(),
            original_title: self.original_title.map(|t| t.trim().to_string()),
            description: self.description,
            duration: self.duration,
            genre: self.genre,
            director: self.director,
            cast_members: self.cast,
            release_date: self.release_date,
            language: self.language,
            subtitles: self.subtitles,
            age_rating: self.age_rating,
            poster_url: self.poster_url,
            trailer_url: self.trailer_url,
            rating: self.rating,
            is_active: self.is_active.unwrap_or(true),
            apollo_id: None,
            production_year: None,
            event_url: None,
        }
    }
}

/// Request DTO for PUT /api/admin/movies/{id}; absent fields are kept
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFilmRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub original_title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
    pub genre: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub director: Option<String>,
    pub cast: Option<Vec<String>>,
    pub release_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub language: Option<String>,
    pub subtitles: Option<Vec<String>>,
    #[validate(custom = "validate_age_rating")]
    pub age_rating: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f32>,
    pub is_active: Option<bool>,
}

impl UpdateFilmRequest {
    /// Merge the request over the stored film
    pub fn apply_to(self, film: &Film) -> NewFilm {
        let mut merged = film.to_new_film();
        if let Some(title) = self.title {
            merged.title = title.trim().to_string();
        }
        if let Some(original_title) = self.original_title {
            merged.original_title = Some(original_title.trim().to_string());
        }
        if let Some(description) = self.description {
            merged.description = description;
        }
        if let Some(duration) = self.duration {
            merged.duration = duration;
        }
        if let Some(genre) = self.genre {
            merged.genre = genre;
        }
        if let Some(director) = self.director {
            merged.director = director;
        }
        if let Some(cast) = self.cast {
            merged.cast_members = cast;
        }
        if let Some(release_date) = self.release_date {
            merged.release_date = release_date;
        }
        if let Some(language) = self.language {
            merged.language = language;
        }
        if let Some(subtitles) = self.subtitles {
            merged.subtitles = subtitles;
        }
        if let Some(age_rating) = self.age_rating {
            merged.age_rating = age_rating;
        }
        if self.poster_url.is_some() {
            merged.poster_url = self.poster_url;
        }
        if self.trailer_url.is_some() {
            merged.trailer_url = self.trailer_url;
        }
        if self.rating.is_some() {
            merged.rating = self.rating;
        }
        if let Some(is_active) = self.is_active {
            merged.is_active = is_active;
        }
        merged
    }
}

/// Query parameters for GET /api/films
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmQuery {
    pub genre: Option<String>,
    pub age_rating: Option<String>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_film() -> Film {
        Film {
            id: Uuid::new_v4(),
            title: "Dune".into(),
            original_title: Some("Dune: Part Two".into()),
            description: "Arrakis".into(),
            duration: 166,
            genre: vec!["Sci-Fi".into()],
            director: "Denis Villeneuve".into(),
            cast_members: vec![],
            release_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            language: "English".into(),
            subtitles: vec!["Estonian".into()],
            age_rating: "MS-12".into(),
            poster_url: None,
            trailer_url: None,
            rating: Some(0.0),
            is_active: true,
            apollo_id: Some("3001".into()),
            production_year: Some(2024),
            event_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_age_rating_list() {
        assert!(is_valid_age_rating("K-14"));
        assert!(is_valid_age_rating("-"));
        assert!(!is_valid_age_rating("L"));
    }

    #[test]
    fn test_create_request_validation() {
        let body = serde_json::json!({
            "title": "Oppenheimer",
            "description": "Biopic",
            "duration": 180,
            "director": "Christopher Nolan",
            "releaseDate": "2023-07-21T00:00:00Z",
            "language": "English",
            "ageRating": "K-12",
            "rating": 8.5
        });
        let req: CreateFilmRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_ok());

        let film = req.into_new_film();
        assert!(film.is_active);
        assert!(film.cast_members.is_empty());

        let bad = serde_json::json!({
            "title": "",
            "description": "x",
            "duration": 0,
            "director": "x",
            "releaseDate": "2023-07-21T00:00:00Z",
            "language": "x",
            "ageRating": "XXX"
        });
        let req: CreateFilmRequest = serde_json::from_value(bad).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("duration"));
        assert!(fields.contains_key("age_rating"));
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let film = sample_film();
        let update = UpdateFilmRequest {
            title: Some("  Dune 2 ".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let merged = update.apply_to(&film);

        assert_eq!(merged.title, "Dune 2");
        assert!(!merged.is_active);
        assert_eq!(merged.duration, 166);
        assert_eq!(merged.apollo_id.as_deref(), Some("3001"));
    }

    #[test]
    fn test_film_serializes_cast_field() {
        let value = serde_json::to_value(sample_film()).unwrap();
        assert!(value.get("cast").is_some());
        assert_eq!(value["ageRating"], "MS-12");
    }
}
