// src/services/apollo_mapper.rs
// DOCUMENTATION: Apollo Kino feed records to catalogue records
// PURPOSE: Map Events, Shows and TheatreAreas onto films, sessions prices and cinemas

use crate::models::{
    is_valid_age_rating, Address, NewCinema, NewFilm, NewHall, ScreenType, SessionPrice,
    SoundSystem, DEFAULT_COUNTRY,
};
use crate::services::apollo_feed::{
    first_text, language_name, normalize_apollo_id, parse_float, parse_int, path,
    show_description, show_event_id, show_title, text, to_array,
};
use crate::services::date_range::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_FILM_DURATION: i32 = 90;
const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_CINEMA_EMAIL: &str = "info@apollokino.ee";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Number of halls every Apollo cinema gets
pub const HALLS_PER_CINEMA: i32 = 3;

/// Fallback prices when a show carries no PriceInCents
const FALLBACK_PRICE: SessionPrice = SessionPrice {
    standard: 9.50,
    vip: Some(14.00),
    student: Some(7.50),
    child: Some(5.50),
};

/// Mapper for Apollo Kino feed records
/// DOCUMENTATION: Stateless; every function takes the raw feed value
pub struct ApolloMapper;

impl ApolloMapper {
    /// Event rating labels; unknown valid labels pass through, everything else is G
    fn event_age_rating(label: Option<String>) -> String {
        match label.as_deref() {
            None | Some("") | Some("PERE") | Some("L") => "G".to_string(),
            Some(label) if is_valid_age_rating(label) => label.to_string(),
            Some(_) => "G".to_string(),
        }
    }

    /// Show rating labels only keep the Estonian classes
    fn show_age_rating(label: Option<String>) -> String {
        match label.as_deref() {
            Some(label @ ("MS-1" | "MS-6" | "MS-12" | "K-12" | "K-14" | "K-16")) => label.to_string(),
            _ => "G".to_string(),
        }
    }

    fn split_list(value: Option<String>) -> Vec<String> {
        value
            .map(|raw| raw.split(',').map(|part| part.trim().to_string()).collect())
            .unwrap_or_default()
    }

    fn genres(value: Option<&Value>) -> Vec<String> {
        match text(value) {
            Some(raw) => Self::split_list(Some(raw)),
            None => vec!["General".to_string()],
        }
    }

    fn director(event: &Value) -> String {
        let directors = path(event, &["Directors", "Director"])
            .map(to_array)
            .unwrap_or_default();
        let Some(first) = directors.first() else {
            return "Unknown".to_string();
        };
        let first_name = text(first.get("FirstName")).unwrap_or_default();
        let last_name = text(first.get("LastName")).unwrap_or_default();
        let full_name = format!("{} {}", first_name, last_name).trim().to_string();
        if full_name.is_empty() {
            "Unknown".to_string()
        } else {
            full_name
        }
    }

    fn trailer_url(event: &Value) -> Option<String> {
        path(event, &["Videos", "EventVideo"])
            .map(to_array)
            .unwrap_or_default()
            .iter()
            .find(|video| text(video.get("MediaResourceFormat")).as_deref() == Some("YouTubeVideo"))
            .and_then(|video| text(video.get("Location")))
            .map(|location| format!("{}{}", YOUTUBE_WATCH_URL, location))
    }

    fn poster_url(record: &Value) -> Option<String> {
        text(path(record, &["Images", "EventMediumImagePortrait"]))
    }

    fn duration(record: &Value) -> i32 {
        parse_int(record.get("LengthInMinutes"))
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_FILM_DURATION)
    }

    fn release_date(record: &Value, now: DateTime<Utc>) -> DateTime<Utc> {
        text(record.get("dtLocalRelease"))
            .and_then(|raw| parse_timestamp(&raw))
            .unwrap_or(now)
    }

    /// Convert an Apollo Event into a film
    /// DOCUMENTATION: `now` stands in for a missing release date
    pub fn event_to_film(event: &Value, now: DateTime<Utc>) -> NewFilm {
        let title = first_text(event, &["Title", "OriginalTitle"]).unwrap_or_else(|| "Unknown".into());
        let original_title =
            first_text(event, &["OriginalTitle", "Title"]).unwrap_or_else(|| "Unknown".into());

        NewFilm {
            title,
            original_title: Some(original_title),
            description: first_text(event, &["Synopsis", "ShortSynopsis"])
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            duration: Self::duration(event),
            genre: Self::genres(event.get("Genres")),
            director: Self::director(event),
            cast_members: Self::split_list(text(event.get("Cast"))),
            release_date: Self::release_date(event, now),
            language: language_name(event.get("SpokenLanguage"))
                .unwrap_or_else(|| "Unknown".to_string()),
            subtitles: language_name(event.get("SubtitleLanguage1"))
                .into_iter()
                .collect(),
            age_rating: Self::event_age_rating(text(event.get("RatingLabel"))),
            poster_url: Self::poster_url(event),
            trailer_url: Self::trailer_url(event),
            rating: Some(0.0),
            is_active: true,
            apollo_id: normalize_apollo_id(event.get("ID")),
            production_year: parse_int(event.get("ProductionYear")),
            event_url: text(event.get("EventURL")),
        }
    }

    /// Synthesize a film from a schedule show when no event describes it
    /// Returns None when the show has no usable title
    pub fn show_to_film(show: &Value, now: DateTime<Utc>) -> Option<NewFilm> {
        let title = show_title(show)?;
        let original_title = text(show.get("OriginalTitle")).unwrap_or_else(|| title.clone());
        let rating_label = first_text(show, &["RatingLabel", "Rating"]);

        Some(NewFilm {
            original_title: Some(original_title),
            description: show_description(show).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            duration: Self::duration(show),
            genre: Self::genres(show.get("Genres")),
            director: text(show.get("Director")).unwrap_or_else(|| "Unknown".to_string()),
            cast_members: Vec::new(),
            release_date: Self::release_date(show, now),
            language: language_name(show.get("SpokenLanguage"))
                .unwrap_or_else(|| "Unknown".to_string()),
            subtitles: language_name(show.get("SubtitleLanguage1"))
                .into_iter()
                .collect(),
            age_rating: Self::show_age_rating(rating_label),
            poster_url: Self::poster_url(show),
            trailer_url: None,
            rating: Some(0.0),
            is_active: true,
            apollo_id: show_event_id(show),
            production_year: None,
            event_url: None,
            title,
        })
    }

    /// Convert a TheatreArea into a cinema
    pub fn theatre_area_to_cinema(area: &Value) -> NewCinema {
        let raw_id = text(area.get("ID")).unwrap_or_default();

        NewCinema {
            name: text(area.get("Name")).unwrap_or_else(|| format!("Apollo Kino {}", raw_id)),
            address: Address {
                street: text(area.get("Address")).unwrap_or_else(|| "Unknown".to_string()),
                city: text(area.get("City")).unwrap_or_else(|| "Tallinn".to_string()),
                postal_code: text(area.get("PostalCode")).unwrap_or_else(|| "10000".to_string()),
                country: DEFAULT_COUNTRY.to_string(),
            },
            phone: text(area.get("Phone")),
            email: Some(text(area.get("Email")).unwrap_or_else(|| DEFAULT_CINEMA_EMAIL.to_string())),
            facilities: vec!["3D".into(), "Dolby Atmos".into(), "Parking".into()],
            apollo_id: normalize_apollo_id(area.get("ID")),
        }
    }

    /// Standard hall set for an Apollo cinema: Hall 1 (IMAX), Hall 2 (3D), Hall 3
    pub fn default_halls_for_cinema(cinema_id: Uuid) -> Vec<NewHall> {
        (1..=HALLS_PER_CINEMA)
            .map(|n| NewHall {
                cinema_id,
                name: format!("Hall {}", n),
                capacity: 100 + n * 50,
                rows: 8 + n,
                seats_per_row: 12 + n,
                screen_type: match n {
                    1 => ScreenType::Imax,
                    2 => ScreenType::ThreeD,
                    _ => ScreenType::Standard,
                },
                sound_system: if n <= 2 {
                    SoundSystem::DolbyAtmos
                } else {
                    SoundSystem::Digital51
                },
            })
            .collect()
    }

    /// Prices derived from PriceInCents; fixed fallbacks when absent or zero
    pub fn show_pricing(show: &Value) -> SessionPrice {
        let base = parse_float(show.get("PriceInCents"))
            .map(|cents| cents / 100.0)
            .filter(|euros| *euros > 0.0);

        match base {
            Some(euros) => SessionPrice {
                standard: round_cents(euros),
                vip: Some(round_cents(euros * 1.5)),
                student: Some(round_cents(euros * 0.8)),
                child: Some(round_cents(euros * 0.6)),
            },
            None => FALLBACK_PRICE,
        }
    }

    pub fn is_3d(show: &Value) -> bool {
        text(show.get("PresentationMethod"))
            .map(|method| method.contains("3D"))
            .unwrap_or(false)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_event_to_film_full_record() {
        let event = json!({
            "ID": "303502",
            "Title": "Kõige suurem",
            "OriginalTitle": "The Biggest",
            "ProductionYear": "2024",
            "LengthInMinutes": "118",
            "dtLocalRelease": "2024-12-20T00:00:00",
            "RatingLabel": "K-12",
            "Genres": "Drama, Comedy",
            "ShortSynopsis": "Short",
            "EventURL": "https://www.apollokino.ee/event/303502",
            "Images": {"EventMediumImagePortrait": "https://img/portrait.jpg"},
            "Directors": {"Director": [{"FirstName": "Jane", "LastName": "Doe"}, {"FirstName": "X"}]},
            "SpokenLanguage": {"Name": "English"},
            "SubtitleLanguage1": {"Name": "Estonian"},
            "Videos": {"EventVideo": [
                {"MediaResourceFormat": "Image", "Location": "nope"},
                {"MediaResourceFormat": "YouTubeVideo", "Location": "abc123"}
            ]}
        });

        let film = ApolloMapper::event_to_film(&event, now());
        assert_eq!(film.title, "Kõige suurem");
        assert_eq!(film.original_title.as_deref(), Some("The Biggest"));
        assert_eq!(film.description, "Short");
        assert_eq!(film.duration, 118);
        assert_eq!(film.genre, vec!["Drama", "Comedy"]);
        assert_eq!(film.director, "Jane Doe");
        assert_eq!(film.language, "English");
        assert_eq!(film.subtitles, vec!["Estonian"]);
        assert_eq!(film.age_rating, "K-12");
        assert_eq!(
            film.trailer_url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(film.poster_url.as_deref(), Some("https://img/portrait.jpg"));
        assert_eq!(film.apollo_id.as_deref(), Some("303502"));
        assert_eq!(film.production_year, Some(2024));
        assert_ne!(film.release_date, now());
    }

    #[test]
    fn test_event_to_film_defaults() {
        let film = ApolloMapper::event_to_film(&json!({"ID": 5, "RatingLabel": "PERE"}), now());
        assert_eq!(film.title, "Unknown");
        assert_eq!(film.duration, DEFAULT_FILM_DURATION);
        assert_eq!(film.genre, vec!["General"]);
        assert_eq!(film.director, "Unknown");
        assert_eq!(film.language, "Unknown");
        assert!(film.subtitles.is_empty());
        assert_eq!(film.age_rating, "G");
        assert_eq!(film.release_date, now());
        assert_eq!(film.apollo_id.as_deref(), Some("5"));
        assert!(film.trailer_url.is_none());
    }

    #[test]
    fn test_event_rating_labels() {
        let rating = |label: &str| {
            ApolloMapper::event_to_film(&json!({"RatingLabel": label}), now()).age_rating
        };
        assert_eq!(rating("MS-6"), "MS-6");
        assert_eq!(rating("K-14"), "K-14");
        assert_eq!(rating("L"), "G");
        assert_eq!(rating("X-99"), "G");
    }

    #[test]
    fn test_show_to_film() {
        let show = json!({
            "EventID": 77,
            "Title": "Show Title",
            "EventDescription": "desc",
            "LengthInMinutes": 101,
            "Genres": "Animation",
            "Rating": "K-14",
            "SpokenLanguage": "Estonian",
            "SubtitleLanguage1": {"NameInLanguage": "vene"}
        });
        let film = ApolloMapper::show_to_film(&show, now()).unwrap();
        assert_eq!(film.title, "Show Title");
        assert_eq!(film.original_title.as_deref(), Some("Show Title"));
        assert_eq!(film.description, "desc");
        assert_eq!(film.duration, 101);
        assert_eq!(film.age_rating, "K-14");
        assert_eq!(film.language, "Estonian");
        assert_eq!(film.subtitles, vec!["vene"]);
        assert_eq!(film.apollo_id.as_deref(), Some("77"));

        assert!(ApolloMapper::show_to_film(&json!({"EventID": 1}), now()).is_none());
    }

    #[test]
    fn test_theatre_area_to_cinema() {
        let cinema = ApolloMapper::theatre_area_to_cinema(&json!({"ID": "1011"}));
        assert_eq!(cinema.name, "Apollo Kino 1011");
        assert_eq!(cinema.address.street, "Unknown");
        assert_eq!(cinema.address.city, "Tallinn");
        assert_eq!(cinema.address.postal_code, "10000");
        assert_eq!(cinema.address.country, "Estonia");
        assert_eq!(cinema.email.as_deref(), Some("info@apollokino.ee"));
        assert_eq!(cinema.facilities.len(), 3);
        assert_eq!(cinema.apollo_id.as_deref(), Some("1011"));
        assert!(cinema.phone.is_none());

        let named = ApolloMapper::theatre_area_to_cinema(&json!({
            "ID": 1004, "Name": "Apollo Kino Solaris", "City": "Tallinn", "Address": "Estonia pst 9"
        }));
        assert_eq!(named.name, "Apollo Kino Solaris");
        assert_eq!(named.address.street, "Estonia pst 9");
    }

    #[test]
    fn test_default_halls() {
        let cinema_id = Uuid::new_v4();
        let halls = ApolloMapper::default_halls_for_cinema(cinema_id);
        assert_eq!(halls.len(), 3);
        assert_eq!(halls[0].name, "Hall 1");
        assert_eq!(halls[0].capacity, 150);
        assert_eq!(halls[0].rows, 9);
        assert_eq!(halls[0].seats_per_row, 13);
        assert_eq!(halls[0].screen_type, ScreenType::Imax);
        assert_eq!(halls[1].screen_type, ScreenType::ThreeD);
        assert_eq!(halls[2].screen_type, ScreenType::Standard);
        assert_eq!(halls[1].sound_system, SoundSystem::DolbyAtmos);
        assert_eq!(halls[2].sound_system, SoundSystem::Digital51);
        assert_eq!(halls[2].capacity, 250);
        assert!(halls.iter().all(|h| h.cinema_id == cinema_id));
    }

    #[test]
    fn test_show_pricing() {
        let price = ApolloMapper::show_pricing(&json!({"PriceInCents": "1000"}));
        assert_eq!(price.standard, 10.0);
        assert_eq!(price.student, Some(8.0));
        assert_eq!(price.child, Some(6.0));
        assert_eq!(price.vip, Some(15.0));

        assert_eq!(ApolloMapper::show_pricing(&json!({})), FALLBACK_PRICE);
        assert_eq!(ApolloMapper::show_pricing(&json!({"PriceInCents": 0})), FALLBACK_PRICE);
    }

    #[test]
    fn test_is_3d() {
        assert!(ApolloMapper::is_3d(&json!({"PresentationMethod": "3D"})));
        assert!(ApolloMapper::is_3d(&json!({"PresentationMethod": "IMAX 3D"})));
        assert!(!ApolloMapper::is_3d(&json!({"PresentationMethod": "2D"})));
        assert!(!ApolloMapper::is_3d(&json!({})));
    }
}
