// src/services/session_planner.rs
// DOCUMENTATION: Timetable generation for films without upstream schedules
// PURPOSE: Plan sample and upcoming screenings over a range of days

use crate::models::{Film, Hall, NewSession, SessionPrice, SessionStatus};
use crate::services::apollo_feed::SESSION_BUFFER_MINUTES;
use crate::services::date_range::local_to_utc;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// One daily screening time and its prices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowSlot {
    pub hour: u32,
    pub minute: u32,
    pub price: SessionPrice,
}

/// How the subtitles column is filled
#[derive(Debug, Clone, PartialEq)]
pub enum SubtitleRule {
    Fixed(String),
    /// First subtitle language of the film, or "None"
    FirstOfFilm,
}

/// Screening plan over consecutive days
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub first_day: NaiveDate,
    pub days: i64,
    pub slots: Vec<ShowSlot>,
    pub film_limit: Option<usize>,
    /// Slots starting earlier are skipped
    pub not_before: Option<DateTime<Utc>>,
    pub subtitles: SubtitleRule,
}

fn slot(hour: u32, minute: u32, standard: f64, vip: f64, student: f64, child: f64) -> ShowSlot {
    ShowSlot {
        hour,
        minute,
        price: SessionPrice {
            standard,
            vip: Some(vip),
            student: Some(student),
            child: Some(child),
        },
    }
}

impl SessionPlan {
    /// Sample week used when an Apollo refresh produced no sessions
    /// DOCUMENTATION: First 10 films, four shows a day priced 8.50 + 1.00 per slot
    pub fn sample_week(today: NaiveDate, now: DateTime<Utc>) -> Self {
        SessionPlan {
            first_day: today,
            days: 7,
            slots: vec![
                slot(10, 0, 8.50, 12.00, 6.50, 5.00),
                slot(14, 30, 9.50, 12.00, 6.50, 5.00),
                slot(19, 0, 10.50, 12.00, 6.50, 5.00),
                slot(21, 30, 11.50, 12.00, 6.50, 5.00),
            ],
            film_limit: Some(10),
            not_before: Some(now),
            subtitles: SubtitleRule::Fixed("Estonian".to_string()),
        }
    }

    /// Upcoming screenings for every film
    /// DOCUMENTATION: Three shows a day priced 8.50 + 0.50 per slot
    pub fn upcoming(today: NaiveDate, days: i64) -> Self {
        SessionPlan {
            first_day: today,
            days,
            slots: vec![
                slot(10, 0, 8.50, 12.00, 6.00, 5.00),
                slot(14, 30, 9.00, 12.00, 6.00, 5.00),
                slot(19, 0, 9.50, 12.00, 6.00, 5.00),
            ],
            film_limit: None,
            not_before: None,
            subtitles: SubtitleRule::FirstOfFilm,
        }
    }

    fn subtitles_for(&self, film: &Film) -> String {
        match &self.subtitles {
            SubtitleRule::Fixed(value) => value.clone(),
            SubtitleRule::FirstOfFilm => film
                .subtitles
                .first()
                .cloned()
                .unwrap_or_else(|| "None".to_string()),
        }
    }

    /// Expand the plan into sessions
    /// DOCUMENTATION: Halls are handed out round-robin in planning order.
    /// A session is 3D when its hall has a 3D screen.
    pub fn plan(&self, films: &[Film], halls: &[Hall]) -> Vec<NewSession> {
        let mut sessions = Vec::new();
        if halls.is_empty() {
            return sessions;
        }

        let films = match self.film_limit {
            Some(limit) => &films[..films.len().min(limit)],
            None => films,
        };
        let mut next_hall = 0usize;

        for offset in 0..self.days.max(0) {
            let day = self.first_day + Duration::days(offset);

            for film in films {
                for slot in &self.slots {
                    let Some(start_time) = day
                        .and_hms_opt(slot.hour, slot.minute, 0)
                        .and_then(local_to_utc)
                    else {
                        continue;
                    };
                    if self.not_before.is_some_and(|limit| start_time < limit) {
                        continue;
                    }

                    let hall = &halls[next_hall % halls.len()];
                    next_hall += 1;

                    sessions.push(NewSession {
                        film_id: film.id,
                        hall_id: hall.id,
                        start_time,
                        end_time: start_time
                            + Duration::minutes(i64::from(film.duration) + SESSION_BUFFER_MINUTES),
                        price: slot.price,
                        is_3d: hall.screen_type == "3D",
                        language: Some(film.language.clone()),
                        subtitles: Some(self.subtitles_for(film)),
                        available_seats: hall.capacity,
                        status: SessionStatus::Scheduled,
                    });
                }
            }
        }

        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn film(title: &str, subtitles: &[&str]) -> Film {
        Film {
            id: Uuid::new_v4(),
            title: title.into(),
            original_title: None,
            description: "d".into(),
            duration: 100,
            genre: vec![],
            director: "x".into(),
            cast_members: vec![],
            release_date: Utc::now(),
            language: "English".into(),
            subtitles: subtitles.iter().map(|s| s.to_string()).collect(),
            age_rating: "G".into(),
            poster_url: None,
            trailer_url: None,
            rating: None,
            is_active: true,
            apollo_id: None,
            production_year: None,
            event_url: None,
            created_at: Utc::now(),
        }
    }

    fn hall(screen_type: &str, capacity: i32) -> Hall {
        Hall {
            id: Uuid::new_v4(),
            cinema_id: Uuid::new_v4(),
            name: "Hall".into(),
            capacity,
            rows: 10,
            seats_per_row: 10,
            screen_type: screen_type.into(),
            sound_system: "Standard".into(),
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_upcoming_plan_counts_and_prices() {
        let films = vec![film("A", &["Estonian", "Russian"]), film("B", &[])];
        let halls = vec![hall("3D", 120), hall("IMAX", 200)];

        let sessions = SessionPlan::upcoming(day(10), 7).plan(&films, &halls);
        assert_eq!(sessions.len(), 7 * 2 * 3);

        let prices: Vec<f64> = sessions[..3].iter().map(|s| s.price.standard).collect();
        assert_eq!(prices, vec![8.5, 9.0, 9.5]);
        assert_eq!(sessions[0].price.student, Some(6.0));
        assert_eq!(sessions[0].subtitles.as_deref(), Some("Estonian"));
        assert_eq!(sessions[3].subtitles.as_deref(), Some("None"));
        assert_eq!(
            sessions[0].end_time - sessions[0].start_time,
            Duration::minutes(115)
        );
    }

    #[test]
    fn test_halls_rotate_round_robin() {
        let films = vec![film("A", &[])];
        let halls = vec![hall("3D", 120), hall("Standard", 80)];

        let sessions = SessionPlan::upcoming(day(10), 1).plan(&films, &halls);
        assert_eq!(sessions[0].hall_id, halls[0].id);
        assert_eq!(sessions[1].hall_id, halls[1].id);
        assert_eq!(sessions[2].hall_id, halls[0].id);
        assert!(sessions[0].is_3d);
        assert!(!sessions[1].is_3d);
        assert_eq!(sessions[1].available_seats, 80);
    }

    #[test]
    fn test_sample_week_skips_past_and_limits_films() {
        let films: Vec<Film> = (0..12).map(|i| film(&format!("F{}", i), &[])).collect();
        let halls = vec![hall("Standard", 100)];

        let all = SessionPlan::sample_week(day(10), Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
            .plan(&films, &halls);
        assert_eq!(all.len(), 7 * 10 * 4);
        assert_eq!(all[3].price.standard, 11.5);
        assert_eq!(all[0].subtitles.as_deref(), Some("Estonian"));

        let now = local_to_utc(day(10).and_hms_opt(15, 0, 0).unwrap()).unwrap();
        let later = SessionPlan::sample_week(day(10), now).plan(&films, &halls);
        // 19:00 and 21:30 remain on the first day
        assert_eq!(later.len(), 6 * 10 * 4 + 10 * 2);
        assert!(later.iter().all(|s| s.start_time >= now));
    }

    #[test]
    fn test_no_halls_no_sessions() {
        assert!(SessionPlan::upcoming(day(1), 3).plan(&[film("A", &[])], &[]).is_empty());
    }
}
