// src/models/hall.rs
// DOCUMENTATION: Halls, their seat grid and seat categories
// PURPOSE: Layout data used for seat maps and booking validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::CinemaSummary;

/// Projection technology of a hall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenType {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
    #[serde(rename = "IMAX")]
    Imax,
    #[serde(rename = "4DX")]
    FourDx,
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Standard")]
    Standard,
}

impl ScreenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenType::TwoD => "2D",
            ScreenType::ThreeD => "3D",
            ScreenType::Imax => "IMAX",
            ScreenType::FourDx => "4DX",
            ScreenType::Vip => "VIP",
            ScreenType::Standard => "Standard",
        }
    }
}

/// Audio setup of a hall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundSystem {
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "Dolby Atmos")]
    DolbyAtmos,
    #[serde(rename = "DTS:X")]
    DtsX,
    #[serde(rename = "Digital 5.1")]
    Digital51,
}

impl SoundSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundSystem::Standard => "Standard",
            SoundSystem::DolbyAtmos => "Dolby Atmos",
            SoundSystem::DtsX => "DTS:X",
            SoundSystem::Digital51 => "Digital 5.1",
        }
    }
}

/// Seat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Standard,
    Vip,
    Twin,
    Wheelchair,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Standard => "standard",
            SeatType::Vip => "vip",
            SeatType::Twin => "twin",
            SeatType::Wheelchair => "wheelchair",
        }
    }
}

/// Hall row as stored in the halls table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: Uuid,
    #[serde(rename = "cinema")]
    pub cinema_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub rows: i32,
    pub seats_per_row: i32,
    pub screen_type: String,
    pub sound_system: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a hall
#[derive(Debug, Clone, PartialEq)]
pub struct NewHall {
    pub cinema_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub rows: i32,
    pub seats_per_row: i32,
    pub screen_type: ScreenType,
    pub sound_system: SoundSystem,
}

/// Partial hall update; None keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct HallChanges {
    pub cinema_id: Option<Uuid>,
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub rows: Option<i32>,
    pub seats_per_row: Option<i32>,
    pub screen_type: Option<ScreenType>,
    pub sound_system: Option<SoundSystem>,
}

impl HallChanges {
    /// Seats must be regenerated when the grid dimensions change
    pub fn changes_layout(&self) -> bool {
        self.rows.is_some() || self.seats_per_row.is_some()
    }
}

/// Hall with its cinema reference expanded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallWithCinema {
    pub id: Uuid,
    pub cinema: Option<CinemaSummary>,
    pub name: String,
    pub capacity: i32,
    pub rows: i32,
    pub seats_per_row: i32,
    pub screen_type: String,
    pub sound_system: String,
    pub created_at: DateTime<Utc>,
}

impl Hall {
    pub fn with_cinema(self, cinema: Option<CinemaSummary>) -> HallWithCinema {
        HallWithCinema {
            id: self.id,
            cinema,
            name: self.name,
            capacity: self.capacity,
            rows: self.rows,
            seats_per_row: self.seats_per_row,
            screen_type: self.screen_type,
            sound_system: self.sound_system,
            created_at: self.created_at,
        }
    }
}

/// Hall fields embedded in session and booking payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallSummary {
    pub id: Uuid,
    pub name: String,
    pub screen_type: String,
    pub sound_system: String,
    pub capacity: i32,
    pub rows: i32,
    pub seats_per_row: i32,
    pub cinema: Option<CinemaSummary>,
}

impl Hall {
    pub fn to_summary(&self, cinema: Option<CinemaSummary>) -> HallSummary {
        HallSummary {
            id: self.id,
            name: self.name.clone(),
            screen_type: self.screen_type.clone(),
            sound_system: self.sound_system.clone(),
            capacity: self.capacity,
            rows: self.rows,
            seats_per_row: self.seats_per_row,
            cinema,
        }
    }
}

/// Admin payload for POST /api/admin/halls and PUT /api/admin/halls/{id}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HallRequest {
    pub cinema: Option<String>,
    pub name: Option<String>,
    pub rows: Option<i32>,
    pub seats_per_row: Option<i32>,
    pub capacity: Option<i32>,
    pub screen_type: Option<ScreenType>,
    pub sound_system: Option<SoundSystem>,
}

/// Body of POST /api/admin/halls/{id}/seats/generate
/// Rows may be given as a JSON array or a comma separated string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLayoutRequest {
    #[serde(default)]
    pub vip_rows: Option<serde_json::Value>,
    #[serde(default)]
    pub twin_rows: Option<serde_json::Value>,
}

/// Seat row as stored in the seats table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: Uuid,
    #[serde(rename = "hall")]
    pub hall_id: Uuid,
    pub row: i32,
    pub number: i32,
    pub seat_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Seat {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Seat {
            id: row.try_get("id")?,
            hall_id: row.try_get("hall_id")?,
            row: row.try_get("row")?,
            number: row.try_get("number")?,
            seat_type: row.try_get("seat_type")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Seat to be written by a layout regeneration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSpec {
    pub row: i32,
    pub number: i32,
    pub seat_type: SeatType,
}

/// Seat counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeatStats {
    pub total: usize,
    pub vip: usize,
    pub twin: usize,
    pub standard: usize,
}

impl SeatStats {
    pub fn from_types<'a>(types: impl IntoIterator<Item = &'a str>) -> Self {
        let mut stats = SeatStats::default();
        for seat_type in types {
            stats.total += 1;
            match seat_type {
                "vip" => stats.vip += 1,
                "twin" => stats.twin += 1,
                "standard" => stats.standard += 1,
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&ScreenType::FourDx).unwrap(), "\"4DX\"");
        assert_eq!(
            serde_json::from_str::<SoundSystem>("\"Dolby Atmos\"").unwrap(),
            SoundSystem::DolbyAtmos
        );
        assert_eq!(SoundSystem::Digital51.as_str(), "Digital 5.1");
        assert!(serde_json::from_str::<ScreenType>("\"8K\"").is_err());
    }

    #[test]
    fn test_seat_stats_counts_known_types() {
        let stats = SeatStats::from_types(["vip", "standard", "twin", "standard", "wheelchair"]);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.vip, 1);
        assert_eq!(stats.twin, 1);
        assert_eq!(stats.standard, 2);
    }

    #[test]
    fn test_layout_change_detection() {
        let rename = HallChanges {
            name: Some("Hall 9".into()),
            ..Default::default()
        };
        assert!(!rename.changes_layout());

        let resize = HallChanges {
            rows: Some(12),
            ..Default::default()
        };
        assert!(resize.changes_layout());
    }
}
