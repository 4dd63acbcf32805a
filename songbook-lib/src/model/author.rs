use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::de;

/// An author of songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    /// Family name, or the full name when no first name is stored.
    #[serde(default, deserialize_with = "de::nullable")]
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    /// File id of a portrait.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of linked songs, present when requested with `count(songs)`.
    #[serde(default, alias = "song_count", deserialize_with = "de::opt_count")]
    pub songs_count: Option<u64>,
}

impl Author {
    /// First and family name joined by a space.
    pub fn full_name(&self) -> String {
        match self.first_name.as_deref() {
            Some(first) if !first.is_empty() => format!("{} {}", first, self.name),
            _ => self.name.clone(),
        }
    }
}
