use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::de;

/// A genre songs are tagged with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub name: String,
    /// Number of tagged songs, present when requested with `count(songs)`.
    #[serde(default, alias = "song_count", deserialize_with = "de::opt_count")]
    pub songs_count: Option<u64>,
}
