//! Songs and their junction rows

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Author;
use super::Genre;
use super::de;

/// A song of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier; numeric ids are kept as text.
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub title: String,
    /// Description as HTML.
    #[serde(default)]
    pub text: Option<String>,
    /// File id of the sheet music PDF.
    #[serde(default)]
    pub pdf: Option<String>,
    /// File id of the preview image.
    #[serde(default)]
    pub preview_image: Option<String>,
    /// File id of the audio preview.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub authors: Vec<SongAuthor>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub genres: Vec<SongGenre>,
}

/// Junction row linking a song to an author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAuthor {
    #[serde(default)]
    pub id: Option<i64>,
    pub authors_id: Author,
}

/// Junction row linking a song to a genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongGenre {
    #[serde(default)]
    pub id: Option<i64>,
    pub genres_id: Genre,
}

impl Song {
    pub fn has_pdf(&self) -> bool {
        self.pdf.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter().map(|link| &link.authors_id)
    }

    pub fn genres(&self) -> impl Iterator<Item = &Genre> {
        self.genres.iter().map(|link| &link.genres_id)
    }

    /// The description with markup removed and whitespace collapsed.
    pub fn plain_text(&self) -> String {
        self.text.as_deref().map(strip_markup).unwrap_or_default()
    }
}

/// Removes tags and decodes the handful of entities rich text editors emit.
pub(crate) fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
