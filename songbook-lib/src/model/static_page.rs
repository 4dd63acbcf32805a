use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::de;

/// A free-form content page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub id: i64,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub title: String,
    /// Page body as HTML; omitted from listings.
    #[serde(default)]
    pub content: Option<String>,
    /// Whether the page is published.
    #[serde(default)]
    pub visible: bool,
}

impl StaticPage {
    /// The content with markup removed.
    pub fn plain_content(&self) -> String {
        self.content
            .as_deref()
            .map(super::song::strip_markup)
            .unwrap_or_default()
    }
}
