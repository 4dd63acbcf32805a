//! The genre list

use async_trait::async_trait;
use songbook_table::Column;
use songbook_table::ColumnDefinition;
use songbook_table::DataSource;
use songbook_table::FilterModel;
use songbook_table::FilterSettings;
use songbook_table::LoadError;
use songbook_table::LoadRequest;
use songbook_table::TableRow;
use songbook_table::column::Alignment;

use super::is_empty_window;
use super::page_options;
use super::text_filter;
use crate::CmsClient;
use crate::api::query::Filter;
use crate::error::Error;
use crate::model::Genre;

impl TableRow for Genre {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "songs_count" => self.songs_count.map(|n| n.to_string()),
            _ => None,
        }
    }
}

/// Columns of the genre list.
pub fn genre_columns() -> ColumnDefinition<Genre> {
    ColumnDefinition::new()
        .column(
            "name",
            Column::new("Name")
                .sortable_by(|genre: &Genre| genre.name.to_lowercase())
                .filter(FilterSettings::text("Name contains", 0)),
        )
        .column("songs_count", Column::new("Songs").align(Alignment::Right))
}

pub fn genre_filter(model: &FilterModel) -> Option<Filter> {
    text_filter(model, "name", "name")
}

/// Loads pages of genres from the CMS.
#[derive(Debug, Clone)]
pub struct GenreListSource {
    client: CmsClient,
}

impl GenreListSource {
    pub fn new(client: CmsClient) -> Self {
        Self { client }
    }

    pub async fn count(&self, model: &FilterModel) -> Result<usize, Error> {
        self.client.count_genres(genre_filter(model)).await
    }
}

#[async_trait]
impl DataSource<Genre> for GenreListSource {
    async fn load(&self, request: LoadRequest) -> Result<Vec<Genre>, LoadError> {
        if is_empty_window(&request) {
            return Ok(Vec::new());
        }
        let options = page_options(&request, genre_filter(&request.filter));
        Ok(self.client.find_genres(options).await?)
    }
}
