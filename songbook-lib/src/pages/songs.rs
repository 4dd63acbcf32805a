//! The song list

use async_trait::async_trait;
use futures::FutureExt;
use songbook_table::column::Alignment;
use songbook_table::Column;
use songbook_table::ColumnDefinition;
use songbook_table::DataSource;
use songbook_table::FilterModel;
use songbook_table::FilterOption;
use songbook_table::FilterSettings;
use songbook_table::LoadError;
use songbook_table::LoadRequest;
use songbook_table::OptionSource;
use songbook_table::OptionsError;
use songbook_table::TableRow;

use super::is_empty_window;
use super::options_filter;
use super::page_options;
use super::presence_filter;
use super::text_filter;
use crate::CmsClient;
use crate::api::SONG_AUTHOR_ID;
use crate::api::SONG_GENRE_ID;
use crate::api::query::Filter;
use crate::api::query::QueryOptions;
use crate::error::Error;
use crate::model::Song;

impl TableRow for Song {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            "text" => Some(self.plain_text()),
            _ => None,
        }
    }
}

/// Translates the song list's filter model into a CMS filter.
///
/// Title and description match case-insensitively, authors and genres
/// match any of the selected ids, and the PDF/audio toggles require the
/// file to be present. Returns `None` when nothing is filtered.
pub fn song_filter(model: &FilterModel) -> Option<Filter> {
    Filter::all([
        options_filter(model, "authors", SONG_AUTHOR_ID),
        options_filter(model, "genres", SONG_GENRE_ID),
        presence_filter(model, "pdf", "pdf"),
        presence_filter(model, "audio", "audio"),
        text_filter(model, "title", "title"),
        text_filter(model, "text", "text"),
    ])
}

fn genre_options(client: &CmsClient) -> OptionSource {
    let client = client.clone();
    OptionSource::load(move || {
        let client = client.clone();
        async move {
            let genres = client
                .find_genres(QueryOptions::new().fields(&["id", "name"]))
                .await?;
            Ok::<_, OptionsError>(
                genres
                    .into_iter()
                    .map(|genre| FilterOption::new(genre.id, genre.name))
                    .collect(),
            )
        }
        .boxed()
    })
}

fn author_options(client: &CmsClient) -> OptionSource {
    let client = client.clone();
    OptionSource::load(move || {
        let client = client.clone();
        async move {
            let authors = client
                .find_authors(QueryOptions::new().fields(&["id", "name", "first_name"]))
                .await?;
            Ok::<_, OptionsError>(
                authors
                    .into_iter()
                    .map(|author| FilterOption::new(author.id, author.full_name()))
                    .collect(),
            )
        }
        .boxed()
    })
}

/// Columns of the song list.
///
/// Genre and author options are loaded from the CMS the first time their
/// dropdown opens.
pub fn song_columns(client: &CmsClient) -> ColumnDefinition<Song> {
    let assets = client.clone();
    ColumnDefinition::new()
        .column(
            "preview_image",
            Column::new("Preview")
                .align(Alignment::Center)
                .max_width("128px")
                .render(move |song: &Song, _| {
                    song.preview_image
                        .as_deref()
                        .map(|id| assets.asset_url(id))
                        .unwrap_or_default()
                }),
        )
        .column(
            "title",
            Column::new("Title")
                .min_width("fit-content")
                .sortable_by(|song: &Song| song.title.to_lowercase())
                .render(|song: &Song, _| song.title.clone())
                .filter(FilterSettings::text("Title contains", 0)),
        )
        .column(
            "text",
            Column::new("Description")
                .render(|song: &Song, _| song.plain_text())
                .filter(FilterSettings::text("Description contains", 5)),
        )
        .column(
            "genres",
            Column::new("Genres")
                .max_width("250px")
                .render(|song: &Song, _| {
                    song.genres().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", ")
                })
                .filter(FilterSettings::multi_select("Genre", genre_options(client), 1)),
        )
        .column(
            "authors",
            Column::new("Authors")
                .max_width("250px")
                .render(|song: &Song, _| {
                    song.authors().map(|a| a.full_name()).collect::<Vec<_>>().join(", ")
                })
                .filter(FilterSettings::multi_select("Author", author_options(client), 2)),
        )
        .column(
            "pdf",
            Column::new("PDF")
                .align(Alignment::Center)
                .render(|song: &Song, _| String::from(if song.has_pdf() { "PDF" } else { "" }))
                .filter(FilterSettings::boolean("PDF", 3)),
        )
        .column(
            "audio",
            Column::new("Audio")
                .align(Alignment::Center)
                .render(|song: &Song, _| String::from(if song.has_audio() { "Audio" } else { "" }))
                .filter(FilterSettings::boolean("Audio preview", 4)),
        )
}

/// Which songs a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SongScope {
    #[default]
    All,
    /// Songs linked to an author.
    Author(i64),
    /// Songs tagged with a genre.
    Genre(i64),
}

impl SongScope {
    fn filter(self) -> Option<Filter> {
        match self {
            SongScope::All => None,
            SongScope::Author(id) => Some(Filter::eq(SONG_AUTHOR_ID, id)),
            SongScope::Genre(id) => Some(Filter::eq(SONG_GENRE_ID, id)),
        }
    }
}

/// Loads pages of songs from the CMS.
#[derive(Debug, Clone)]
pub struct SongListSource {
    client: CmsClient,
    scope: SongScope,
}

impl SongListSource {
    pub fn new(client: CmsClient) -> Self {
        Self {
            client,
            scope: SongScope::All,
        }
    }

    pub fn with_scope(mut self, scope: SongScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> SongScope {
        self.scope
    }

    /// The CMS filter for a filter model within this list's scope.
    pub fn filter(&self, model: &FilterModel) -> Option<Filter> {
        Filter::all([self.scope.filter(), song_filter(model)])
    }

    /// Counts the songs matching a filter model, for the table's total.
    pub async fn count(&self, model: &FilterModel) -> Result<usize, Error> {
        self.client.count_songs(self.filter(model)).await
    }
}

#[async_trait]
impl DataSource<Song> for SongListSource {
    async fn load(&self, request: LoadRequest) -> Result<Vec<Song>, LoadError> {
        if is_empty_window(&request) {
            return Ok(Vec::new());
        }
        let options = page_options(&request, song_filter(&request.filter));
        let songs = match self.scope {
            SongScope::All => self.client.find_songs(options).await?,
            SongScope::Author(id) => self.client.find_songs_by_author_id(id, options).await?,
            SongScope::Genre(id) => self.client.find_songs_by_genre_id(id, options).await?,
        };
        Ok(songs)
    }
}
