//! Drives a [`SearchableTable`] for one page of a collection.

use async_trait::async_trait;
use songbook_lib::CmsClient;
use songbook_lib::error::Error as CmsError;
use songbook_lib::model::Author;
use songbook_lib::model::Genre;
use songbook_lib::model::Song;
use songbook_lib::pages::AuthorListSource;
use songbook_lib::pages::GenreListSource;
use songbook_lib::pages::SongListSource;
use songbook_lib::pages::SongScope;
use songbook_lib::pages::authors::author_columns;
use songbook_lib::pages::genres::genre_columns;
use songbook_lib::pages::songs::song_columns;
use songbook_table::ColumnDefinition;
use songbook_table::DataSource;
use songbook_table::FilterModel;
use songbook_table::LoadError;
use songbook_table::Location;
use songbook_table::Order;
use songbook_table::SearchableTable;
use songbook_table::TableConfig;
use songbook_table::TableError;
use songbook_table::TableRow;
use thiserror::Error;
use url::Url;

use crate::render::PageView;

/// Host of the synthetic location the filter parameter is read from.
const SHARE_BASE: &str = "https://songbook.local/";

/// Error type for loading a view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Cms(#[from] CmsError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("loading rows failed: {0}")]
    Load(#[from] LoadError),
    #[error("invalid filter JSON: {0}")]
    InvalidFilter(#[source] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// What to show.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Raw `filter` query parameter value.
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub page: usize,
    pub rows_per_page: Option<usize>,
}

/// A data source that can also count its rows.
#[async_trait]
pub trait CountingSource<T: TableRow>: DataSource<T> + Clone + 'static {
    async fn count_rows(&self, model: &FilterModel) -> Result<usize, CmsError>;
}

#[async_trait]
impl CountingSource<Song> for SongListSource {
    async fn count_rows(&self, model: &FilterModel) -> Result<usize, CmsError> {
        self.count(model).await
    }
}

#[async_trait]
impl CountingSource<Author> for AuthorListSource {
    async fn count_rows(&self, model: &FilterModel) -> Result<usize, CmsError> {
        self.count(model).await
    }
}

#[async_trait]
impl CountingSource<Genre> for GenreListSource {
    async fn count_rows(&self, model: &FilterModel) -> Result<usize, CmsError> {
        self.count(model).await
    }
}

/// The location a table reads its filters from, e.g.
/// `https://songbook.local/songs?filter=%7B%22pdf%22%3Atrue%7D`.
pub fn location_for(collection: &str, filter: Option<&str>) -> Result<Location, ViewError> {
    let mut url = Url::parse(SHARE_BASE)?.join(collection)?;
    if let Some(raw) = filter {
        serde_json::from_str::<serde_json::Value>(raw).map_err(ViewError::InvalidFilter)?;
        url.query_pairs_mut().append_pair("filter", raw);
    }
    Ok(Location::new(url))
}

/// Loads one page and returns what to print.
pub async fn show_page<T, S>(
    collection: &str,
    title: &str,
    default_sort: &str,
    columns: ColumnDefinition<T>,
    source: S,
    options: &ListOptions,
) -> Result<PageView, ViewError>
where
    T: TableRow,
    S: CountingSource<T>,
{
    let direction = if options.descending { Order::Desc } else { Order::Asc };
    let mut config = TableConfig::new(options.sort.as_deref().unwrap_or(default_sort))
        .with_default_direction(direction)
        .with_title(title)
        .with_url_filtering(location_for(collection, options.filter.as_deref())?);
    if let Some(rows_per_page) = options.rows_per_page {
        config = config.with_rows_per_page(rows_per_page);
    }

    let table = SearchableTable::new(columns, source.clone(), 0, config)?;
    let total = source.count_rows(&table.committed_filter()).await?;
    log::info!("{}: {} matching rows", collection, total);

    table.set_total_row_count(total);
    table.change_page(options.page)?;
    table.settled().await;

    if let Some(error) = table.error() {
        return Err(error.into());
    }

    Ok(PageView {
        title: table.title().map(str::to_string),
        header: table.header(),
        rows: table.rendered_rows().into_iter().map(|row| row.cells).collect(),
        no_data_text: table.no_data_text().to_string(),
        displayed_rows: table.displayed_rows_label(),
        entries_found: table.entries_found_label(),
        filter_param: table.filter_param(),
    })
}

pub async fn show_songs(client: &CmsClient, scope: SongScope, options: &ListOptions) -> Result<PageView, ViewError> {
    let title = match scope {
        SongScope::All => "Songs".to_string(),
        SongScope::Author(id) => match client.find_author_by_id(id).await? {
            Some(author) => format!("Songs by {}", author.full_name()),
            None => format!("Songs by author {}", id),
        },
        SongScope::Genre(id) => match client.find_genre_by_id(id).await? {
            Some(genre) => format!("{} songs", genre.name),
            None => format!("Songs in genre {}", id),
        },
    };
    let source = SongListSource::new(client.clone()).with_scope(scope);
    show_page("songs", &title, "title", song_columns(client), source, options).await
}

pub async fn show_authors(client: &CmsClient, options: &ListOptions) -> Result<PageView, ViewError> {
    let source = AuthorListSource::new(client.clone());
    show_page("authors", "Authors", "name", author_columns(), source, options).await
}

pub async fn show_genres(client: &CmsClient, options: &ListOptions) -> Result<PageView, ViewError> {
    let source = GenreListSource::new(client.clone());
    show_page("genres", "Genres", "name", genre_columns(), source, options).await
}
