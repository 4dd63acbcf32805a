//! Catalog lookups
//!
//! Each `find_*` function starts from a default query (fields and sort) and
//! overlays the caller's [`QueryOptions`]. A caller filter replaces the
//! default filter, except where the function scopes the query itself
//! (`find_songs_by_*`, `find_static_pages`); such scopes are ANDed with it.

use crate::CmsClient;
use crate::api::query::Filter;
use crate::api::query::QueryOptions;
use crate::api::query::Sort;
use crate::error::Error;
use crate::model::Author;
use crate::model::Genre;
use crate::model::Song;
use crate::model::StaticPage;

pub const SONGS: &str = "songs";
pub const AUTHORS: &str = "authors";
pub const GENRES: &str = "genres";
pub const STATIC_PAGES: &str = "static_pages";

/// Fields requested for songs, including the linked authors and genres.
pub const SONG_FIELDS: &[&str] = &[
    "id",
    "date_created",
    "date_updated",
    "title",
    "text",
    "pdf",
    "preview_image",
    "audio",
    "authors.id",
    "authors.authors_id.id",
    "authors.authors_id.name",
    "authors.authors_id.first_name",
    "genres.id",
    "genres.genres_id.id",
    "genres.genres_id.name",
];

/// Fields requested for author listings.
pub const AUTHOR_FIELDS: &[&str] = &["id", "name", "first_name", "image", "description", "count(songs)"];

/// Fields requested for genre listings.
pub const GENRE_FIELDS: &[&str] = &["id", "name", "count(songs)"];

/// Fields requested for page listings; the content is only loaded by id.
pub const STATIC_PAGE_LIST_FIELDS: &[&str] = &["id", "title"];

/// Relational path from a song to its authors' ids.
pub const SONG_AUTHOR_ID: &str = "authors.authors_id.id";

/// Relational path from a song to its genres' ids.
pub const SONG_GENRE_ID: &str = "genres.genres_id.id";

/// Songs returned by a catalog-wide [`CmsClient::search`].
pub const SEARCH_SONG_LIMIT: usize = 25;

/// Songs returned by a songs-only search.
pub const SONG_SEARCH_LIMIT: usize = 100;

/// Matches of a catalog-wide search, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub songs: Vec<Song>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.authors.is_empty() && self.genres.is_empty()
    }
}

/// Songs whose title, text, author name or genre name contain `term`.
/// A blank term matches everything.
pub fn song_search_filter(term: &str) -> Option<Filter> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    Some(Filter::or([
        Filter::icontains("title", term),
        Filter::icontains("text", term),
        Filter::icontains("authors.authors_id.name", term),
        Filter::icontains("genres.genres_id.name", term),
    ]))
}

fn name_search_options(term: &str) -> QueryOptions {
    let term = term.trim();
    if term.is_empty() {
        QueryOptions::new()
    } else {
        QueryOptions::new().filter(Filter::icontains("name", term))
    }
}

/// Combines a scope filter with the caller's filter.
fn scoped(scope: Filter, mut options: QueryOptions) -> QueryOptions {
    options.filter = Some(match options.filter.take() {
        Some(filter) => scope.and_also(filter),
        None => scope,
    });
    options
}

impl CmsClient {
    /// Finds songs, sorted by title unless the options say otherwise.
    pub async fn find_songs(&self, options: QueryOptions) -> Result<Vec<Song>, Error> {
        self.items(SONGS)
            .fields(SONG_FIELDS)
            .sort(Sort::asc("title"))
            .options(options)
            .execute()
            .await
    }

    /// Counts the songs matching an optional filter.
    pub async fn count_songs(&self, filter: Option<Filter>) -> Result<usize, Error> {
        let query = self.items(SONGS);
        match filter {
            Some(filter) => query.filter(filter).count().await,
            None => query.count().await,
        }
    }

    /// Finds a song by id. Returns `None` if there is no such song.
    pub async fn find_song_by_id(&self, id: &str) -> Result<Option<Song>, Error> {
        self.items(SONGS)
            .fields(SONG_FIELDS)
            .filter(Filter::eq("id", id))
            .first()
            .await
    }

    /// Finds the songs linked to an author.
    pub async fn find_songs_by_author_id(&self, author_id: i64, options: QueryOptions) -> Result<Vec<Song>, Error> {
        self.find_songs(scoped(Filter::eq(SONG_AUTHOR_ID, author_id), options))
            .await
    }

    /// Finds the songs tagged with a genre.
    pub async fn find_songs_by_genre_id(&self, genre_id: i64, options: QueryOptions) -> Result<Vec<Song>, Error> {
        self.find_songs(scoped(Filter::eq(SONG_GENRE_ID, genre_id), options))
            .await
    }

    /// Finds authors, sorted by name unless the options say otherwise.
    pub async fn find_authors(&self, options: QueryOptions) -> Result<Vec<Author>, Error> {
        self.items(AUTHORS)
            .fields(AUTHOR_FIELDS)
            .sort(Sort::asc("name"))
            .options(options)
            .execute()
            .await
    }

    /// Counts the authors matching an optional filter.
    pub async fn count_authors(&self, filter: Option<Filter>) -> Result<usize, Error> {
        let query = self.items(AUTHORS);
        match filter {
            Some(filter) => query.filter(filter).count().await,
            None => query.count().await,
        }
    }

    /// Finds an author by id.
    pub async fn find_author_by_id(&self, id: i64) -> Result<Option<Author>, Error> {
        self.items(AUTHORS)
            .fields(AUTHOR_FIELDS)
            .filter(Filter::eq("id", id))
            .first()
            .await
    }

    /// Finds genres, sorted by name unless the options say otherwise.
    pub async fn find_genres(&self, options: QueryOptions) -> Result<Vec<Genre>, Error> {
        self.items(GENRES)
            .fields(GENRE_FIELDS)
            .sort(Sort::asc("name"))
            .options(options)
            .execute()
            .await
    }

    /// Counts the genres matching an optional filter.
    pub async fn count_genres(&self, filter: Option<Filter>) -> Result<usize, Error> {
        let query = self.items(GENRES);
        match filter {
            Some(filter) => query.filter(filter).count().await,
            None => query.count().await,
        }
    }

    /// Finds a genre by id.
    pub async fn find_genre_by_id(&self, id: i64) -> Result<Option<Genre>, Error> {
        self.items(GENRES)
            .fields(GENRE_FIELDS)
            .filter(Filter::eq("id", id))
            .first()
            .await
    }

    /// Finds up to `limit` songs matching a search term.
    pub async fn search_songs(&self, term: &str, limit: usize) -> Result<Vec<Song>, Error> {
        let options = QueryOptions::new().limit(limit);
        let options = match song_search_filter(term) {
            Some(filter) => options.filter(filter),
            None => options,
        };
        self.find_songs(options).await
    }

    /// Searches songs, authors and genres at once.
    pub async fn search(&self, term: &str) -> Result<SearchResults, Error> {
        log::debug!("Searching catalog for {:?}", term);
        let (songs, authors, genres) = futures::try_join!(
            self.search_songs(term, SEARCH_SONG_LIMIT),
            self.find_authors(name_search_options(term)),
            self.find_genres(name_search_options(term)),
        )?;
        Ok(SearchResults {
            songs,
            authors,
            genres,
        })
    }

    /// Lists the visible static pages (id and title only), sorted by title.
    pub async fn find_static_pages(&self, options: QueryOptions) -> Result<Vec<StaticPage>, Error> {
        self.items(STATIC_PAGES)
            .fields(STATIC_PAGE_LIST_FIELDS)
            .sort(Sort::asc("title"))
            .options(scoped(Filter::eq("visible", true), options))
            .execute()
            .await
    }

    /// Finds a static page with its content.
    pub async fn find_static_page_by_id(&self, id: i64) -> Result<Option<StaticPage>, Error> {
        self.items(STATIC_PAGES)
            .filter(Filter::eq("id", id))
            .first()
            .await
    }
}
