//! Single-item and search views.

use std::future::Future;

use songbook_lib::CmsClient;
use songbook_lib::api::SONG_SEARCH_LIMIT;
use songbook_lib::api::SearchResults;
use songbook_lib::api::query::QueryOptions;
use songbook_lib::pages::authors::NameOrder;
use songbook_lib::pages::authors::group_by_initial;
use songbook_table::Fetch;
use songbook_table::LoadError;

use crate::list::ViewError;
use crate::render;

/// Runs `fetcher` once through a [`Fetch`] cell and hands back its result.
async fn fetch_once<T, F, Fut>(fetcher: F) -> Result<T, ViewError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
{
    let fetch = Fetch::new(fetcher);
    fetch.refetch().await;
    if let Some(error) = fetch.error() {
        return Err(error.into());
    }
    fetch
        .data()
        .ok_or_else(|| LoadError::new("fetch finished without data").into())
}

pub async fn song(client: &CmsClient, id: &str) -> Result<String, ViewError> {
    let fetcher = {
        let client = client.clone();
        let id = id.to_string();
        move || {
            let client = client.clone();
            let id = id.clone();
            async move { client.find_song_by_id(&id).await.map_err(LoadError::from) }
        }
    };

    match fetch_once(fetcher).await? {
        Some(song) => {
            log::debug!("showing song {} ({})", song.id, song.title);
            Ok(render::render_song(&song, |file| client.asset_url(file)))
        }
        None => Err(ViewError::NotFound {
            kind: "song",
            id: id.to_string(),
        }),
    }
}

pub async fn static_page(client: &CmsClient, id: i64) -> Result<String, ViewError> {
    let fetcher = {
        let client = client.clone();
        move || {
            let client = client.clone();
            async move { client.find_static_page_by_id(id).await.map_err(LoadError::from) }
        }
    };

    match fetch_once(fetcher).await? {
        Some(page) => Ok(render::render_static_page(&page)),
        None => Err(ViewError::NotFound {
            kind: "page",
            id: id.to_string(),
        }),
    }
}

pub async fn static_pages(client: &CmsClient) -> Result<String, ViewError> {
    let pages = client.find_static_pages(QueryOptions::new()).await?;
    Ok(render::render_static_page_list(&pages))
}

/// All authors grouped by initial. Counts first so a single request
/// returns every author.
pub async fn grouped_authors(client: &CmsClient, order: NameOrder) -> Result<String, ViewError> {
    let total = client.count_authors(None).await?;
    let authors = if total == 0 {
        Vec::new()
    } else {
        client.find_authors(QueryOptions::new().limit(total)).await?
    };
    log::info!("grouping {} authors", authors.len());
    Ok(render::render_grouped_authors(&group_by_initial(&authors, order), order))
}

/// Searches the whole catalog, or only songs with the larger song limit.
pub async fn search(client: &CmsClient, term: &str, songs_only: bool) -> Result<String, ViewError> {
    let results = if songs_only {
        SearchResults {
            songs: client.search_songs(term, SONG_SEARCH_LIMIT).await?,
            ..SearchResults::default()
        }
    } else {
        client.search(term).await?
    };
    log::info!(
        "search \"{}\": {} songs, {} authors, {} genres",
        term,
        results.songs.len(),
        results.authors.len(),
        results.genres.len()
    );
    Ok(render::render_search(term, &results))
}
