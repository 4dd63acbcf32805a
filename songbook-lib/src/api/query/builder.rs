//! Item query builder.

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::CmsClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::de::Count;

use super::Filter;
use super::Sort;
use super::url::filter_to_json;
use super::url::sort_to_param;

/// Caller supplied query options.
///
/// Every option that is set replaces the corresponding default of the
/// `find_*` function it is passed to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub fields: Option<Vec<String>>,
    pub filter: Option<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|s| (*s).to_string()).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// `{"data": ...}` wrapper around every item response.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: Count,
}

/// Builder for item collection queries.
///
/// Use [`CmsClient::items`] to create a query builder.
///
/// # Example
///
/// ```ignore
/// let songs: Vec<Song> = client.items("songs")
///     .fields(&["id", "title"])
///     .filter(Filter::icontains("title", "grace"))
///     .sort(Sort::asc("title"))
///     .limit(25)
///     .execute()
///     .await?;
/// ```
pub struct ItemsQuery<'a> {
    client: &'a CmsClient,
    collection: String,
    options: QueryOptions,
}

impl<'a> ItemsQuery<'a> {
    pub(crate) fn new(client: &'a CmsClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            options: QueryOptions::default(),
        }
    }

    /// Specifies which fields to return.
    ///
    /// If not called, the CMS returns all top level fields.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.options = self.options.fields(fields);
        self
    }

    /// Sets the filter, replacing any previous one.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.options.filter = Some(filter);
        self
    }

    /// ANDs a filter onto the current one.
    pub fn and_filter(mut self, filter: Filter) -> Self {
        self.options.filter = match self.options.filter.take() {
            Some(current) => Some(current.and_also(filter)),
            None => Some(filter),
        };
        self
    }

    /// Sets the ordering of results.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.options.sort = Some(sort);
        self
    }

    /// Limits the number of items returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Skips the first `offset` matching items.
    pub fn offset(mut self, offset: usize) -> Self {
        self.options.offset = Some(offset);
        self
    }

    /// Full text search across the collection's string fields.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.options.search = Some(search.into());
        self
    }

    /// Overlays caller options onto this query.
    pub fn options(mut self, options: QueryOptions) -> Self {
        let QueryOptions {
            fields,
            filter,
            sort,
            limit,
            offset,
            search,
        } = options;
        if fields.is_some() {
            self.options.fields = fields;
        }
        if filter.is_some() {
            self.options.filter = filter;
        }
        if sort.is_some() {
            self.options.sort = sort;
        }
        if limit.is_some() {
            self.options.limit = limit;
        }
        if offset.is_some() {
            self.options.offset = offset;
        }
        if search.is_some() {
            self.options.search = search;
        }
        self
    }

    /// Builds the `/items/{collection}` URL with its query string.
    pub(crate) fn build_url(&self) -> Url {
        let mut url = self.client.endpoint(&["items", &self.collection]);
        self.append_params(&mut url, false);
        url
    }

    fn append_params(&self, url: &mut Url, count_only: bool) {
        let options = &self.options;
        let mut params = url.query_pairs_mut();

        if count_only {
            params.append_pair("aggregate[count]", "*");
        } else if let Some(ref fields) = options.fields {
            params.append_pair("fields", &fields.join(","));
        }

        if let Some(ref filter) = options.filter {
            params.append_pair("filter", &filter_to_json(filter).to_string());
        }

        if let Some(ref search) = options.search {
            params.append_pair("search", search);
        }

        if !count_only {
            if let Some(ref sort) = options.sort {
                params.append_pair("sort", &sort_to_param(sort));
            }
            if let Some(limit) = options.limit {
                params.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = options.offset {
                params.append_pair("offset", &offset.to_string());
            }
        }

        drop(params);
        if url.query() == Some("") {
            url.set_query(None);
        }
    }

    /// Executes the query and returns the matching items.
    ///
    /// A response without `data` is an empty result.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let url = self.build_url();
        let response = self.client.request(Method::GET, url).await?;
        let body = response.text().await.map_err(ApiError::from)?;
        let envelope: DataEnvelope<Vec<T>> = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(format!("Invalid {} response: {}", self.collection, e), body))?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Executes the query and returns the first matching item.
    pub async fn first<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let items: Vec<T> = self.limit(1).execute().await?;
        Ok(items.into_iter().next())
    }

    /// Counts the items matching the filter and search.
    ///
    /// Uses `aggregate[count]=*`; the CMS may report the count as a number
    /// or as a numeric string.
    pub async fn count(self) -> Result<usize, Error> {
        let mut url = self.client.endpoint(&["items", &self.collection]);
        self.append_params(&mut url, true);

        let response = self.client.request(Method::GET, url).await?;
        let body = response.text().await.map_err(ApiError::from)?;
        let envelope: DataEnvelope<Vec<CountRow>> = serde_json::from_str(&body).map_err(|_| {
            ApiError::parse_with_body(format!("Invalid count response: {}", body), body.clone())
        })?;

        let row = envelope.data.and_then(|rows| rows.into_iter().next());
        Ok(row.map(|row| row.count.0).unwrap_or(0))
    }
}
