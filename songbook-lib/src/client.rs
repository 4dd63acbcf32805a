//! Main CmsClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use url::Url;

use crate::api::query::ItemsQuery;
use crate::error::ApiError;
use crate::error::Error;

/// The main client for the songbook CMS.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```ignore
/// use songbook_lib::CmsClient;
///
/// let client = CmsClient::builder()
///     .url("https://cms.example.org")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let songs = client.find_songs(QueryOptions::default()).await?;
/// ```
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<CmsClientInner>,
}

struct CmsClientInner {
    base_url: Url,
    access_token: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for CmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.access_token.is_some())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl CmsClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> CmsClientBuilder<Missing> {
        CmsClientBuilder::new()
    }

    /// Returns the base URL of the CMS.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the public URL of an uploaded file.
    pub fn asset_url(&self, file_id: &str) -> String {
        self.endpoint(&["assets", file_id]).to_string()
    }

    /// Starts a query against an item collection.
    pub fn items(&self, collection: impl Into<String>) -> ItemsQuery<'_> {
        ItemsQuery::new(self, collection)
    }

    /// Builds an API URL from path segments, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends a request and turns a non-success status into an error.
    pub(crate) async fn request(&self, method: Method, url: Url) -> Result<reqwest::Response, Error> {
        log::debug!("{} {}", method, url);

        let mut request = self.inner.http_client.request(method, url);

        if let Some(ref token) = self.inner.access_token {
            request = request.bearer_auth(token);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| match self.inner.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::from(e),
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            log::warn!("CMS answered {}: {}", status, body);
            Err(Error::Api(ApiError::from_body(status.as_u16(), body)))
        }
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`CmsClient`].
///
/// Uses the typestate pattern to ensure the CMS URL is set at compile time.
///
/// # Example
///
/// ```ignore
/// let client = CmsClient::builder()
///     .url("https://cms.example.org")
///     .access_token("static-token")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct CmsClientBuilder<U> {
    url: U,
    access_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl CmsClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            access_token: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the CMS base URL.
    pub fn url(self, url: impl Into<String>) -> CmsClientBuilder<Set<String>> {
        CmsClientBuilder {
            url: Set(url.into()),
            access_token: self.access_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for CmsClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> CmsClientBuilder<U> {
    /// Sets a static access token sent as bearer authentication.
    ///
    /// Without one, requests use the CMS's public role.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl CmsClientBuilder<Set<String>> {
    /// Builds the [`CmsClient`].
    ///
    /// Fails if the URL cannot be parsed or cannot carry a path.
    pub fn build(self) -> Result<CmsClient, Error> {
        let raw = self.url.0;
        let base_url = Url::parse(&raw).map_err(|source| Error::InvalidBaseUrl {
            url: raw.clone(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: raw,
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(CmsClient {
            inner: Arc::new(CmsClientInner {
                base_url,
                access_token: self.access_token,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
