//! Error types

mod api;

pub use api::*;

use songbook_table::LoadError;
use songbook_table::OptionsError;

/// Errors returned by [`CmsClient`](crate::CmsClient) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The CMS request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The client was configured with an unusable base URL.
    #[error("Invalid CMS URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl Error {
    /// Returns the HTTP status code if the CMS answered with an error status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(api) => api.status_code(),
            Error::InvalidBaseUrl { .. } => None,
        }
    }
}

impl From<Error> for LoadError {
    fn from(e: Error) -> Self {
        LoadError::new(e.to_string())
    }
}

impl From<Error> for OptionsError {
    fn from(e: Error) -> Self {
        OptionsError::new(e.to_string())
    }
}
