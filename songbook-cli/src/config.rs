//! Settings file and resolved configuration.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::paths;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no CMS URL configured (use --cms-url, SONGBOOK_CMS_URL or the settings file)")]
    MissingCmsUrl,
}

/// Contents of `settings.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub cms_url: Option<String>,
    pub access_token: Option<String>,
    pub rows_per_page: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Reads a settings file. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the settings file from `path`, or from the platform config
    /// directory when no path is given.
    pub fn load_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match paths::settings_file() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

/// Values given on the command line (already merged with the environment).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cms_url: Option<String>,
    pub access_token: Option<String>,
    pub rows_per_page: Option<usize>,
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cms_url: String,
    pub access_token: Option<String>,
    pub rows_per_page: Option<usize>,
    pub timeout: Duration,
}

impl Config {
    /// Command line and environment take precedence over the settings file.
    pub fn resolve(settings: Settings, overrides: Overrides) -> Result<Self, ConfigError> {
        let cms_url = overrides
            .cms_url
            .or(settings.cms_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingCmsUrl)?;

        Ok(Self {
            cms_url,
            access_token: overrides.access_token.or(settings.access_token),
            rows_per_page: overrides.rows_per_page.or(settings.rows_per_page),
            timeout: Duration::from_secs(settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
