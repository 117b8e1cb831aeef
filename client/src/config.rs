//! Client configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_STORE_DIR: &str = ".remiseria";

/// Errors raised when settings hold unusable values.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `api_base_url` is not an absolute URL.
    #[error("invalid API base URL `{value}`: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Settings for the remisería client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REMISERIA")]
pub struct ClientSettings {
    /// Root of the remisería REST API.
    pub api_base_url: Option<String>,
    /// Directory holding the persisted session.
    pub store_dir: Option<PathBuf>,
    /// Local timeout for authority requests, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Keep the session in memory only.
    #[ortho_config(default = false)]
    pub ephemeral: bool,
}

impl ClientSettings {
    /// Parsed API base URL, falling back to the local development server.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the configured value
    /// does not parse.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Session directory, falling back to `.remiseria`.
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }

    /// Authority request timeout; `None` (and zero) mean no local timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
