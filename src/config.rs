//! Client configuration.
//!
//! The backend location is fixed per deployment: it comes from the
//! `--api-url` flag or the `TASKBOARD_API_URL` environment variable and is
//! handed to the API client at construction.

use std::{path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "taskboard.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API url must be http or https, got `{0}`")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    /// Per-request timeout. `None` means requests may wait forever.
    pub timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Config {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(api_url).map_err(|source| ConfigError::InvalidUrl {
            url: api_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            timeout: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = log_file.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `path` is expected to start with `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let config = Config::new("http://localhost:5000/").unwrap();
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.endpoint("/tasks"), "http://localhost:5000/tasks");
    }

    #[test]
    fn keeps_path_prefix() {
        let config = Config::new("https://example.org/api/").unwrap();
        assert_eq!(config.endpoint("/tasks/3"), "https://example.org/api/tasks/3");
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            Config::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Config::new("ftp://example.org"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }
}
