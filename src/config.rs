use std::{env, time::Duration};

use thiserror::Error;
use url::Url;

const API_BASE_URL: &str = "http://localhost:8000/api";
const HTTP_TIMEOUT_SECS: u64 = 10;
const DISCOUNT_DEBOUNCE_MS: u64 = 800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Settings for talking to the booking API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Always ends with `/` so endpoint paths can be joined onto it.
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    /// Quiet period before an applied discount is re-checked.
    pub discount_debounce: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url: with_trailing_slash(api_base_url),
            api_token: None,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            discount_debounce: Duration::from_millis(DISCOUNT_DEBOUNCE_MS),
        }
    }

    /// Reads `TRAVELMORE_*` variables, falling back to the defaults above.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("TRAVELMORE_API_BASE_URL").unwrap_or_else(|_| API_BASE_URL.to_string());
        let api_token = env::var("TRAVELMORE_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeout = read_u64("TRAVELMORE_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?;
        let debounce = read_u64("TRAVELMORE_DISCOUNT_DEBOUNCE_MS", DISCOUNT_DEBOUNCE_MS)?;

        Ok(Self {
            api_base_url: parse_base_url(&base_url)?,
            api_token,
            http_timeout: Duration::from_secs(timeout),
            discount_debounce: Duration::from_millis(debounce),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })?;
    Ok(with_trailing_slash(url))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(default),
    }
}
