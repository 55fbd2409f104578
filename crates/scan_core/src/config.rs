//! Editable scan configuration and the value-returning edits applied to it.
//!
//! Every edit takes a snapshot by reference and hands back a new one; nothing
//! here mutates a config that someone else may still be reading.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Description of the API surface handed to the scanning service.
///
/// Serializes as `{ "api": { "base_url": "...", "endpoints": [...] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    api: ApiSurface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawApiSurface")]
struct ApiSurface {
    base_url: String,
    /// Never empty. Row order on screen follows this order.
    endpoints: Vec<String>,
}

#[derive(Deserialize)]
struct RawApiSurface {
    base_url: String,
    endpoints: Vec<String>,
}

impl TryFrom<RawApiSurface> for ApiSurface {
    type Error = ConfigError;

    fn try_from(raw: RawApiSurface) -> Result<Self, Self::Error> {
        if raw.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        Ok(Self {
            base_url: raw.base_url,
            endpoints: raw.endpoints,
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base url is required")]
    MissingBaseUrl,
    #[error("base url {url:?} is not a valid url: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("base url scheme {scheme:?} is not supported (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("at least one endpoint is required")]
    NoEndpoints,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            api: ApiSurface {
                base_url: String::new(),
                endpoints: vec![String::new()],
            },
        }
    }
}

impl ScanConfig {
    /// Session-start config: empty base url and a single empty endpoint row.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn endpoints(&self) -> &[String] {
        &self.api.endpoints
    }

    pub fn endpoint_count(&self) -> usize {
        self.api.endpoints.len()
    }

    /// Pre-flight check run before a submission leaves the client.
    ///
    /// Only the base url is checked; endpoint rows are free text and may be
    /// empty or duplicated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let raw = self.api.base_url.as_str();
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        // Sent verbatim, so padding the url parser would strip is rejected here.
        if raw != raw.trim() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "surrounding whitespace".to_string(),
            });
        }
        let parsed = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}

/// Replaces the base url. No validation happens here.
pub fn set_base_url(config: &ScanConfig, value: impl Into<String>) -> ScanConfig {
    ScanConfig {
        api: ApiSurface {
            base_url: value.into(),
            endpoints: config.api.endpoints.clone(),
        },
    }
}

/// Replaces the endpoint at `index`.
///
/// # Panics
///
/// Panics if `index` is out of range. Callers own the row indices they hand
/// out, so an out-of-range index is a bug rather than bad user input.
pub fn set_endpoint_at(config: &ScanConfig, index: usize, value: impl Into<String>) -> ScanConfig {
    let len = config.api.endpoints.len();
    assert!(
        index < len,
        "endpoint index {index} out of range for {len} endpoint(s)"
    );
    let mut endpoints = config.api.endpoints.clone();
    endpoints[index] = value.into();
    ScanConfig {
        api: ApiSurface {
            base_url: config.api.base_url.clone(),
            endpoints,
        },
    }
}

/// Appends one empty endpoint row.
pub fn append_endpoint(config: &ScanConfig) -> ScanConfig {
    let mut endpoints = Vec::with_capacity(config.api.endpoints.len() + 1);
    endpoints.extend(config.api.endpoints.iter().cloned());
    endpoints.push(String::new());
    ScanConfig {
        api: ApiSurface {
            base_url: config.api.base_url.clone(),
            endpoints,
        },
    }
}
