//! RON configuration for the shell.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use listing_core::Endpoints;
use listing_engine::ServiceSettings;
use listing_logging::listing_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::logging::LogDestination;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid url `{value}`: {source}")]
    Url {
        value: String,
        source: url::ParseError,
    },
}

/// Endpoint paths, resolved against `AppConfig::base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub ask_suggestion: String,
    pub submit: String,
    pub submit_manual: String,
    pub decline: String,
    pub history: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            ask_suggestion: "salla/ask-suggestion/".to_string(),
            submit: "salla/submit/".to_string(),
            submit_manual: "salla/submit-manual/".to_string(),
            decline: "salla/decline/".to_string(),
            history: "salla/history/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub endpoints: EndpointPaths,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub require_keywords: bool,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        Self {
            base_url: "http://localhost:8000/".to_string(),
            endpoints: EndpointPaths::default(),
            connect_timeout_ms: service.connect_timeout.as_millis() as u64,
            request_timeout_ms: service.request_timeout.as_millis() as u64,
            require_keywords: true,
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Loads the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                listing_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let base = parse_url(&self.base_url)?;
        let join = |relative: &str| {
            base.join(relative).map_err(|source| ConfigError::Url {
                value: relative.to_string(),
                source,
            })
        };
        Ok(Endpoints {
            ask_suggestion: join(&self.endpoints.ask_suggestion)?,
            submit: join(&self.endpoints.submit)?,
            submit_manual: join(&self.endpoints.submit_manual)?,
            decline: join(&self.endpoints.decline)?,
            history: join(&self.endpoints.history)?,
        })
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::Url {
        value: value.to_string(),
        source,
    })
}
