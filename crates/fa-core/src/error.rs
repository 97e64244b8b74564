//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating storage configuration.
///
/// Missing required fields are fatal at startup: a half-configured
/// storage backend would fail on the first remote call with a much
/// less useful message.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),

    #[error("Config file error: {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("base_url is not configured; public URLs cannot be generated")]
    MissingBaseUrl,
}
