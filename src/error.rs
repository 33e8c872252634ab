use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Problems detected while building a [`crate::config::LoadConfig`].
///
/// These are the only fatal conditions of a run and are always raised before
/// any worker is spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no target URL given")]
    MissingUrl,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{0}' (use http or https)")]
    UnsupportedScheme(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("concurrency {requested} exceeds the maximum of {max}")]
    ConcurrencyTooHigh { requested: usize, max: usize },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid header format: {0}")]
    InvalidHeader(String),

    #[error("failed to read user config {path}: {reason}", path = .path.display())]
    UserConfig { path: PathBuf, reason: String },
}

/// Failure of a single request attempt. Folded into the worker's error count.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl RequestError {
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RequestError::Timeout(timeout)
        } else if err.is_connect() {
            RequestError::Connect(err.to_string())
        } else {
            RequestError::Protocol(err.to_string())
        }
    }
}
