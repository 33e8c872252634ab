use crate::error::ConfigError;
use reqwest::Method;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_DURATION_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_METHOD: &str = "GET";

/// Upper bound on workers per session; one task and one channel slot each.
pub const MAX_CONCURRENCY: usize = 100_000;

/// Environment variable that points at an alternative user config file.
pub const CONFIG_ENV: &str = "BARRAGE_CONFIG";

/// Optional per-user defaults, read from `~/.barrage/config.json`.
///
/// Every field may be omitted. Values here sit between command line flags
/// and the built-in defaults.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub concurrency: Option<usize>,
    pub duration_secs: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub method: Option<String>,
    pub headers: Vec<String>,
}

impl UserConfig {
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Reads `path` if it exists. The file is never created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::UserConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::UserConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }

        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(|home| PathBuf::from(home).join(".barrage").join("config.json"))
    }
}

/// Parameters of one load run. Immutable once built.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub url: Url,
    pub method: Method,
    pub duration: Duration,
    pub concurrency: usize,
    pub timeout: Duration,
    pub allow_redirects: bool,
    pub disable_compression: bool,
    pub disable_keep_alive: bool,
    pub insecure: bool,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl LoadConfig {
    pub fn builder(url: impl Into<String>) -> LoadConfigBuilder {
        LoadConfigBuilder::new(url)
    }
}

#[derive(Debug, Clone)]
pub struct LoadConfigBuilder {
    url: String,
    method: String,
    duration: Duration,
    concurrency: usize,
    timeout: Duration,
    allow_redirects: bool,
    disable_compression: bool,
    disable_keep_alive: bool,
    insecure: bool,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl LoadConfigBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            duration: Duration::from_secs(DEFAULT_DURATION_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            allow_redirects: false,
            disable_compression: false,
            disable_keep_alive: false,
            insecure: false,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }

    pub fn disable_compression(mut self, disable: bool) -> Self {
        self.disable_compression = disable;
        self
    }

    pub fn disable_keep_alive(mut self, disable: bool) -> Self {
        self.disable_keep_alive = disable;
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<LoadConfig, ConfigError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooHigh {
                requested: self.concurrency,
                max: MAX_CONCURRENCY,
            });
        }

        let method = Method::from_bytes(self.method.trim().to_uppercase().as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(self.method.clone()))?;

        Ok(LoadConfig {
            url,
            method,
            duration: self.duration,
            concurrency: self.concurrency,
            timeout: self.timeout,
            allow_redirects: self.allow_redirects,
            disable_compression: self.disable_compression,
            disable_keep_alive: self.disable_keep_alive,
            insecure: self.insecure,
            headers: self.headers,
            body: self.body,
        })
    }
}
