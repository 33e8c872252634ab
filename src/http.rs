use crate::config::LoadConfig;
use crate::error::{ConfigError, RequestError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::time::Duration;
use url::Url;

/// Outcome of one completed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub status: u16,
    /// Body bytes plus the estimated size of the response headers.
    pub bytes: u64,
}

/// Issues one request against the target per call.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn send(&self) -> Result<Exchange, RequestError>;
}

pub struct HttpRequester {
    client: Client,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<String>,
    timeout: Duration,
}

impl HttpRequester {
    pub fn new(config: &LoadConfig) -> Result<Self> {
        let redirect = if config.allow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect)
            .gzip(!config.disable_compression);

        if config.disable_keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            method: config.method.clone(),
            url: config.url.clone(),
            headers: header_map(&config.headers)?,
            body: config.body.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn send(&self) -> Result<Exchange, RequestError> {
        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());

        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| RequestError::from_reqwest(e, self.timeout))?;

        let status = response.status().as_u16();
        let header_bytes = estimate_header_size(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::from_reqwest(e, self.timeout))?;

        if status >= 400 {
            return Err(RequestError::Status(status));
        }

        Ok(Exchange {
            status,
            bytes: header_bytes + body.len() as u64,
        })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || ConfigError::InvalidHeader(format!("{}: {}", name, value));
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.append(name, value);
    }
    Ok(map)
}

/// Wire size of the header block: `name: value\r\n` per header.
pub fn estimate_header_size(headers: &HeaderMap) -> u64 {
    headers
        .iter()
        .map(|(name, value)| (name.as_str().len() + value.as_bytes().len() + 4) as u64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_counts_separators() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("5"));
        // "content-length" (14) + ": " + "5" + "\r\n"
        assert_eq!(estimate_header_size(&headers), 19);
    }

    #[test]
    fn invalid_header_name_is_a_config_error() {
        let err = header_map(&[("Bad Name".to_string(), "x".to_string())]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader(_)));
    }
}
