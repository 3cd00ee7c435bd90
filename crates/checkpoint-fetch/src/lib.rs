// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for verification sources.
//!
//! [`HttpFetcher`] sends a query's fields to a configured endpoint and
//! returns the response body as text. It performs no retries of its own;
//! the gateway's retry executor owns that policy.

use std::time::Duration;

use async_trait::async_trait;
use checkpoint_config::{DomainConfig, FetchMethod};
use checkpoint_core::{CheckpointError, Fetcher, VerificationQuery};
use tracing::debug;

/// Bodies beyond this many bytes are truncated.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const USER_AGENT: &str = concat!("checkpoint/", env!("CARGO_PKG_VERSION"));

/// A reqwest-backed [`Fetcher`] for one endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: String,
    method: FetchMethod,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher for `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        method: FetchMethod,
        timeout: Duration,
    ) -> Result<Self, CheckpointError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CheckpointError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            method,
            timeout,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    /// Build a fetcher from a domain section. The endpoint must be set.
    pub fn from_config(config: &DomainConfig) -> Result<Self, CheckpointError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| CheckpointError::Config("domain endpoint is not configured".into()))?;
        Self::new(endpoint, config.method, config.timeout())
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `fields` to the configured endpoint.
    ///
    /// GET encodes them as query parameters, POST as an urlencoded form.
    pub async fn fetch_fields(&self, fields: &[(&str, String)]) -> Result<String, CheckpointError> {
        let request = match self.method {
            FetchMethod::Get => self.client.get(&self.endpoint).query(fields),
            FetchMethod::Post => self.client.post(&self.endpoint).form(fields),
        };
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        self.read_body(response).await
    }

    /// GET an arbitrary URL with this fetcher's client and limits.
    pub async fn fetch_url(&self, url: &str) -> Result<String, CheckpointError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        self.read_body(response).await
    }

    async fn read_body(&self, mut response: reqwest::Response) -> Result<String, CheckpointError> {
        let status = response.status();
        debug!(status = %status, url = %response.url(), "source responded");
        if !status.is_success() {
            return Err(CheckpointError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            let room = self.max_body_bytes.saturating_sub(body.len());
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                debug!(limit = self.max_body_bytes, "response body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn map_error(&self, e: reqwest::Error) -> CheckpointError {
        if e.is_timeout() {
            return CheckpointError::Timeout {
                duration: self.timeout,
            };
        }
        CheckpointError::Transport {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl<Q: VerificationQuery + ?Sized + 'static> Fetcher<Q> for HttpFetcher {
    async fn fetch(&self, query: &Q) -> Result<String, CheckpointError> {
        self.fetch_fields(&query.fields()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_endpoint() {
        let config = DomainConfig::default();
        assert!(matches!(
            HttpFetcher::from_config(&config),
            Err(CheckpointError::Config(_))
        ));
    }

    #[test]
    fn from_config_copies_method_and_endpoint() {
        let config = DomainConfig {
            endpoint: Some("https://source.test/check".into()),
            method: FetchMethod::Post,
            ..DomainConfig::default()
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.endpoint(), "https://source.test/check");
        assert_eq!(fetcher.method, FetchMethod::Post);
        assert_eq!(fetcher.max_body_bytes, MAX_BODY_BYTES);
    }
}
