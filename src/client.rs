//! Djelia API client and request dispatcher
//!
//! [`Djelia`] owns the HTTP client, credentials and configuration. The
//! service handles returned by [`Djelia::translation`],
//! [`Djelia::transcription`] and [`Djelia::tts`] borrow it.
//!
//! # Retry Strategy
//!
//! Connection failures, timeouts and 5xx responses are retried up to
//! `max_retries` times with exponential backoff (1s, 2s, 4s ... capped at
//! 10s by default). Retries only happen before a response body is handed
//! over: once a stream has started, a failure ends it.

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};

use crate::auth::Auth;
use crate::config::ClientConfig;
use crate::error::{DjeliaError, Result};
use crate::models::{ApiVersion, Endpoint};
use crate::services::{Transcription, Translation, Tts};
use crate::stream::ByteStream;

/// Client for the Djelia API
#[derive(Debug, Clone)]
pub struct Djelia {
    http: Client,
    auth: Auth,
    config: ClientConfig,
}

impl Djelia {
    /// Create a client with an explicit key, or `DJELIA_API_KEY` when `None`
    ///
    /// Other settings come from the environment (see [`ClientConfig::from_env`]).
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        Self::with_config(config)
    }

    /// Create a client configured entirely from the environment
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let auth = Auth::new(config.resolve_api_key())?;

        let http = Client::builder()
            .connect_timeout(config.timeout)
            .default_headers(auth.headers()?)
            .build()
            .map_err(|e| {
                DjeliaError::generic(format!("Failed to build HTTP client: {}", e)).with_source(e)
            })?;

        log::debug!(
            "Djelia client ready: base_url={}, key={}",
            config.base_url,
            auth.masked()
        );

        Ok(Self { http, auth, config })
    }

    pub fn translation(&self) -> Translation<'_> {
        Translation::new(self)
    }

    pub fn transcription(&self) -> Transcription<'_> {
        Transcription::new(self)
    }

    pub fn tts(&self) -> Tts<'_> {
        Tts::new(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API key in masked form, safe for logs
    pub fn masked_key(&self) -> String {
        self.auth.masked()
    }

    /// Send a request and wait for the full response
    ///
    /// `build` is called once per attempt to attach the body and query.
    pub(crate) async fn send<F>(
        &self,
        endpoint: Endpoint,
        version: ApiVersion,
        build: F,
    ) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder>,
    {
        let timeout = self.config.timeout;
        self.dispatch(endpoint, version, |req| build(req.timeout(timeout)))
            .await
    }

    /// Send a request and return its body as a byte stream
    ///
    /// The status is checked before the stream is returned. No total timeout
    /// applies to the body; only the wait for response headers is bounded.
    pub(crate) async fn open_stream<F>(
        &self,
        endpoint: Endpoint,
        version: ApiVersion,
        build: F,
    ) -> Result<ByteStream>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder>,
    {
        let response = self.dispatch(endpoint, version, build).await?;
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DjeliaError::from));
        Ok(Box::pin(body))
    }

    async fn dispatch<F>(&self, endpoint: Endpoint, version: ApiVersion, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder>,
    {
        let url = endpoint.url(&self.config.base_url, version)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.config.retry_delay(attempt);
                log::info!(
                    "Retrying {} {} in {:?} (attempt {}/{})",
                    endpoint.method(),
                    url,
                    delay,
                    attempt + 1,
                    max_retries + 1
                );
                tokio::time::sleep(delay).await;
            }

            let request = build(self.http.request(endpoint.method(), &url))?;

            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    log::warn!("Request attempt {} failed: {}", attempt + 1, e);
                    attempt += 1;
                }
                Err(e) => {
                    log::warn!("{} {} failed: {}", endpoint.method(), url, e);
                    return Err(e);
                }
            }
        }
    }

    /// Single request, mapping non-success statuses to errors
    async fn attempt(&self, request: RequestBuilder) -> Result<Response> {
        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| DjeliaError::timed_out(self.config.timeout))??;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DjeliaError::from_status(status.as_u16(), &body))
    }
}

/// Config for a local test server with near-zero backoff
#[cfg(test)]
pub(crate) fn fast_config(base_url: &str) -> ClientConfig {
    use std::time::Duration;

    ClientConfig::default()
        .with_base_url(base_url)
        .with_api_key("12345678-1234-4567-89ab-123456789abc")
        .with_retry_delays(Duration::from_millis(1), Duration::from_millis(5))
}
