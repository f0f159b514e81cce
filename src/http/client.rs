//! Retrying HTTP transport
//!
//! Every request passes the rate limiter, carries the configured credentials
//! and is retried on transient failures. Error bodies of the form
//! `{"code": .., "error": ..}` surface as [`Error::Api`].

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub kind: BackoffType,
    /// Delay before the first retry
    pub initial: Duration,
    /// Upper bound for any delay
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            kind: BackoffType::Exponential,
            initial: Duration::from_millis(100),
            max: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.kind {
            BackoffType::Constant => self.initial,
            BackoffType::Linear => self.initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self.initial.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max)
    }
}

/// Transport settings shared by every request of a client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for relative request paths
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    /// `None` disables client-side throttling
    pub rate_limit: Option<RateLimiterConfig>,
    /// Sent with every request; per-request headers are added after these
    pub default_headers: HashMap<String, String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: BackoffPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder(Self::default())
    }
}

/// Chained setters for [`HttpClientConfig`], starting from the defaults
#[derive(Debug, Default)]
#[must_use]
pub struct HttpClientConfigBuilder(HttpClientConfig);

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.0.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.0.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.0.max_retries = retries;
        self
    }

    pub fn backoff(mut self, kind: BackoffType, initial: Duration, max: Duration) -> Self {
        self.0.backoff = BackoffPolicy { kind, initial, max };
        self
    }

    pub fn rate_limit(mut self, limit: RateLimiterConfig) -> Self {
        self.0.rate_limit = Some(limit);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.0.rate_limit = None;
        self
    }

    /// Add a header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.0.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.0
    }
}

/// Per-request additions and overrides
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RequestConfig {
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    /// JSON body
    pub body: Option<Value>,
    /// Replaces the client timeout
    pub timeout: Option<Duration>,
    /// Replaces the client retry count
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    error: String,
}

/// Result of a single send
enum Attempt {
    Done(Response),
    Retry { delay: Duration, cause: Error },
    Fail(Error),
}

/// HTTP client with retry and rate limiting
///
/// Cloning is cheap and shares the connection pool and rate limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: Option<Credentials>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client with default configuration and no credentials
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration and no credentials
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            credentials: None,
            rate_limiter,
        })
    }

    /// Create a client that sends the given credentials
    pub fn with_credentials(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.credentials = Some(credentials);
        Ok(client)
    }

    /// Replace the credentials
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Credentials sent with each request, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestConfig::new()).await
    }

    pub async fn post(&self, url: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, url, RequestConfig::new().json(body))
            .await
    }

    pub async fn put(&self, url: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, url, RequestConfig::new().json(body))
            .await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.request(Method::DELETE, url, RequestConfig::new()).await
    }

    /// Send a request, retrying transient failures
    ///
    /// 429 is retried for every method, after `Retry-After` when present.
    /// Connection failures are retried for every method too, since nothing
    /// reached the server. 5xx gateway errors (including 520-524) and
    /// timeouts are retried only for idempotent methods: a POST may already
    /// have been applied. Any other error status fails at once, decoded into
    /// [`Error::Api`] when the body is a backend error document.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let url = self.build_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let sent = self
                .build_request(&method, &url, &config, timeout)
                .send()
                .await;

            match self
                .classify(&method, sent, attempt, attempt < max_retries, timeout)
                .await
            {
                Attempt::Done(response) => {
                    debug!(%method, %url, status = response.status().as_u16(), "Request succeeded");
                    return Ok(response);
                }
                Attempt::Retry { delay, cause } => {
                    warn!(
                        %method,
                        %url,
                        attempt = attempt + 1,
                        max_attempts = max_retries + 1,
                        ?delay,
                        "Retrying after: {cause}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Fail(error) => return Err(error),
            }
        }
    }

    /// Send a request and decode the JSON response body
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, url, config).await?;
        Ok(response.json().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(Method::GET, url, RequestConfig::new())
            .await
    }

    pub async fn get_json_with_config<T: DeserializeOwned>(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.request_json(Method::GET, url, config).await
    }

    /// Backoff delay before retry number `attempt + 1`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.config.backoff.delay(attempt)
    }

    fn build_request(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        let mut req = self
            .config
            .default_headers
            .iter()
            .chain(&config.headers)
            .fold(
                self.client.request(method.clone(), url).timeout(timeout),
                |req, (key, value)| req.header(key.as_str(), value.as_str()),
            );

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }

        match &self.credentials {
            Some(credentials) => credentials.apply(req),
            None => req,
        }
    }

    async fn classify(
        &self,
        method: &Method,
        sent: reqwest::Result<Response>,
        attempt: u32,
        can_retry: bool,
        timeout: Duration,
    ) -> Attempt {
        let cause = match sent {
            Ok(response) => {
                let status = response.status();
                if !status.is_client_error() && !status.is_server_error() {
                    return Attempt::Done(response);
                }

                // Rejected before processing, so any method may be resent
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let delay = retry_after(&response)
                        .unwrap_or_else(|| self.calculate_backoff(attempt));
                    let cause = Error::RateLimited {
                        retry_after_seconds: delay.as_secs(),
                    };
                    return if can_retry {
                        Attempt::Retry { delay, cause }
                    } else {
                        Attempt::Fail(cause)
                    };
                }

                let body = response.text().await.unwrap_or_default();
                status_error(status, body)
            }
            Err(e) if e.is_timeout() => Error::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            },
            Err(e) => Error::Http(e),
        };

        // Only a failed connect proves the server never saw the request
        let never_sent = matches!(&cause, Error::Http(e) if e.is_connect());
        if can_retry && cause.is_retryable() && (never_sent || method.is_idempotent()) {
            Attempt::Retry {
                delay: self.calculate_backoff(attempt),
                cause,
            }
        } else {
            Attempt::Fail(cause)
        }
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Map an error response to [`Error::Api`] when the body is a backend error
fn status_error(status: StatusCode, body: String) -> Error {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(api) => Error::api(status.as_u16(), api.code, api.error),
        Err(_) => Error::http_status(status.as_u16(), body),
    }
}

/// `Retry-After` in whole seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}
