//! HTTP transport
//!
//! [`HttpClient`] sends every request through an optional token-bucket
//! [`RateLimiter`], attaches the Parse credential headers and retries
//! 429/5xx responses, timeouts and connection failures according to a
//! [`BackoffPolicy`].

mod client;
mod rate_limit;

pub use client::{
    BackoffPolicy, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
