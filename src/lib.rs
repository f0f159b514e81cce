//! # parse-rest
//!
//! Async client for Parse-style REST object stores.
//!
//! ## Features
//!
//! - **Object CRUD**: create, get, update and delete objects of any class
//! - **Queries**: `where` constraints, ordering, limit/skip, field selection, counts
//! - **Full-class scans**: a [`Cursor`](cursor::Cursor) walks an entire class
//!   past the backend's 1000-results-per-query cap
//! - **Robust HTTP**: retries with backoff, client-side rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parse_rest::{ClientConfig, ParseClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ParseClient::from_config(&ClientConfig::from_env()?)?;
//!
//!     let created = client
//!         .create("GameScore", &serde_json::json!({ "playerName": "Sean Plott", "score": 1337 }))
//!         .await?;
//!
//!     let mut cursor = client.cursor("GameScore", "");
//!     while let Some(record) = cursor.next().await {
//!         println!("{record}");
//!     }
//!     if let Some(err) = cursor.last_error() {
//!         eprintln!("scan failed: {err}");
//!     }
//!
//!     client.delete("GameScore", &created.object_id).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       ParseClient                        │
//! │  create / get / update / delete / query_class / count    │
//! │  cursor(class, filter) → Cursor                          │
//! └──────────────────────────────────────────────────────────┘
//!                │                           │
//! ┌──────────────┴─────────────┐  ┌──────────┴──────────────┐
//! │ HttpClient                 │  │ Cursor                  │
//! │ retry, backoff, rate limit │  │ PageFetcher, 1000/page  │
//! │ Credentials headers        │  │ offset = processed      │
//! └────────────────────────────┘  └─────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential headers
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Query constraints
pub mod query;

/// Batched full-class scanning
pub mod cursor;

/// Class object operations
pub mod client;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::ParseClient;
pub use config::ClientConfig;
pub use cursor::{Cursor, PageFetcher, PAGE_SIZE};
pub use error::{Error, Result};
pub use query::QueryOptions;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
