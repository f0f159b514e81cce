//! Common types used throughout parse-rest
//!
//! Shared type aliases and the small response/value types that more than
//! one module needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// Untyped object or field value
pub type JsonValue = serde_json::Value;

// ============================================================================
// Object References
// ============================================================================

/// Identity of a newly created object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Backend-assigned object id
    pub object_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Result of an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRef {
    /// Timestamp of the update
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Sort Order
// ============================================================================

/// Sort direction for a single order key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Render an order key in the backend's syntax (`field` or `-field`)
    pub fn apply(self, field: &str) -> String {
        match self {
            SortOrder::Ascending => field.to_string(),
            SortOrder::Descending => format!("-{field}"),
        }
    }
}

/// Field every object carries; scans order by it
pub const CREATED_AT: &str = "createdAt";

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
