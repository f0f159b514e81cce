//! Query options for class queries
//!
//! Maps the backend's query constraints (`where`, `limit`, `order`, `skip`,
//! `keys`, `count`) onto URL query parameters.

use crate::types::{OptionStringExt, SortOrder};
use std::collections::HashMap;

/// Constraints for a class query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// JSON-encoded `where` constraint, sent verbatim
    pub where_clause: Option<String>,
    /// Maximum number of results
    pub limit: Option<u32>,
    /// Comma-separated order keys; `-field` sorts descending
    pub order: Option<String>,
    /// Number of results to skip
    pub skip: Option<u64>,
    /// Restrict returned fields
    pub keys: Option<Vec<String>>,
    /// Ask the backend to include a total `count`
    pub count: bool,
}

impl QueryOptions {
    /// Create empty options (match everything, backend defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for one page of a scan
    pub fn page(filter: &str, limit: u32, order: &str, offset: u64) -> Self {
        Self {
            where_clause: filter.to_string().none_if_empty(),
            limit: Some(limit),
            order: order.to_string().none_if_empty(),
            skip: Some(offset),
            keys: None,
            count: false,
        }
    }

    /// Set the `where` constraint
    #[must_use]
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = clause.into().none_if_empty();
        self
    }

    /// Set the result limit
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the order keys
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into().none_if_empty();
        self
    }

    /// Append an order key after any already set
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: SortOrder) -> Self {
        let key = direction.apply(field);
        self.order = Some(match self.order.take() {
            Some(existing) => format!("{existing},{key}"),
            None => key,
        });
        self
    }

    /// Set the number of results to skip
    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Restrict the returned fields
    #[must_use]
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Request a total count alongside the results
    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Encode as URL query parameters; unset options are omitted
    pub fn to_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(clause) = &self.where_clause {
            params.insert("where".to_string(), clause.clone());
        }
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), limit.to_string());
        }
        if let Some(order) = &self.order {
            params.insert("order".to_string(), order.clone());
        }
        if let Some(skip) = self.skip {
            params.insert("skip".to_string(), skip.to_string());
        }
        if let Some(keys) = self.keys.as_ref().filter(|k| !k.is_empty()) {
            params.insert("keys".to_string(), keys.join(","));
        }
        if self.count {
            params.insert("count".to_string(), "1".to_string());
        }
        params
    }
}
