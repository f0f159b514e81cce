//! REST client for class objects

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::cursor::{Cursor, PageFetcher};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::query::QueryOptions;
use crate::types::{JsonValue, ObjectRef, UpdateRef};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fields the backend owns; never sent in create/update bodies
const RESERVED_FIELDS: &[&str] = &["objectId", "createdAt", "updatedAt"];

/// Body of a class query response
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<T> {
    /// Matching objects
    pub results: Vec<T>,
    /// Total matches, present when the query asked for a count
    #[serde(default)]
    pub count: Option<u64>,
}

/// Client for the class endpoints of a Parse-style REST API
///
/// Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ParseClient {
    http: HttpClient,
}

impl ParseClient {
    /// Create a client for the default server with the given keys
    pub fn new(application_id: impl Into<String>, rest_api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(application_id, rest_api_key))
    }

    /// Create a client from a full configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_credentials(config.http_client_config(), config.credentials()?)?;
        Ok(Self { http })
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// Underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Copy of this client that sends the master key
    ///
    /// Fails when the client carries no credentials to extend, as with
    /// [`with_http`](Self::with_http) over a bare [`HttpClient`].
    pub fn with_master_key(&self, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        self.map_credentials(|c| c.with_master_key(key))
    }

    /// Copy of this client that acts as the given user session
    ///
    /// Fails when the client carries no credentials to extend.
    pub fn with_session_token(&self, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        self.map_credentials(|c| c.with_session_token(token))
    }

    fn map_credentials<F>(&self, f: F) -> Result<Self>
    where
        F: FnOnce(Credentials) -> Credentials,
    {
        let credentials = self
            .http
            .credentials()
            .cloned()
            .ok_or_else(|| Error::missing_field("application_id"))?;
        let mut http = self.http.clone();
        http.set_credentials(f(credentials));
        Ok(Self { http })
    }

    /// Create an object; returns its id and creation time
    pub async fn create<T: Serialize + ?Sized>(&self, class: &str, object: &T) -> Result<ObjectRef> {
        validate_class_name(class)?;
        let body = object_body(object)?;
        debug!(class, "Creating object");

        let created: ObjectRef = self
            .http
            .request_json(
                Method::POST,
                &class_path(class),
                RequestConfig::new().json(body),
            )
            .await?;
        Ok(created)
    }

    /// Fetch one object by id
    pub async fn get<T: DeserializeOwned>(&self, class: &str, object_id: &str) -> Result<T> {
        validate_class_name(class)?;
        self.http.get_json(&object_path(class, object_id)?).await
    }

    /// Update fields of an object; returns the update time
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        class: &str,
        object_id: &str,
        changes: &T,
    ) -> Result<UpdateRef> {
        validate_class_name(class)?;
        let body = object_body(changes)?;
        debug!(class, object_id, "Updating object");

        self.http
            .request_json(
                Method::PUT,
                &object_path(class, object_id)?,
                RequestConfig::new().json(body),
            )
            .await
    }

    /// Delete an object
    pub async fn delete(&self, class: &str, object_id: &str) -> Result<()> {
        validate_class_name(class)?;
        debug!(class, object_id, "Deleting object");
        self.http.delete(&object_path(class, object_id)?).await?;
        Ok(())
    }

    /// Run a query against a class and decode every result into `T`
    ///
    /// The backend applies its own default limit (100) when none is given
    /// and never returns more than 1000 results; use [`cursor`](Self::cursor)
    /// to read a whole class.
    pub async fn query_class<T: DeserializeOwned>(
        &self,
        class: &str,
        options: &QueryOptions,
    ) -> Result<Vec<T>> {
        Ok(self.query_response(class, options).await?.results)
    }

    /// Run a query and return the raw response, including `count` if requested
    pub async fn query_response<T: DeserializeOwned>(
        &self,
        class: &str,
        options: &QueryOptions,
    ) -> Result<QueryResponse<T>> {
        validate_class_name(class)?;
        let config = RequestConfig::new().query_params(options.to_params());
        self.http
            .get_json_with_config(&class_path(class), config)
            .await
    }

    /// Count objects matching `filter` (empty = all)
    pub async fn count(&self, class: &str, filter: &str) -> Result<u64> {
        let options = QueryOptions::new()
            .where_clause(filter)
            .limit(0)
            .with_count();
        let response: QueryResponse<JsonValue> = self.query_response(class, &options).await?;
        response
            .count
            .ok_or_else(|| Error::decode("query response has no count"))
    }

    /// Scan every object of `class` matching `filter` (empty = all)
    ///
    /// No request is made until the first [`Cursor::next`].
    pub fn cursor(&self, class: impl Into<String>, filter: impl Into<String>) -> Cursor<'_, Self> {
        Cursor::new(self, class, filter)
    }
}

#[async_trait]
impl PageFetcher for ParseClient {
    async fn fetch_page(
        &self,
        collection: &str,
        filter: &str,
        limit: u32,
        order: &str,
        offset: u64,
    ) -> Result<Vec<JsonValue>> {
        let options = QueryOptions::page(filter, limit, order, offset);
        self.query_class(collection, &options).await
    }
}

/// Check a class name against the backend's naming rules
///
/// Names start with a letter and contain only letters, digits and `_`.
/// System classes such as `_User` are allowed.
pub fn validate_class_name(name: &str) -> Result<()> {
    let body = name.strip_prefix('_').unwrap_or(name);
    let valid = body.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidClassName {
            name: name.to_string(),
        })
    }
}

fn class_path(class: &str) -> String {
    format!("classes/{class}")
}

fn object_path(class: &str, object_id: &str) -> Result<String> {
    if object_id.is_empty() || !object_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidObjectId {
            id: object_id.to_string(),
        });
    }
    Ok(format!("classes/{class}/{object_id}"))
}

/// Serialize an object for a create/update body, dropping backend-owned fields
fn object_body<T: Serialize + ?Sized>(object: &T) -> Result<JsonValue> {
    let mut body = serde_json::to_value(object)?;
    match body.as_object_mut() {
        Some(map) => {
            for field in RESERVED_FIELDS {
                map.remove(*field);
            }
            Ok(body)
        }
        None => Err(Error::decode("object must serialize to a JSON object")),
    }
}
