//! Client configuration
//!
//! A [`ClientConfig`] holds the application keys, server URL and HTTP
//! tuning. It can be read from environment variables or from a YAML/JSON
//! file.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Server URL used when none is configured
pub const DEFAULT_SERVER_URL: &str = "https://api.parse.com/1";

/// Environment variable names, most specific first
const ENV_APPLICATION_ID: &[&str] = &["PARSE_APPLICATION_ID", "APPLICATION_ID"];
const ENV_REST_API_KEY: &[&str] = &["PARSE_REST_API_KEY", "REST_API_KEY"];
const ENV_MASTER_KEY: &[&str] = &["PARSE_MASTER_KEY", "MASTER_KEY"];
const ENV_SESSION_TOKEN: &[&str] = &["PARSE_SESSION_TOKEN"];
const ENV_SERVER_URL: &[&str] = &["PARSE_SERVER_URL"];

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Everything needed to build a [`ParseClient`](crate::client::ParseClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application id
    pub application_id: String,

    /// REST API key
    pub rest_api_key: String,

    /// Master key (bypasses class-level permissions)
    #[serde(default)]
    pub master_key: Option<String>,

    /// Session token of a signed-in user
    #[serde(default)]
    pub session_token: Option<String>,

    /// Base URL of the REST API, including the version segment
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl ClientConfig {
    /// Create a config with the given keys and defaults for everything else
    pub fn new(application_id: impl Into<String>, rest_api_key: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            rest_api_key: rest_api_key.into(),
            master_key: None,
            session_token: None,
            server_url: default_server_url(),
            http: HttpConfig::default(),
        }
    }

    /// Read the config from process environment variables
    ///
    /// Reads `PARSE_APPLICATION_ID` (or `APPLICATION_ID`),
    /// `PARSE_REST_API_KEY` (or `REST_API_KEY`), `PARSE_MASTER_KEY`
    /// (or `MASTER_KEY`), `PARSE_SESSION_TOKEN` and `PARSE_SERVER_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).none_if_empty())
        };

        let application_id =
            first(ENV_APPLICATION_ID).ok_or_else(|| Error::missing_field(ENV_APPLICATION_ID[0]))?;
        let rest_api_key =
            first(ENV_REST_API_KEY).ok_or_else(|| Error::missing_field(ENV_REST_API_KEY[0]))?;

        let mut config = Self::new(application_id, rest_api_key);
        config.master_key = first(ENV_MASTER_KEY);
        config.session_token = first(ENV_SESSION_TOKEN);
        if let Some(url) = first(ENV_SERVER_URL) {
            config.server_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load the config from a YAML or JSON file
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the keys are present and the server URL is usable
    pub fn validate(&self) -> Result<()> {
        if self.application_id.is_empty() {
            return Err(Error::missing_field("application_id"));
        }
        if self.rest_api_key.is_empty() {
            return Err(Error::missing_field("rest_api_key"));
        }

        let url = url::Url::parse(&self.server_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfigValue {
                field: "server_url".to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(())
    }

    /// Credentials derived from this config
    pub fn credentials(&self) -> Result<Credentials> {
        let mut credentials = Credentials::new(&self.application_id, &self.rest_api_key)?;
        if let Some(key) = &self.master_key {
            credentials = credentials.with_master_key(key);
        }
        if let Some(token) = &self.session_token {
            credentials = credentials.with_session_token(token);
        }
        Ok(credentials)
    }

    /// HTTP client configuration derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.server_url)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff.backoff_type,
                Duration::from_millis(self.http.backoff.initial_ms),
                Duration::from_millis(self.http.backoff.max_ms),
            );

        builder = match self.http.rate_limit {
            Some(limit) => builder.rate_limit(limit),
            None => builder.no_rate_limit(),
        };
        builder.build()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("application_id", &self.application_id)
            .field("has_master_key", &self.master_key.is_some())
            .field("has_session_token", &self.session_token.is_some())
            .field("server_url", &self.server_url)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Client-side rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_prefixed_names() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PARSE_APPLICATION_ID", "app"),
            ("PARSE_REST_API_KEY", "key"),
            ("PARSE_MASTER_KEY", "master"),
            ("PARSE_SERVER_URL", "http://localhost:1337/parse"),
        ]))
        .unwrap();

        assert_eq!(config.application_id, "app");
        assert_eq!(config.rest_api_key, "key");
        assert_eq!(config.master_key, Some("master".to_string()));
        assert_eq!(config.session_token, None);
        assert_eq!(config.server_url, "http://localhost:1337/parse");
    }

    #[test]
    fn test_from_lookup_legacy_names() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("APPLICATION_ID", "legacy-app"),
            ("REST_API_KEY", "legacy-key"),
            ("MASTER_KEY", ""),
        ]))
        .unwrap();

        assert_eq!(config.application_id, "legacy-app");
        assert_eq!(config.rest_api_key, "legacy-key");
        assert_eq!(config.master_key, None);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let err = ClientConfig::from_lookup(lookup(&[("APPLICATION_ID", "app")])).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "PARSE_REST_API_KEY"));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
application_id: app
rest_api_key: key
server_url: "http://localhost:1337/parse"
http:
  timeout_seconds: 5
  backoff:
    type: linear
    initial_ms: 50
  rate_limit: null
"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.backoff.backoff_type, BackoffType::Linear);
        assert_eq!(config.http.backoff.initial_ms, 50);
        assert_eq!(config.http.backoff.max_ms, 60000);
        assert!(config.http.rate_limit.is_none());

        let http = config.http_client_config();
        assert_eq!(
            http.base_url,
            Some("http://localhost:1337/parse".to_string())
        );
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert!(http.rate_limit.is_none());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"application_id": "app", "rest_api_key": "key", "session_token": "r:tok"}}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.session_token, Some("r:tok".to_string()));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.http.rate_limit.is_some());
        assert!(config.credentials().unwrap().has_session_token());
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_from_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = ClientConfig::new("app", "key");
        config.server_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.server_url = "ftp://example.com/1".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_validate_requires_keys() {
        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("app", "").validate().is_err());
        assert!(ClientConfig::new("app", "key").validate().is_ok());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = ClientConfig::new("app", "secret-key");
        config.master_key = Some("secret-master".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("secret-master"));
    }
}
