//! Credential headers

use crate::error::{Error, Result};
use reqwest::RequestBuilder;

/// Header carrying the application id
pub const APPLICATION_ID_HEADER: &str = "X-Parse-Application-Id";
/// Header carrying the REST API key
pub const REST_API_KEY_HEADER: &str = "X-Parse-REST-API-Key";
/// Header carrying the master key
pub const MASTER_KEY_HEADER: &str = "X-Parse-Master-Key";
/// Header carrying a user session token
pub const SESSION_TOKEN_HEADER: &str = "X-Parse-Session-Token";

/// Keys identifying the application (and optionally a user) to the backend
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    application_id: String,
    rest_api_key: String,
    master_key: Option<String>,
    session_token: Option<String>,
}

impl Credentials {
    /// Create credentials from an application id and REST API key
    pub fn new(application_id: impl Into<String>, rest_api_key: impl Into<String>) -> Result<Self> {
        let application_id = application_id.into();
        let rest_api_key = rest_api_key.into();

        if application_id.is_empty() {
            return Err(Error::missing_field("application_id"));
        }
        if rest_api_key.is_empty() {
            return Err(Error::missing_field("rest_api_key"));
        }

        Ok(Self {
            application_id,
            rest_api_key,
            master_key: None,
            session_token: None,
        })
    }

    /// Copy of these credentials that also sends the master key
    #[must_use]
    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into()).filter(|k| !k.is_empty());
        self
    }

    /// Copy of these credentials that acts as the given user session
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into()).filter(|t| !t.is_empty());
        self
    }

    /// Application id
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Whether the master key is sent
    pub fn has_master_key(&self) -> bool {
        self.master_key.is_some()
    }

    /// Whether a session token is sent
    pub fn has_session_token(&self) -> bool {
        self.session_token.is_some()
    }

    /// Apply the credential headers to a request
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        let mut req = req
            .header(APPLICATION_ID_HEADER, &self.application_id)
            .header(REST_API_KEY_HEADER, &self.rest_api_key);

        if let Some(key) = &self.master_key {
            req = req.header(MASTER_KEY_HEADER, key);
        }
        if let Some(token) = &self.session_token {
            req = req.header(SESSION_TOKEN_HEADER, token);
        }
        req
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &self.application_id)
            .field("rest_api_key", &"***")
            .field("has_master_key", &self.master_key.is_some())
            .field("has_session_token", &self.session_token.is_some())
            .finish()
    }
}
