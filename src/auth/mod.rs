//! Authentication module
//!
//! Every request carries the application id and REST API key. A master key
//! bypasses class-level permissions; a session token acts as a signed-in
//! user. Both are optional and only sent when set.

mod credentials;

pub use credentials::{
    Credentials, APPLICATION_ID_HEADER, MASTER_KEY_HEADER, REST_API_KEY_HEADER,
    SESSION_TOKEN_HEADER,
};
