//! Object client module
//!
//! [`ParseClient`] exposes the class endpoints of the REST API:
//!
//! | Operation       | Request                               |
//! |-----------------|---------------------------------------|
//! | `create`        | `POST /classes/{class}`               |
//! | `get`           | `GET /classes/{class}/{id}`           |
//! | `update`        | `PUT /classes/{class}/{id}`           |
//! | `delete`        | `DELETE /classes/{class}/{id}`        |
//! | `query_class`   | `GET /classes/{class}?where=...`      |
//! | `count`         | `GET /classes/{class}?count=1&limit=0`|
//!
//! It also implements [`PageFetcher`](crate::cursor::PageFetcher), so
//! `client.cursor(class, filter)` scans a whole class.

mod parse;

pub use parse::{validate_class_name, ParseClient, QueryResponse};

#[cfg(test)]
mod tests;
