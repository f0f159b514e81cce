//! Cursor module
//!
//! Batched scanning of an entire remote collection.
//!
//! # Overview
//!
//! The backend caps every query at [`PAGE_SIZE`] results. A [`Cursor`] hides
//! that cap: it requests pages ordered by `createdAt` with a growing `skip`
//! offset and hands records out one at a time.
//!
//! ```rust,ignore
//! let mut cursor = client.cursor("GameScore", r#"{"cheatMode":false}"#);
//! while let Some(record) = cursor.next().await {
//!     println!("{record}");
//! }
//! if let Some(err) = cursor.last_error() {
//!     eprintln!("scan stopped early: {err}");
//! }
//! ```
//!
//! Errors never surface from [`Cursor::next`]. A failed fetch ends the
//! sequence and is reported afterwards by [`Cursor::last_error`], so callers
//! must check it once the loop finishes.
//!
//! Offsets are only stable while the collection is not being written to.
//! Inserting or deleting objects mid-scan can skip or repeat records.

mod scan;
mod types;

pub use scan::Cursor;
pub use types::{PageFetcher, PAGE_SIZE};
