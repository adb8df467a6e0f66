//! Remote API module
//!
//! The boundary with the comment service: request building, the wire
//! format, and failure classification. Quota accounting and retry policy are
//! the crawler's job, not this module's.

mod client;
mod error;
pub mod types;

pub use client::{build_http_client, ApiClient, Listing, Page};
pub use error::ApiError;
pub use types::{Comment, CommentThread};
