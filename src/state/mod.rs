//! State module for tracking crawl progress
//!
//! Each video in the input list moves through a small state machine:
//!
//! ```text
//! Pending -> Skipped | Malformed
//! Pending -> InProgress -> Done | Aborted | Abandoned
//! ```

mod resource_state;

pub use resource_state::ResourceState;
