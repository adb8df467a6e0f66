//! Crawler module for quota-aware comment collection
//!
//! This module contains the core crawling logic, including:
//! - Page fetching with quota debits and retry logic
//! - Walking reply pages under a top-level comment
//! - Walking top-level thread pages of a video
//! - Overall crawl coordination and resume

mod coordinator;
mod fetcher;
mod replies;
mod threads;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{FetchResult, PageFetcher, RetryPolicy};
pub use replies::ReplyWalker;
pub use threads::ThreadWalker;

use crate::api::ApiError;

/// How a thread or reply walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Pagination ran out of pages
    Completed,

    /// Budget ran out (locally or by remote rejection); the run should stop
    QuotaExhausted,

    /// A remote failure ended the walk early
    Abandoned(ApiError),
}

impl WalkOutcome {
    /// Maps a failed fetch to the outcome of the walk that issued it
    pub fn from_failure(err: ApiError) -> Self {
        if err.is_quota_rejection() {
            Self::QuotaExhausted
        } else {
            Self::Abandoned(err)
        }
    }
}
