//! Page fetcher
//!
//! Wraps a single listing call with the quota and failure policy:
//! - Refuses to issue a request once the ledger is exhausted
//! - Debits the ledger before every request, retries included
//! - Retries network failures with exponential backoff
//! - Waits out the fixed backoff before handing back other failures

use crate::api::{ApiClient, ApiError, Comment, CommentThread, Listing, Page};
use crate::config::CrawlerConfig;
use crate::quota::{QuotaLedger, CALL_COST};
use crate::TrawlError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<T> {
    /// A page was received
    Page(Page<T>),

    /// The request failed; the walk that asked for it should end
    Failed(ApiError),

    /// No budget left to issue the request; nothing was spent
    Exhausted,
}

/// Timing and attempt limits for failed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed wait before abandoning a walk after a failure
    pub backoff: Duration,

    /// Extra attempts allowed for network failures
    pub max_retries: u32,

    /// First retry delay; doubled each attempt, capped at `backoff`
    pub retry_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            backoff: config.backoff(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        }
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_backoff.saturating_mul(factor).min(self.backoff)
    }
}

/// Issues listing requests on behalf of the walkers
pub struct PageFetcher {
    client: ApiClient,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: ApiClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches one page of top-level threads for a video
    pub async fn fetch_threads(
        &self,
        ledger: &mut QuotaLedger,
        video_id: &str,
        cursor: Option<&str>,
    ) -> Result<FetchResult<CommentThread>, TrawlError> {
        self.fetch_page(ledger, Listing::Threads(video_id), cursor).await
    }

    /// Fetches one page of replies under a top-level comment
    pub async fn fetch_replies(
        &self,
        ledger: &mut QuotaLedger,
        parent_id: &str,
        cursor: Option<&str>,
    ) -> Result<FetchResult<Comment>, TrawlError> {
        self.fetch_page(ledger, Listing::Replies(parent_id), cursor).await
    }

    /// Fetches one page, spending one unit per request issued
    ///
    /// # Retry Logic
    ///
    /// | Failure | Action |
    /// |---------|--------|
    /// | Network / 5xx | Retry up to `max_retries`, exponential delay, then backoff → Failed |
    /// | Malformed body | Backoff → Failed |
    /// | Other 4xx | Backoff → Failed |
    /// | Not found / comments disabled | Immediate → Failed |
    /// | Quota or rate rejection | Immediate → Failed |
    ///
    /// Only a ledger persistence failure is returned as `Err`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        ledger: &mut QuotaLedger,
        listing: Listing<'_>,
        cursor: Option<&str>,
    ) -> Result<FetchResult<T>, TrawlError> {
        let mut attempt = 0;

        loop {
            if ledger.is_exhausted() {
                tracing::debug!(
                    "Quota exhausted before fetching {} for {}",
                    listing.kind(),
                    listing.target()
                );
                return Ok(FetchResult::Exhausted);
            }

            // Debit before the request so a crash mid-call never under-counts
            ledger.spend(CALL_COST)?;

            match self.client.list_page::<T>(listing, cursor).await {
                Ok(page) => {
                    tracing::debug!(
                        "Fetched {} {} for {} (more pages: {})",
                        page.items.len(),
                        listing.kind(),
                        listing.target(),
                        page.next_cursor.is_some()
                    );
                    return Ok(FetchResult::Page(page));
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.retry_delay(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Error fetching {} for {}: {} (retry {}/{} in {:?})",
                        listing.kind(),
                        listing.target(),
                        err,
                        attempt,
                        self.policy.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::warn!(
                        "Error fetching {} for {}: {}",
                        listing.kind(),
                        listing.target(),
                        err
                    );
                    if err.needs_backoff() {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                    return Ok(FetchResult::Failed(err));
                }
            }
        }
    }
}
