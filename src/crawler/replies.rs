//! Reply walker: drains the reply pages under one top-level comment

use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::WalkOutcome;
use crate::output::{CommentLog, CommentRecord};
use crate::quota::QuotaLedger;
use crate::resources::Resource;
use crate::TrawlError;

pub struct ReplyWalker<'a> {
    fetcher: &'a PageFetcher,
}

impl<'a> ReplyWalker<'a> {
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Writes every reply under `parent_id` to `log`, page by page
    pub async fn walk(
        &self,
        ledger: &mut QuotaLedger,
        log: &mut CommentLog,
        parent_id: &str,
        thread_id: &str,
        resource: &Resource,
    ) -> Result<WalkOutcome, TrawlError> {
        let mut cursor: Option<String> = None;

        loop {
            let page = match self
                .fetcher
                .fetch_replies(ledger, parent_id, cursor.as_deref())
                .await?
            {
                FetchResult::Page(page) => page,
                FetchResult::Failed(err) => return Ok(WalkOutcome::from_failure(err)),
                FetchResult::Exhausted => return Ok(WalkOutcome::QuotaExhausted),
            };

            for reply in &page.items {
                log.append(&CommentRecord::reply(reply, parent_id, thread_id, resource))?;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(WalkOutcome::Completed),
            }
        }
    }
}
