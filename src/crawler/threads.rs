//! Thread walker: drains the top-level pages of one video
//!
//! Each top-level comment is written before its replies are walked, so every
//! reply in a log follows the record of its parent.

use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::replies::ReplyWalker;
use crate::crawler::WalkOutcome;
use crate::output::{CommentLog, CommentRecord};
use crate::quota::QuotaLedger;
use crate::resources::Resource;
use crate::TrawlError;

pub struct ThreadWalker<'a> {
    fetcher: &'a PageFetcher,
    replies: ReplyWalker<'a>,
    margin: u64,
}

impl<'a> ThreadWalker<'a> {
    /// Creates a walker that stops paging once no more than `margin` units remain
    pub fn new(fetcher: &'a PageFetcher, margin: u64) -> Self {
        Self {
            fetcher,
            replies: ReplyWalker::new(fetcher),
            margin,
        }
    }

    /// Writes every thread of `resource` (and its replies) to `log`
    pub async fn walk(
        &self,
        ledger: &mut QuotaLedger,
        log: &mut CommentLog,
        resource: &Resource,
    ) -> Result<WalkOutcome, TrawlError> {
        let mut cursor: Option<String> = None;

        loop {
            let page = match self
                .fetcher
                .fetch_threads(ledger, &resource.id, cursor.as_deref())
                .await?
            {
                FetchResult::Page(page) => page,
                FetchResult::Failed(err) => return Ok(WalkOutcome::from_failure(err)),
                FetchResult::Exhausted => return Ok(WalkOutcome::QuotaExhausted),
            };

            for thread in &page.items {
                log.append(&CommentRecord::top_level(thread, resource))?;

                if thread.snippet.total_reply_count == 0 {
                    continue;
                }

                let parent_id = &thread.snippet.top_level_comment.id;
                match self
                    .replies
                    .walk(ledger, log, parent_id, &thread.id, resource)
                    .await?
                {
                    WalkOutcome::Completed => {}
                    WalkOutcome::QuotaExhausted => return Ok(WalkOutcome::QuotaExhausted),
                    WalkOutcome::Abandoned(err) => {
                        tracing::info!(
                            "Giving up on replies to comment {} of video {}: {}",
                            parent_id,
                            resource.id,
                            err
                        );
                    }
                }
            }

            let next = match page.next_cursor {
                Some(next) => next,
                None => return Ok(WalkOutcome::Completed),
            };

            if ledger.near_exhaustion(self.margin) {
                tracing::warn!(
                    "Daily quota limit approaching: {}/{}. Stopping video {} mid-way.",
                    ledger.used(),
                    ledger.ceiling(),
                    resource.id
                );
                return Ok(WalkOutcome::QuotaExhausted);
            }

            cursor = Some(next);
        }
    }
}
