//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the loop over the resource list, including:
//! - Opening the quota ledger and resuming its count
//! - Skipping videos collected by an earlier run
//! - Opening one append-only log per video and walking its threads
//! - Halting the whole run when the quota nears its ceiling

use crate::api::ApiClient;
use crate::config::{Config, ResumeMode};
use crate::crawler::fetcher::{PageFetcher, RetryPolicy};
use crate::crawler::threads::ThreadWalker;
use crate::crawler::WalkOutcome;
use crate::output::{is_complete, is_partial, write_marker, CommentLog};
use crate::quota::QuotaLedger;
use crate::resources::{load_resources, Descriptor, Resource};
use crate::state::ResourceState;
use crate::TrawlError;
use std::fs;
use std::path::Path;

/// What a run did, derived from the states each video ended in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub done: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub aborted: usize,
    pub abandoned: usize,
    /// Videos never visited because the run halted first
    pub pending: usize,
    /// Records appended to logs during this run
    pub records_written: u64,
    /// Requests issued during this run (one quota unit each)
    pub calls_issued: u64,
    /// Ledger value when the run ended
    pub quota_used: u64,
    pub quota_ceiling: u64,
    /// True if the run stopped early on quota
    pub halted_on_quota: bool,
}

impl CrawlReport {
    fn record(&mut self, state: ResourceState) {
        match state {
            ResourceState::Done => self.done += 1,
            ResourceState::Skipped => self.skipped += 1,
            ResourceState::Malformed => self.malformed += 1,
            ResourceState::Aborted => self.aborted += 1,
            ResourceState::Abandoned => self.abandoned += 1,
            ResourceState::Pending | ResourceState::InProgress => self.pending += 1,
        }
    }

    /// Number of videos that ended the run in `state`
    pub fn count(&self, state: ResourceState) -> usize {
        match state {
            ResourceState::Done => self.done,
            ResourceState::Skipped => self.skipped,
            ResourceState::Malformed => self.malformed,
            ResourceState::Aborted => self.aborted,
            ResourceState::Abandoned => self.abandoned,
            ResourceState::Pending => self.pending,
            ResourceState::InProgress => 0,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: PageFetcher,
    ledger: QuotaLedger,
}

impl Coordinator {
    /// Creates a new coordinator, resuming the persisted quota count
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TrawlError)` - Output directory, ledger or HTTP client could not be set up
    pub fn new(config: Config) -> Result<Self, TrawlError> {
        fs::create_dir_all(config.output_dir())?;

        let ledger_path = config.ledger_path();
        if let Some(parent) = ledger_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let ledger = QuotaLedger::open(&ledger_path, config.quota.ceiling)?;
        if ledger.used() > 0 {
            tracing::info!(
                "Resuming with quota usage: {}/{} (ledger: {})",
                ledger.used(),
                ledger.ceiling(),
                ledger.path().display()
            );
        }

        let client = ApiClient::new(&config.api)?;
        let fetcher = PageFetcher::new(client, RetryPolicy::from_config(&config.crawler));

        Ok(Self {
            config,
            fetcher,
            ledger,
        })
    }

    /// Runs the crawl over `descriptors` in order
    ///
    /// Returns `Err` only for failures that would break resumability (ledger or
    /// log writes). Remote failures end up in the report instead.
    pub async fn run(&mut self, descriptors: &[Descriptor]) -> Result<CrawlReport, TrawlError> {
        let total = descriptors.len();
        let margin = self.config.quota.margin;
        let start_used = self.ledger.used();
        let mut report = CrawlReport::default();

        tracing::info!(
            "Starting crawl of {} videos (quota used: {}/{}, margin: {})",
            total,
            self.ledger.used(),
            self.ledger.ceiling(),
            margin
        );

        for (index, descriptor) in descriptors.iter().enumerate() {
            if self.ledger.near_exhaustion(margin) {
                tracing::warn!(
                    "Daily quota limit approaching: {}/{}. Stopping.",
                    self.ledger.used(),
                    self.ledger.ceiling()
                );
                report.halted_on_quota = true;
                report.pending += total - index;
                break;
            }

            let resource = match descriptor {
                Descriptor::Valid(resource) => resource,
                Descriptor::Invalid { line, reason } => {
                    tracing::warn!("Skipping malformed resource on line {}: {}", line, reason);
                    report.record(ResourceState::Malformed);
                    continue;
                }
            };

            let (state, records) = self.process_resource(resource, index + 1, total).await?;
            report.record(state);
            report.records_written += records;

            if state.halts_run() {
                report.halted_on_quota = true;
                report.pending += total - index - 1;
                break;
            }
        }

        report.calls_issued = self.ledger.used() - start_used;
        report.quota_used = self.ledger.used();
        report.quota_ceiling = self.ledger.ceiling();

        if report.halted_on_quota {
            tracing::warn!(
                "Crawl halted on quota: {} done, {} skipped, {} pending (quota used: {}/{})",
                report.done,
                report.skipped,
                report.pending,
                report.quota_used,
                report.quota_ceiling
            );
        } else {
            tracing::info!(
                "Data collection complete: {} done, {} skipped, {} abandoned, {} malformed (quota used: {}/{})",
                report.done,
                report.skipped,
                report.abandoned,
                report.malformed,
                report.quota_used,
                report.quota_ceiling
            );
        }

        Ok(report)
    }

    /// Walks one video from `Pending` to a terminal state
    ///
    /// Returns the state reached and the number of records written.
    async fn process_resource(
        &mut self,
        resource: &Resource,
        position: usize,
        total: usize,
    ) -> Result<(ResourceState, u64), TrawlError> {
        let dir = Path::new(&self.config.output.directory);
        let mode = self.config.crawler.resume_mode;

        if is_complete(dir, &resource.id, mode)? {
            tracing::info!("Skipping already processed video: {}", resource.id);
            return Ok((ResourceState::Skipped, 0));
        }

        let truncate = mode == ResumeMode::Marker && is_partial(dir, &resource.id)?;
        if truncate {
            tracing::info!(
                "Discarding partial log for video {} and starting from the first page",
                resource.id
            );
        }

        tracing::info!(
            "Processing video {} ({}/{}) [{}]",
            resource.id,
            position,
            total,
            ResourceState::InProgress
        );

        let mut log = CommentLog::open(dir, &resource.id, truncate)?;
        tracing::debug!("Appending comments to {}", log.path().display());
        let walker = ThreadWalker::new(&self.fetcher, self.config.quota.margin);
        let outcome = walker.walk(&mut self.ledger, &mut log, resource).await?;
        let records = log.finish()?;

        let state = match outcome {
            WalkOutcome::Completed => {
                write_marker(dir, &resource.id, records)?;
                ResourceState::Done
            }
            WalkOutcome::QuotaExhausted => ResourceState::Aborted,
            WalkOutcome::Abandoned(err) => {
                tracing::warn!("Abandoned video {}: {}", resource.id, err);
                ResourceState::Abandoned
            }
        };

        tracing::info!(
            "Comments collected for video {}: {} records, {} (quota used: {}/{})",
            resource.id,
            records,
            state,
            self.ledger.used(),
            self.ledger.ceiling()
        );

        Ok((state, records))
    }
}

/// Runs the main crawl operation
///
/// Loads the resource list named in the configuration and walks it once.
///
/// # Example
///
/// ```no_run
/// use comment_trawl::config::load_config;
/// use comment_trawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("trawl.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} videos done", report.done);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, TrawlError> {
    let descriptors = load_resources(Path::new(&config.crawler.resources))?;
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(&descriptors).await
}
