//! Statistics over the files a crawl leaves behind
//!
//! Reads the ledger and the per-video logs without touching the network, so it
//! is safe to run while no crawl is active.

use crate::config::Config;
use crate::output::log::{count_records, is_partial, marker_path};
use crate::quota::QuotaLedger;
use crate::resources::{load_resources, Descriptor};
use crate::TrawlError;
use std::path::Path;

/// How far a video's log got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    /// The completion marker exists
    Complete,
    /// The log has records but no marker (interrupted or abandoned)
    Partial,
    /// No log, or an empty one
    NotStarted,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub quota_used: u64,
    pub quota_ceiling: u64,
    pub total_resources: usize,
    pub complete: usize,
    pub partial: usize,
    pub not_started: usize,
    pub malformed: usize,
    /// Records across every log of the list
    pub total_records: u64,
    /// Videos with partial logs, in list order
    pub partial_ids: Vec<String>,
}

/// Classifies a single video's output
pub fn log_status(dir: &Path, video_id: &str) -> std::io::Result<LogStatus> {
    if marker_path(dir, video_id).is_file() {
        Ok(LogStatus::Complete)
    } else if is_partial(dir, video_id)? {
        Ok(LogStatus::Partial)
    } else {
        Ok(LogStatus::NotStarted)
    }
}

/// Loads statistics for the resource list and output directory named in `config`
pub fn load_statistics(config: &Config) -> Result<CrawlStatistics, TrawlError> {
    let ledger = QuotaLedger::open(&config.ledger_path(), config.quota.ceiling)?;
    let descriptors = load_resources(Path::new(&config.crawler.resources))?;
    let dir = config.output_dir();

    let mut stats = CrawlStatistics {
        quota_used: ledger.used(),
        quota_ceiling: ledger.ceiling(),
        total_resources: descriptors.len(),
        ..Default::default()
    };

    for descriptor in &descriptors {
        let resource = match descriptor {
            Descriptor::Valid(resource) => resource,
            Descriptor::Invalid { .. } => {
                stats.malformed += 1;
                continue;
            }
        };

        match log_status(dir, &resource.id)? {
            LogStatus::Complete => stats.complete += 1,
            LogStatus::Partial => {
                stats.partial += 1;
                stats.partial_ids.push(resource.id.clone());
            }
            LogStatus::NotStarted => stats.not_started += 1,
        }
        stats.total_records += count_records(dir, &resource.id)?;
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    let percentage = if stats.quota_ceiling > 0 {
        (stats.quota_used as f64 / stats.quota_ceiling as f64) * 100.0
    } else {
        0.0
    };
    println!("Quota:");
    println!(
        "  Used: {} / {} ({:.1}%)",
        stats.quota_used, stats.quota_ceiling, percentage
    );
    println!();

    println!("Videos ({}):", stats.total_resources);
    println!("  Complete: {}", stats.complete);
    println!("  Partial: {}", stats.partial);
    println!("  Not started: {}", stats.not_started);
    if stats.malformed > 0 {
        println!("  Malformed rows: {}", stats.malformed);
    }
    println!();

    if !stats.partial_ids.is_empty() {
        println!("Partial Logs ({}):", stats.partial_ids.len());
        for id in &stats.partial_ids {
            println!("  - {}", id);
        }
        println!();
    }

    println!("Total comments collected: {}", stats.total_records);
}
