//! Output module for comment logs and crawl statistics
//!
//! This module handles:
//! - The comment record written for every collected comment
//! - Append-only per-video logs and their completion markers
//! - Statistics read back from the output directory

mod log;
mod record;
pub mod stats;

pub use log::{
    count_records, is_complete, is_partial, log_path, marker_path, write_marker, CommentLog,
};
pub use record::CommentRecord;
pub use stats::{load_statistics, print_statistics, CrawlStatistics, LogStatus};
