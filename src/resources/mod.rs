//! Resource list module
//!
//! The videos to crawl come from a CSV file with the columns `video_id`,
//! `period`, `channel_leaning` and `Source`. The three metadata columns are
//! copied verbatim onto every comment collected for that video.

mod loader;

pub use loader::load_resources;

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the resource list from being read at all
///
/// A single bad row is not an error here; it becomes [`Descriptor::Invalid`].
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to open resource list {path}: {source}")]
    Open { path: PathBuf, source: csv::Error },

    #[error("Failed to read resource list {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
}

/// Caller-supplied labels stamped onto every record of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub period: String,
    pub channel_leaning: String,
    pub source: String,
}

/// A video to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub metadata: ResourceMetadata,
}

/// One row of the input list, valid or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Valid(Resource),
    Invalid { line: u64, reason: String },
}

/// Raw CSV row before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRow {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub channel_leaning: Option<String>,
    #[serde(rename = "Source", default)]
    pub source: Option<String>,
}

impl ResourceRow {
    /// Checks every column is present and the id can name a log file
    pub fn validate(self) -> Result<Resource, String> {
        let id = required("video_id", self.video_id)?.trim().to_string();
        if !is_valid_id(&id) {
            return Err(format!(
                "video_id '{}' may only contain ASCII letters, digits, '-' and '_'",
                id
            ));
        }

        Ok(Resource {
            id,
            metadata: ResourceMetadata {
                period: required("period", self.period)?,
                channel_leaning: required("channel_leaning", self.channel_leaning)?,
                source: required("Source", self.source)?,
            },
        })
    }
}

/// Returns the cell as written; blank cells count as missing
fn required(column: &str, value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("missing {}", column)),
    }
}

fn is_valid_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
