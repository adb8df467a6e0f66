use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Comment-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub quota: QuotaConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL the listing endpoints are resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Inline API key (takes precedence over `api-key-env`)
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Items requested per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Ordering hint for top-level listings
    #[serde(default)]
    pub order: ThreadOrder,

    /// Text format of returned comment bodies
    #[serde(rename = "text-format", default)]
    pub text_format: TextFormat,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Ordering hint sent with top-level thread listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadOrder {
    #[default]
    Relevance,
    Time,
}

impl ThreadOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Time => "time",
        }
    }
}

/// Text format requested for comment bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TextFormat {
    #[default]
    #[serde(rename = "plainText")]
    PlainText,
    #[serde(rename = "html")]
    Html,
}

impl TextFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plainText",
            Self::Html => "html",
        }
    }
}

/// Quota budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Daily budget ceiling in quota units
    #[serde(default = "default_ceiling")]
    pub ceiling: u64,

    /// Units kept in reserve; the crawler stops once remaining <= margin
    #[serde(default = "default_margin")]
    pub margin: u64,

    /// Ledger file location (defaults to `quota_usage.txt` in the output directory)
    #[serde(rename = "ledger-path", default)]
    pub ledger_path: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// CSV file listing the videos to crawl
    pub resources: String,

    /// Wait after a failed page before abandoning the walk (milliseconds)
    #[serde(rename = "backoff-ms", default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Extra attempts for network failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial delay between network retries (milliseconds), doubled per attempt
    /// and capped at `backoff_ms`
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// How a previously visited video is recognized as complete
    #[serde(rename = "resume-mode", default)]
    pub resume_mode: ResumeMode,
}

impl CrawlerConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Resume signal used to decide whether a video was already collected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumeMode {
    /// A non-empty log file means the video is done
    #[default]
    LogPresence,

    /// Only an explicit `.done` marker means the video is done
    Marker,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the per-video logs, markers and (by default) the ledger
    pub directory: String,
}

impl Config {
    /// Resolved location of the quota ledger file
    pub fn ledger_path(&self) -> PathBuf {
        match &self.quota.ledger_path {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.output.directory).join("quota_usage.txt"),
        }
    }

    pub fn output_dir(&self) -> &Path {
        Path::new(&self.output.directory)
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_request_timeout() -> u64 {
    30
}

fn default_ceiling() -> u64 {
    10_000
}

fn default_margin() -> u64 {
    10
}

fn default_backoff_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}
