//! Comment-Trawl: a quota-aware threaded comment collector
//!
//! This crate walks the comment threads of a list of videos through a
//! rate-limited remote API, writing one append-only log per video while
//! tracking a persistent daily quota budget so an interrupted run can resume.

pub mod api;
pub mod config;
pub mod crawler;
pub mod output;
pub mod quota;
pub mod resources;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Comment-Trawl operations
///
/// Every variant is fatal to a run. Remote failures are not listed here: they
/// are recovered inside the crawler (see [`api::ApiError`]).
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Quota ledger error: {0}")]
    Ledger(#[from] quota::LedgerError),

    #[error("Resource list error: {0}")]
    Resources(#[from] resources::ResourceError),

    #[error("Failed to write comment log {path}: {source}")]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode comment record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("API key not found: environment variable {0} is not set")]
    MissingApiKey(String),
}

/// Result type alias for Comment-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use quota::QuotaLedger;
pub use state::ResourceState;
