//! Configuration module for Comment-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use comment_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Quota ceiling: {}", config.quota.ceiling);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlerConfig, OutputConfig, QuotaConfig, ResumeMode, TextFormat,
    ThreadOrder,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
