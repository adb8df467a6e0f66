use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig, QuotaConfig};
use crate::ConfigError;
use url::Url;

/// Largest page the listing endpoints accept
const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound on network retries for a single page
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_quota_config(&config.quota)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates remote API settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.api_key.as_deref() == Some("") {
        return Err(ConfigError::Validation("api-key cannot be empty".to_string()));
    }

    if config.api_key.is_none() && config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "either api-key or api-key-env must be set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the quota budget
fn validate_quota_config(config: &QuotaConfig) -> Result<(), ConfigError> {
    if config.ceiling < 1 {
        return Err(ConfigError::Validation(
            "quota ceiling must be >= 1".to_string(),
        ));
    }

    if config.margin >= config.ceiling {
        tracing::warn!(
            "Quota margin ({}) is not below the ceiling ({}); no requests will be issued",
            config.margin,
            config.ceiling
        );
    }

    if config.ledger_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "ledger-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::Validation(
            "resources path cannot be empty".to_string(),
        ));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
