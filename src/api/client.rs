//! HTTP client for the comment listing endpoints
//!
//! This module handles every remote call the crawler makes:
//! - Building the HTTP client with timeouts and compression
//! - Building listing URLs for top-level threads and replies
//! - Decoding pages and classifying failures into [`ApiError`] kinds

use crate::api::error::ApiError;
use crate::api::types::{ErrorResponse, ListResponse};
use crate::config::{ApiConfig, TextFormat, ThreadOrder};
use crate::{ConfigError, TrawlError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Longest slice of an undecodable error body kept in messages
const MAX_ERROR_BODY: usize = 200;

/// Which listing a request walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing<'a> {
    /// Top-level threads of a video
    Threads(&'a str),

    /// Replies under a top-level comment
    Replies(&'a str),
}

impl<'a> Listing<'a> {
    fn path(&self) -> &'static str {
        match self {
            Self::Threads(_) => "commentThreads",
            Self::Replies(_) => "comments",
        }
    }

    /// The id being listed (video id or parent comment id)
    pub fn target(&self) -> &'a str {
        match self {
            Self::Threads(id) | Self::Replies(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Threads(_) => "threads",
            Self::Replies(_) => "replies",
        }
    }
}

/// One decoded page
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` ends pagination
    pub next_cursor: Option<String>,
}

/// Client for the remote comment API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    api_key: String,
    page_size: u32,
    order: ThreadOrder,
    text_format: TextFormat,
}

impl ApiClient {
    /// Builds a client from configuration, resolving the API key
    pub fn new(config: &ApiConfig) -> Result<Self, TrawlError> {
        let api_key = resolve_api_key(config)?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let http = build_http_client(Duration::from_secs(config.request_timeout_secs))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            page_size: config.page_size,
            order: config.order,
            text_format: config.text_format,
        })
    }

    /// Builds the full request URL for one page of a listing
    pub fn page_url(&self, listing: Listing<'_>, cursor: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(listing.path());
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("part", "snippet");
            match listing {
                Listing::Threads(video_id) => {
                    query.append_pair("videoId", video_id);
                    query.append_pair("order", self.order.as_str());
                }
                Listing::Replies(parent_id) => {
                    query.append_pair("parentId", parent_id);
                }
            }
            query.append_pair("maxResults", &self.page_size.to_string());
            query.append_pair("textFormat", self.text_format.as_str());
            if let Some(token) = cursor {
                query.append_pair("pageToken", token);
            }
            query.append_pair("key", &self.api_key);
        }

        url
    }

    /// Issues a single listing request
    ///
    /// Never retries; retry and quota policy live in the crawler's page fetcher.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        listing: Listing<'_>,
        cursor: Option<&str>,
    ) -> Result<Page<T>, ApiError> {
        let url = self.page_url(listing, cursor);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if !status.is_success() {
            let parsed: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            let message = if parsed.error.message.is_empty() {
                body.chars().take(MAX_ERROR_BODY).collect()
            } else {
                parsed.error.message.clone()
            };
            return Err(ApiError::from_status(status, parsed.reason(), message));
        }

        let page: ListResponse<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;

        Ok(Page {
            items: page.items,
            // An empty token is treated the same as a missing one
            next_cursor: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Builds the underlying HTTP client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Picks the inline key, falling back to the configured environment variable
fn resolve_api_key(config: &ApiConfig) -> Result<String, ConfigError> {
    if let Some(key) = &config.api_key {
        return Ok(key.clone());
    }

    std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey(config.api_key_env.clone()))
}
