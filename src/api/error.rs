use reqwest::StatusCode;
use thiserror::Error;

/// Reasons the remote side uses when a request exceeds the quota or rate limit
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

/// Reasons that mean the video or parent comment cannot be listed at all
const UNAVAILABLE_REASONS: &[&str] = &[
    "commentsDisabled",
    "videoNotFound",
    "commentThreadNotFound",
    "commentNotFound",
    "parentCommentNotFound",
];

/// A failed listing request, tagged by how the crawler should react
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection failure, timeout, or 5xx; worth retrying the same page
    #[error("network error: {0}")]
    Network(String),

    /// The remote side refused on quota or rate grounds; the run must stop
    #[error("quota rejected ({status}): {message}")]
    QuotaRejected { status: u16, message: String },

    /// The body could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The video or parent comment is missing or has comments disabled
    #[error("not found ({status}): {message}")]
    NotFound { status: u16, message: String },

    /// Any other client error (bad key, bad request)
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// Maps a non-success status and its error reason to a failure kind
    pub fn from_status(status: StatusCode, reason: Option<&str>, message: String) -> Self {
        let code = status.as_u16();
        let reason = reason.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS || QUOTA_REASONS.contains(&reason) {
            return Self::QuotaRejected {
                status: code,
                message,
            };
        }

        if status == StatusCode::NOT_FOUND || UNAVAILABLE_REASONS.contains(&reason) {
            return Self::NotFound {
                status: code,
                message,
            };
        }

        if status.is_server_error() {
            return Self::Network(format!("HTTP {}: {}", code, message));
        }

        Self::Rejected {
            status: code,
            message,
        }
    }

    /// Classifies a transport-level failure
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else if err.is_connect() {
            Self::Network("connection refused".to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// True for failures where the same page may succeed on another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// True when the whole run should stop rather than just this walk
    pub fn is_quota_rejection(&self) -> bool {
        matches!(self, Self::QuotaRejected { .. })
    }

    /// True when the crawler should wait out the fixed backoff before moving on
    pub fn needs_backoff(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Malformed(_) | Self::Rejected { .. }
        )
    }
}
