/// Resource state definitions for tracking crawl progress
use std::fmt;

/// Represents where a video is in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    // ===== Active States =====
    /// Not yet visited, or left behind when the run halted
    Pending,

    /// Its log is open and threads are being walked
    InProgress,

    // ===== Terminal Success States =====
    /// Every top-level page was walked
    Done,

    // ===== Terminal Skip States =====
    /// Already collected by an earlier run
    Skipped,

    /// The input descriptor was missing fields or had an unusable id
    Malformed,

    // ===== Terminal Stop States =====
    /// Walk stopped because the quota ran out; halts the run
    Aborted,

    /// Walk ended by a remote failure (not found, repeated errors)
    Abandoned,
}

impl ResourceState {
    /// Returns true if the run must stop after reaching this state
    pub fn halts_run(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Malformed => "malformed",
            Self::Aborted => "aborted",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
