use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{DigestError, ErrorKind};

/// Lookback window used when a channel request does not name one.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// A single chat message, already reduced to what the prompt needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// A root message identified by its channel and Slack timestamp (`1700000000.000100`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadReference {
    pub channel_id: String,
    pub ts: String,
}

impl fmt::Display for ThreadReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel_id, self.ts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Channel,
    Thread,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub kind: TargetKind,
    /// Channel name (or ID) for channel requests, thread link or identifier for threads.
    pub target: String,
    pub lookback_days: Option<i64>,
    pub custom_prompt: Option<String>,
}

impl SummaryRequest {
    #[must_use]
    pub fn channel(channel: &str, lookback_days: Option<i64>, custom_prompt: Option<String>) -> Self {
        Self {
            kind: TargetKind::Channel,
            target: channel.trim().trim_start_matches('#').to_string(),
            lookback_days,
            custom_prompt,
        }
    }

    #[must_use]
    pub fn thread(reference: &str, custom_prompt: Option<String>) -> Self {
        Self {
            kind: TargetKind::Thread,
            target: reference.trim().to_string(),
            lookback_days: None,
            custom_prompt,
        }
    }

    /// Label used in notifications and titles: `#general` or the thread link.
    #[must_use]
    pub fn display_target(&self) -> String {
        match self.kind {
            TargetKind::Channel => format!("#{}", self.target),
            TargetKind::Thread => self.target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Summary(String),
    Failed { kind: ErrorKind, message: String },
}

impl SummaryResult {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryResult::Summary(text) => Some(text),
            SummaryResult::Failed { .. } => None,
        }
    }
}

impl From<&DigestError> for SummaryResult {
    fn from(error: &DigestError) -> Self {
        SummaryResult::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
