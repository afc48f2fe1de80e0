//! Pagination types and traits
//!
//! Defines the cursor, the request/page pair exchanged with the sync engine,
//! and the `PageStrategy` seam every stream's pager implements.

use crate::error::Result;
use crate::http::RequestConfig;
use crate::types::StringMap;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resumable position of a day-windowed sync
///
/// `window_start` is always a UTC day floor. When `continuation_token` is set
/// the next request resumes inside that day instead of opening a fresh window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Start of the UTC day currently being read
    pub window_start: DateTime<Utc>,
    /// URL-decoded continuation token, if a day is partially read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl SyncCursor {
    /// Cursor at the start of the day containing `ts`, with no token
    pub fn fresh(ts: DateTime<Utc>) -> Self {
        Self {
            window_start: day_floor(ts),
            continuation_token: None,
        }
    }

    /// Same day, continuing with `token`
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            window_start: self.window_start,
            continuation_token: Some(token.into()),
        }
    }

    /// Cursor for the following day, with the token cleared
    #[must_use]
    pub fn next_day(&self) -> Self {
        Self {
            window_start: day_floor(self.window_start) + Duration::days(1),
            continuation_token: None,
        }
    }

    /// Whether the next request continues a partially read day
    pub fn has_token(&self) -> bool {
        self.continuation_token.is_some()
    }

    /// The one-day request window for this cursor
    pub fn window(&self) -> RequestWindow {
        RequestWindow::for_day(self.window_start)
    }
}

/// Truncate a timestamp to midnight UTC of the same day
pub fn day_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive `[start, end]` bounds of one UTC calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestWindow {
    /// Day floor
    pub start: DateTime<Utc>,
    /// Next day floor minus one microsecond
    pub end: DateTime<Utc>,
}

impl RequestWindow {
    /// Window covering the UTC day containing `ts`
    pub fn for_day(ts: DateTime<Utc>) -> Self {
        let start = day_floor(ts);
        Self {
            start,
            end: start + Duration::days(1) - Duration::microseconds(1),
        }
    }
}

/// One outbound request produced by a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Path relative to the API base URL
    pub path: String,
    /// Query parameters, unencoded
    pub query: StringMap,
}

impl PageRequest {
    /// Create a request for `path` with no parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: StringMap::new(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Convert into the HTTP client's per-request config
    pub fn to_request_config(&self) -> RequestConfig {
        self.query
            .iter()
            .fold(RequestConfig::new(), |config, (k, v)| config.query(k, v))
    }
}

/// What the driver should do after a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Same day, follow the continuation token
    Continuation(SyncCursor),
    /// Day exhausted, open the next day's window
    NextDay(SyncCursor),
    /// Caught up with the clock
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The cursor to resume from, if any
    pub fn cursor(&self) -> Option<&SyncCursor> {
        match self {
            Self::Continuation(cursor) | Self::NextDay(cursor) => Some(cursor),
            Self::Done => None,
        }
    }
}

/// Rows of one response plus the pager's decision
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in the order the API returned them
    pub records: Vec<Value>,
    /// Next step
    pub next: NextPage,
}

/// Core trait for pagination strategies
pub trait PageStrategy: Send + Sync {
    /// Build the request for the given cursor
    fn build_request(&self, cursor: &SyncCursor) -> PageRequest;

    /// Extract records from a decoded body and decide the next step
    fn parse_page(&self, body: &Value, cursor: &SyncCursor, now: DateTime<Utc>) -> Result<Page>;
}

/// Source of "now" for termination checks
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
