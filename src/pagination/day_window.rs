//! Day-windowed continuation-token pager
//!
//! The activity endpoint only answers for a single UTC day per query. A day
//! is opened with `startDateTime`/`endDateTime`, then followed through
//! `continuationToken` until the service stops returning one, then the next
//! day is opened while it still lies in the past.

use super::types::{NextPage, Page, PageRequest, PageStrategy, SyncCursor};
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Query parameter opening a day window
pub const START_PARAM: &str = "startDateTime";
/// Query parameter closing a day window
pub const END_PARAM: &str = "endDateTime";
/// Query parameter and response field carrying the continuation token
pub const TOKEN_PARAM: &str = "continuationToken";

/// Pager for the admin activity-events endpoint
#[derive(Debug, Clone)]
pub struct DayWindowPaginator {
    path: String,
    token_field: String,
    decoder: JsonDecoder,
}

impl DayWindowPaginator {
    /// Create a pager for `path`, reading rows from `record_path`
    pub fn new(path: impl Into<String>, record_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            token_field: TOKEN_PARAM.to_string(),
            decoder: JsonDecoder::new(record_path),
        }
    }

    /// Read the continuation token from a different response field
    #[must_use]
    pub fn with_token_field(mut self, field: impl Into<String>) -> Self {
        self.token_field = field.into();
        self
    }

    /// Endpoint path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Token from the body, percent-decoded. Null and empty mean "none".
    fn next_token(&self, body: &Value) -> Result<Option<String>> {
        match body.get(&self.token_field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) if raw.is_empty() => Ok(None),
            Some(Value::String(raw)) => decode_continuation_token(raw).map(Some),
            Some(other) => Err(Error::continuation_token(format!(
                "expected a string in '{}', found {other}",
                self.token_field
            ))),
        }
    }
}

impl PageStrategy for DayWindowPaginator {
    fn build_request(&self, cursor: &SyncCursor) -> PageRequest {
        let request = PageRequest::new(&self.path);

        match &cursor.continuation_token {
            Some(token) => request.param(TOKEN_PARAM, format!("'{token}'")),
            None => {
                let window = cursor.window();
                request
                    .param(START_PARAM, format_api_datetime(window.start))
                    .param(END_PARAM, format_api_datetime(window.end))
            }
        }
    }

    fn parse_page(&self, body: &Value, cursor: &SyncCursor, now: DateTime<Utc>) -> Result<Page> {
        let records = self.decoder.extract(body)?;

        let next = match self.next_token(body)? {
            Some(token) => NextPage::Continuation(cursor.with_token(token)),
            None => {
                let next_day = cursor.next_day();
                if next_day.window_start < now {
                    NextPage::NextDay(next_day)
                } else {
                    NextPage::Done
                }
            }
        };

        Ok(Page { records, next })
    }
}

/// Render a timestamp the way the activity endpoint expects it:
/// single-quoted UTC with millisecond precision.
pub fn format_api_datetime(ts: DateTime<Utc>) -> String {
    ts.format("'%Y-%m-%dT%H:%M:%S%.3fZ'").to_string()
}

/// Percent-decode a continuation token as returned by the service
pub fn decode_continuation_token(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|token| token.into_owned())
        .map_err(|e| Error::continuation_token(format!("not valid UTF-8 after decoding: {e}")))
}
