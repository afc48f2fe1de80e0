//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - drives any `PageStrategy` one request at a time,
//!   checkpointing the cursor after every page
//! - `SyncConfig` - Configuration for sync operations
//! - Message types for output (Schema, Record, State, Log)

mod types;

pub use types::{Message, SyncConfig, SyncStats};

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{Clock, NextPage, Page, PageStrategy, SyncCursor, SystemClock};
use crate::state::StateManager;
use crate::streams::StreamDefinition;
use crate::types::parse_utc_timestamp;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
    /// Source of "now" for termination checks
    clock: Box<dyn Clock>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, state: StateManager) -> Self {
        Self {
            client,
            state,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Cursor a stream starts from: persisted state, else `default_start`
    pub async fn start_cursor(&self, stream: &str, default_start: DateTime<Utc>) -> SyncCursor {
        match self.state.resume_cursor(stream).await {
            Some(cursor) => {
                info!(
                    stream,
                    window_start = %cursor.window_start,
                    continuation = cursor.has_token(),
                    "Resuming from state"
                );
                cursor
            }
            None => {
                let cursor = SyncCursor::fresh(default_start);
                info!(stream, window_start = %cursor.window_start, "No state, starting fresh");
                cursor
            }
        }
    }

    /// Sync one stream: SCHEMA, then records and checkpoints until caught up
    pub async fn sync_stream<F>(
        &mut self,
        stream: &StreamDefinition,
        default_start: DateTime<Utc>,
        emit: &mut F,
    ) -> Result<SyncCursor>
    where
        F: FnMut(Message) -> Result<()>,
    {
        let started = Instant::now();
        emit(Message::schema(stream))?;

        let start = self.start_cursor(&stream.name, default_start).await;
        let records_before = self.stats.records_synced;
        let resume = self
            .run_pages(
                &stream.name,
                &stream.replication_key,
                &stream.paginator(),
                start,
                emit,
            )
            .await?;

        self.stats.add_stream();
        self.stats
            .set_duration(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

        info!(
            stream = %stream.name,
            records = self.stats.records_synced - records_before,
            pages = self.stats.pages_fetched,
            days = self.stats.days_completed,
            "Completed sync"
        );

        Ok(resume)
    }

    /// Drive `strategy` from `start` until it reports `Done` or the record
    /// limit is hit. Returns the cursor persisted last.
    pub async fn run_pages<S, F>(
        &mut self,
        stream: &str,
        replication_key: &str,
        strategy: &S,
        start: SyncCursor,
        emit: &mut F,
    ) -> Result<SyncCursor>
    where
        S: PageStrategy + ?Sized,
        F: FnMut(Message) -> Result<()>,
    {
        let mut cursor = start;
        let mut emitted = 0usize;

        loop {
            let request = strategy.build_request(&cursor);
            info!(
                stream,
                window_start = %cursor.window_start,
                continuation = cursor.has_token(),
                "Requesting page"
            );

            let body: Value = self
                .client
                .get_json_with_config(&request.path, request.to_request_config())
                .await?;
            self.stats.add_page();

            let now = self.clock.now();
            let Page { mut records, next } = strategy.parse_page(&body, &cursor, now)?;
            debug!(
                stream,
                records = records.len(),
                page = self.stats.pages_fetched,
                "Page received"
            );

            let truncated = match self.config.remaining(emitted) {
                Some(remaining) if records.len() > remaining => {
                    records.truncate(remaining);
                    true
                }
                _ => false,
            };

            let max_seen = max_timestamp(&records, replication_key);
            let extracted_at = Utc::now();
            let count = records.len();
            for record in records {
                emit(Message::record(stream, record, extracted_at))?;
            }
            emitted += count;
            self.stats.add_records(count);

            // A cut page is re-read on the next run rather than skipped
            let resume = if truncated {
                cursor.clone()
            } else {
                match &next {
                    NextPage::Continuation(next_cursor) => next_cursor.clone(),
                    NextPage::NextDay(next_cursor) => {
                        info!(
                            stream,
                            from = %cursor.window_start,
                            to = %next_cursor.window_start,
                            "Day advanced"
                        );
                        self.stats.add_day();
                        next_cursor.clone()
                    }
                    NextPage::Done => SyncCursor::fresh(cursor.window_start),
                }
            };

            self.state
                .checkpoint_stream(stream, replication_key, resume.clone(), max_seen)
                .await?;
            if self.config.emit_state_per_page {
                emit(Message::state(self.state.to_value().await?))?;
            }

            if self.config.remaining(emitted) == Some(0) {
                info!(stream, records = emitted, "Record limit reached, stopping");
                return Ok(resume);
            }

            if next.is_done() {
                info!(
                    stream,
                    window_start = %cursor.window_start,
                    now = %now,
                    "Caught up with the clock, stopping"
                );
                return Ok(resume);
            }

            cursor = resume;
        }
    }

    /// Fetch the first page of today's window without touching state
    ///
    /// Returns the number of records on that page.
    pub async fn probe(&self, stream: &StreamDefinition) -> Result<usize> {
        let now = self.clock.now();
        let cursor = SyncCursor::fresh(now);
        let strategy = stream.paginator();
        let request = strategy.build_request(&cursor);

        let body: Value = self
            .client
            .get_json_with_config(&request.path, request.to_request_config())
            .await?;
        let page = strategy.parse_page(&body, &cursor, now)?;
        Ok(page.records.len())
    }
}

/// Highest parseable timestamp in `field` across `records`
fn max_timestamp(records: &[Value], field: &str) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter_map(|record| record.get(field)?.as_str())
        .filter_map(parse_utc_timestamp)
        .max()
}
