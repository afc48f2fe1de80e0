//! Pagination module
//!
//! # Overview
//!
//! A `PageStrategy` turns a `SyncCursor` into the next request and a decoded
//! response into a `Page`. The sync engine drives any strategy sequentially;
//! `DayWindowPaginator` is the strategy for the one-day-per-query activity API.

mod day_window;
mod types;

pub use day_window::{
    decode_continuation_token, format_api_datetime, DayWindowPaginator, END_PARAM, START_PARAM,
    TOKEN_PARAM,
};
pub use types::{
    day_floor, Clock, FixedClock, NextPage, Page, PageRequest, PageStrategy, RequestWindow,
    SyncCursor, SystemClock,
};

#[cfg(test)]
mod tests;
