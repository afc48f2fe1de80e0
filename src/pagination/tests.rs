//! Tests for pagination module

use super::*;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde_json::json;
use test_case::test_case;

const PATH: &str = "/admin/activityevents";
const RECORD_PATH: &str = "activityEventEntities";

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn pager() -> DayWindowPaginator {
    DayWindowPaginator::new(PATH, RECORD_PATH)
}

// ============================================================================
// Window Tests
// ============================================================================

#[test_case("2024-01-01T00:00:00Z", "'2024-01-01T00:00:00.000Z'", "'2024-01-01T23:59:59.999Z'"; "already floored")]
#[test_case("2024-01-01T13:45:12.345Z", "'2024-01-01T00:00:00.000Z'", "'2024-01-01T23:59:59.999Z'"; "mid day")]
#[test_case("2024-02-29T23:59:59.999999Z", "'2024-02-29T00:00:00.000Z'", "'2024-02-29T23:59:59.999Z'"; "leap day last microsecond")]
#[test_case("2023-12-31T08:00:00+05:00", "'2023-12-31T00:00:00.000Z'", "'2023-12-31T23:59:59.999Z'"; "offset input normalized to utc")]
fn test_request_window_formatting(input: &str, start: &str, end: &str) {
    let window = RequestWindow::for_day(ts(input));
    assert_eq!(format_api_datetime(window.start), start);
    assert_eq!(format_api_datetime(window.end), end);
}

#[test]
fn test_request_window_is_one_day_minus_one_microsecond() {
    let window = RequestWindow::for_day(ts("2024-06-15T10:00:00Z"));
    assert_eq!(
        window.end - window.start,
        chrono::Duration::days(1) - chrono::Duration::microseconds(1)
    );
    assert_eq!(window.end, ts("2024-06-15T23:59:59.999999Z"));
}

#[test_case("2024-12-31T22:00:00Z", "2025-01-01T00:00:00Z"; "year boundary")]
#[test_case("2024-02-28T05:00:00Z", "2024-02-29T00:00:00Z"; "into leap day")]
#[test_case("2024-03-31T00:00:00Z", "2024-04-01T00:00:00Z"; "month boundary")]
fn test_cursor_next_day(start: &str, expected: &str) {
    let cursor = SyncCursor::fresh(ts(start)).with_token("tok");
    let next = cursor.next_day();
    assert_eq!(next.window_start, ts(expected));
    assert!(!next.has_token());
}

#[test]
fn test_day_floor() {
    assert_eq!(
        day_floor(ts("2024-01-01T23:59:59.999999Z")),
        ts("2024-01-01T00:00:00Z")
    );
}

// ============================================================================
// Request Construction Tests
// ============================================================================

#[test]
fn test_build_request_fresh_day() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T09:30:00Z"));
    let request = pager().build_request(&cursor);

    assert_eq!(request.path, PATH);
    assert_eq!(request.query.len(), 2);
    assert_eq!(
        request.query.get(START_PARAM),
        Some(&"'2024-01-01T00:00:00.000Z'".to_string())
    );
    assert_eq!(
        request.query.get(END_PARAM),
        Some(&"'2024-01-01T23:59:59.999Z'".to_string())
    );
    assert!(!request.query.contains_key(TOKEN_PARAM));
}

#[test]
fn test_build_request_with_token_omits_dates() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z")).with_token("abc 123");
    let request = pager().build_request(&cursor);

    assert_eq!(request.query.len(), 1);
    assert_eq!(
        request.query.get(TOKEN_PARAM),
        Some(&"'abc 123'".to_string())
    );
}

#[test]
fn test_page_request_to_request_config() {
    let request = PageRequest::new(PATH).param("a", "1").param("b", "2");
    let config = request.to_request_config();
    assert_eq!(config.query, request.query);
    assert!(config.headers.is_empty());
}

// ============================================================================
// Page Parsing Tests
// ============================================================================

#[test]
fn test_token_present_continues_same_day() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({
        "activityEventEntities": [{"Id": "1"}],
        "continuationToken": "abc%20123",
        "lastResultSet": false
    });

    let page = pager()
        .parse_page(&body, &cursor, ts("2024-03-01T00:00:00Z"))
        .unwrap();

    assert_eq!(page.records, vec![json!({"Id": "1"})]);
    let expected = SyncCursor {
        window_start: ts("2024-01-01T00:00:00Z"),
        continuation_token: Some("abc 123".to_string()),
    };
    assert_eq!(page.next, NextPage::Continuation(expected.clone()));

    // The follow-up request carries exactly that token
    let request = pager().build_request(&expected);
    assert_eq!(request.query.len(), 1);
    assert_eq!(
        request.query.get(TOKEN_PARAM),
        Some(&"'abc 123'".to_string())
    );
}

#[test]
fn test_token_present_even_when_day_is_today() {
    let now = ts("2024-01-01T12:00:00Z");
    let cursor = SyncCursor::fresh(now);
    let body = json!({"activityEventEntities": [], "continuationToken": "next"});

    let page = pager().parse_page(&body, &cursor, now).unwrap();
    assert!(matches!(page.next, NextPage::Continuation(_)));
}

#[test]
fn test_no_token_advances_when_next_day_is_past() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z")).with_token("old");
    let body = json!({
        "activityEventEntities": [{"Id": "a"}, {"Id": "b"}, {"Id": "c"}],
        "continuationToken": null
    });

    let page = pager()
        .parse_page(&body, &cursor, ts("2024-01-05T00:00:00Z"))
        .unwrap();

    assert_eq!(page.records.len(), 3);
    assert_eq!(
        page.next,
        NextPage::NextDay(SyncCursor::fresh(ts("2024-01-02T00:00:00Z")))
    );

    let request = pager().build_request(page.next.cursor().unwrap());
    assert_eq!(
        request.query.get(START_PARAM),
        Some(&"'2024-01-02T00:00:00.000Z'".to_string())
    );
    assert_eq!(
        request.query.get(END_PARAM),
        Some(&"'2024-01-02T23:59:59.999Z'".to_string())
    );
}

#[test_case("2024-01-01T18:00:00Z"; "now inside the window")]
#[test_case("2024-01-02T00:00:00Z"; "now exactly at next day")]
fn test_no_token_terminates_when_next_day_not_past(now: &str) {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"activityEventEntities": [{"Id": "x"}]});

    let page = pager().parse_page(&body, &cursor, ts(now)).unwrap();
    assert_eq!(page.records.len(), 1);
    assert!(page.next.is_done());
    assert!(page.next.cursor().is_none());
}

#[test]
fn test_empty_day_still_advances() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"activityEventEntities": []});

    let page = pager()
        .parse_page(&body, &cursor, ts("2024-01-10T00:00:00Z"))
        .unwrap();
    assert!(page.records.is_empty());
    assert!(matches!(page.next, NextPage::NextDay(_)));
}

#[test]
fn test_empty_token_treated_as_absent() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"activityEventEntities": [], "continuationToken": ""});

    let page = pager()
        .parse_page(&body, &cursor, ts("2024-01-10T00:00:00Z"))
        .unwrap();
    assert!(matches!(page.next, NextPage::NextDay(_)));
}

#[test]
fn test_parse_page_is_deterministic() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let now = ts("2024-02-01T00:00:00Z");
    let body = json!({
        "activityEventEntities": [{"Id": "2"}, {"Id": "1"}],
        "continuationToken": "t%2B1"
    });

    let first = pager().parse_page(&body, &cursor, now).unwrap();
    let second = pager().parse_page(&body, &cursor, now).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.next.cursor().unwrap().continuation_token.as_deref(),
        Some("t+1")
    );
}

#[test]
fn test_missing_event_array_is_error() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"continuationToken": null});

    let err = pager()
        .parse_page(&body, &cursor, ts("2024-02-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
}

#[test]
fn test_non_string_token_is_error() {
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"activityEventEntities": [], "continuationToken": 42});

    let err = pager()
        .parse_page(&body, &cursor, ts("2024-02-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::ContinuationToken { .. }));
}

#[test]
fn test_custom_token_field() {
    let pager = pager().with_token_field("nextToken");
    let cursor = SyncCursor::fresh(ts("2024-01-01T00:00:00Z"));
    let body = json!({"activityEventEntities": [], "nextToken": "zz"});

    let page = pager
        .parse_page(&body, &cursor, ts("2024-02-01T00:00:00Z"))
        .unwrap();
    assert_eq!(
        page.next.cursor().unwrap().continuation_token.as_deref(),
        Some("zz")
    );
    assert_eq!(pager.path(), PATH);
}

// ============================================================================
// Token Decoding Tests
// ============================================================================

#[test_case("abc%20123", "abc 123"; "encoded space")]
#[test_case("a%2Fb%3D%3D", "a/b=="; "encoded base64 tail")]
#[test_case("plain", "plain"; "nothing to decode")]
#[test_case("a+b", "a+b"; "plus is literal")]
fn test_decode_continuation_token(raw: &str, expected: &str) {
    assert_eq!(decode_continuation_token(raw).unwrap(), expected);
}

#[test]
fn test_decode_continuation_token_invalid_utf8() {
    let err = decode_continuation_token("%FF%FE").unwrap_err();
    assert!(matches!(err, Error::ContinuationToken { .. }));
}

// ============================================================================
// Cursor & Clock Tests
// ============================================================================

#[test]
fn test_cursor_serde() {
    let cursor: SyncCursor =
        serde_json::from_value(json!({"window_start": "2024-01-01T00:00:00Z"})).unwrap();
    assert_eq!(cursor, SyncCursor::fresh(ts("2024-01-01T00:00:00Z")));

    let with_token = cursor.with_token("abc");
    let value = serde_json::to_value(&with_token).unwrap();
    assert_eq!(value["continuation_token"], "abc");
    let back: SyncCursor = serde_json::from_value(value).unwrap();
    assert_eq!(back, with_token);

    let value = serde_json::to_value(&cursor).unwrap();
    assert!(value.get("continuation_token").is_none());
}

#[test]
fn test_fixed_clock() {
    let clock = FixedClock(ts("2024-01-01T12:00:00Z"));
    assert_eq!(clock.now(), ts("2024-01-01T12:00:00Z"));
}

#[test]
fn test_system_clock_moves_forward() {
    let before = Utc::now();
    assert!(SystemClock.now() >= before);
}
