//! Tests for StateManager

use super::*;
use crate::pagination::SyncCursor;
use crate::types::parse_utc_timestamp;
use chrono::{DateTime, Utc};
use serde_json::json;
use tempfile::tempdir;

const STREAM: &str = "ActivityEvents";
const KEY: &str = "CreationTime";

fn ts(s: &str) -> DateTime<Utc> {
    parse_utc_timestamp(s).unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_state_manager_from_json() {
    let manager = StateManager::from_json(
        r#"{"streams": {"ActivityEvents": {"cursor": {"window_start": "2024-01-03T00:00:00Z"}}}}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(
        manager.get_cursor(STREAM).await,
        Some(SyncCursor::fresh(ts("2024-01-03")))
    );
}

#[tokio::test]
async fn test_state_manager_from_blank_json() {
    let manager = StateManager::from_json("  ").unwrap();
    assert_eq!(manager.to_value().await.unwrap(), json!({"streams": {}}));
}

#[test]
fn test_state_manager_from_invalid_json() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, crate::error::Error::State { .. }));
}

// ============================================================================
// Checkpoint Tests
// ============================================================================

#[tokio::test]
async fn test_checkpoint_stream_sets_cursor_and_watermark() {
    let manager = StateManager::in_memory();
    let cursor = SyncCursor::fresh(ts("2024-01-01")).with_token("tok");

    manager
        .checkpoint_stream(STREAM, KEY, cursor.clone(), Some(ts("2024-01-01T08:00:00Z")))
        .await
        .unwrap();

    let stream = manager.stream_state(STREAM).await.unwrap();
    assert_eq!(stream.cursor, Some(cursor));
    assert_eq!(stream.replication_key.as_deref(), Some(KEY));
    assert_eq!(
        stream.replication_key_value.as_deref(),
        Some("2024-01-01T08:00:00Z")
    );
}

#[tokio::test]
async fn test_checkpoint_stream_never_lowers_watermark() {
    let manager = StateManager::in_memory();
    let day1 = SyncCursor::fresh(ts("2024-01-01"));

    manager
        .checkpoint_stream(STREAM, KEY, day1.clone(), Some(ts("2024-01-01T20:00:00Z")))
        .await
        .unwrap();
    manager
        .checkpoint_stream(STREAM, KEY, day1.next_day(), Some(ts("2024-01-01T03:00:00Z")))
        .await
        .unwrap();
    manager
        .checkpoint_stream(STREAM, KEY, day1.next_day().next_day(), None)
        .await
        .unwrap();

    let stream = manager.stream_state(STREAM).await.unwrap();
    assert_eq!(stream.watermark(), Some(ts("2024-01-01T20:00:00Z")));
    assert_eq!(stream.cursor, Some(SyncCursor::fresh(ts("2024-01-03"))));
}

#[tokio::test]
async fn test_checkpoint_without_records_records_key() {
    let manager = StateManager::in_memory();
    manager
        .checkpoint_stream(STREAM, KEY, SyncCursor::fresh(ts("2024-01-01")), None)
        .await
        .unwrap();

    let value = manager.to_value().await.unwrap();
    assert_eq!(
        value,
        json!({
            "streams": {
                "ActivityEvents": {
                    "replication_key": "CreationTime",
                    "cursor": {"window_start": "2024-01-01T00:00:00Z"}
                }
            }
        })
    );
}

#[tokio::test]
async fn test_resume_cursor_falls_back_to_watermark() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"ActivityEvents": {"replication_key": "CreationTime", "replication_key_value": "2024-05-05T05:05:05Z"}}}"#,
    )
    .unwrap();

    assert!(manager.get_cursor(STREAM).await.is_none());
    assert_eq!(
        manager.resume_cursor(STREAM).await,
        Some(SyncCursor::fresh(ts("2024-05-05")))
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_auto_save_on_checkpoint() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    let cursor = SyncCursor::fresh(ts("2024-01-01")).with_token("abc 123");
    manager
        .checkpoint_stream(STREAM, KEY, cursor.clone(), None)
        .await
        .unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(reloaded.get_cursor(STREAM).await, Some(cursor));
}

#[tokio::test]
async fn test_from_file_nonexistent_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nonexistent.json");

    let manager = StateManager::from_file(&path).unwrap();
    assert_eq!(manager.to_value().await.unwrap(), json!({"streams": {}}));
    manager.save().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_load_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, "not valid json").unwrap();

    assert!(StateManager::from_file(&path).is_err());
}

#[tokio::test]
async fn test_save_in_memory_noop() {
    let manager = StateManager::in_memory();
    manager
        .checkpoint_stream(STREAM, KEY, SyncCursor::fresh(ts("2024-01-01")), None)
        .await
        .unwrap();
    manager.save().await.unwrap();
    assert!(manager.get_cursor(STREAM).await.is_some());
}

// ============================================================================
// Sharing Tests
// ============================================================================

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    manager
        .checkpoint_stream(STREAM, KEY, SyncCursor::fresh(ts("2024-01-09")), None)
        .await
        .unwrap();

    assert_eq!(
        clone.get_cursor(STREAM).await,
        Some(SyncCursor::fresh(ts("2024-01-09")))
    );
    assert_eq!(
        clone.to_value().await.unwrap()["streams"][STREAM]["cursor"]["window_start"],
        json!("2024-01-09T00:00:00Z")
    );
}
