//! Storage integration tests
//!
//! Read paths that the tracking and dashboard code lean on, including reads
//! issued while another connection holds the SQLite write lock.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, TransactionTrait};
use tempfile::TempDir;

use portfolio::services::{PageViewRequest, RequestMeta, TrackingService};
use portfolio::storage::SeaOrmStorage;

async fn setup() -> (TempDir, Arc<SeaOrmStorage>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("storage_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, storage)
}

fn meta(ip: Option<&str>) -> RequestMeta {
    RequestMeta {
        referrer: None,
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0".to_string()),
        ip_address: ip.map(str::to_string),
        country: None,
    }
}

fn view(page: &str, session_id: &str) -> PageViewRequest {
    PageViewRequest {
        page: Some(page.to_string()),
        session_id: Some(session_id.to_string()),
        duration: None,
    }
}

#[tokio::test]
async fn test_has_session_for_ip() {
    let (_dir, storage) = setup().await;
    let tracking = TrackingService::new(storage.clone());

    assert!(!storage.has_session_for_ip("198.51.100.7").await.unwrap());

    tracking
        .record_page_view(view("/", "s-ip"), meta(Some("198.51.100.7")))
        .await
        .unwrap();

    assert!(storage.has_session_for_ip("198.51.100.7").await.unwrap());
    assert!(!storage.has_session_for_ip("198.51.100.8").await.unwrap());
}

#[tokio::test]
async fn test_recent_page_views_newest_first_with_limit() {
    let (_dir, storage) = setup().await;
    let tracking = TrackingService::new(storage.clone());

    for page in ["/a", "/b", "/c"] {
        tracking
            .record_page_view(view(page, "s-recent"), meta(None))
            .await
            .unwrap();
    }

    let recent = storage.recent_page_views(2).await.unwrap();
    let pages: Vec<&str> = recent.iter().map(|v| v.page.as_str()).collect();
    assert_eq!(pages, vec!["/c", "/b"]);
    assert!(storage.recent_click_events(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reads_proceed_while_writer_holds_lock() {
    let (_dir, storage) = setup().await;

    let txn = storage.get_db().begin().await.unwrap();
    txn.execute_unprepared(
        "INSERT INTO projects (title, description, tech_stack, images, created_at, updated_at) \
         VALUES ('Pending', '', '[]', '[]', '2024-01-01 00:00:00+00:00', '2024-01-01 00:00:00+00:00')",
    )
    .await
    .unwrap();

    // 写事务未提交，其他连接上的读取应立即返回旧快照
    let count = tokio::time::timeout(Duration::from_secs(2), storage.count_projects())
        .await
        .expect("count_projects blocked behind writer")
        .unwrap();
    assert_eq!(count, 0);

    let seen = tokio::time::timeout(
        Duration::from_secs(2),
        storage.has_session_for_ip("203.0.113.1"),
    )
    .await
    .expect("has_session_for_ip blocked behind writer")
    .unwrap();
    assert!(!seen);

    txn.commit().await.unwrap();
    assert_eq!(storage.count_projects().await.unwrap(), 1);
}
