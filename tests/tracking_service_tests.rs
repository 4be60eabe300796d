//! Session tracking integration tests

use std::sync::Arc;

use tempfile::TempDir;

use portfolio::errors::PortfolioError;
use portfolio::services::{
    ClickRequest, PageViewRequest, RequestMeta, SessionUpdate, TrackingService,
};
use portfolio::storage::SeaOrmStorage;

const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

async fn setup() -> (TempDir, Arc<SeaOrmStorage>, TrackingService) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("tracking_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let service = TrackingService::new(storage.clone());
    (temp_dir, storage, service)
}

fn page_view(page: &str, session_id: &str) -> PageViewRequest {
    PageViewRequest {
        page: Some(page.to_string()),
        session_id: Some(session_id.to_string()),
        duration: None,
    }
}

fn click(session_id: &str, element_id: &str) -> ClickRequest {
    ClickRequest {
        session_id: Some(session_id.to_string()),
        page: Some("/".to_string()),
        element_type: Some("button".to_string()),
        element_id: Some(element_id.to_string()),
        element_text: Some("Contact".to_string()),
        target_url: None,
        x: Some(120.0),
        y: Some(48.0),
    }
}

fn meta(ip: &str) -> RequestMeta {
    RequestMeta {
        referrer: Some("https://google.com".to_string()),
        user_agent: Some(CHROME_WINDOWS.to_string()),
        ip_address: Some(ip.to_string()),
        country: Some("US".to_string()),
    }
}

#[tokio::test]
async fn test_first_page_view_creates_session() {
    let (_dir, storage, service) = setup().await;

    let update = service
        .record_page_view(page_view("/", "s-new"), meta("198.51.100.1"))
        .await
        .unwrap();
    assert!(matches!(update, SessionUpdate::Created(_)));

    let session = storage.find_session("s-new").await.unwrap().unwrap();
    assert_eq!(session.page_views, 1);
    assert_eq!(session.clicks, 0);
    assert_eq!(session.entry_page.as_deref(), Some("/"));
    assert_eq!(session.exit_page, None);
    assert_eq!(session.pages_visited, vec!["/"]);
    assert_eq!(session.total_duration, Some(0));
    assert!(!session.is_returning_visitor);
    assert_eq!(session.browser.as_deref(), Some("Chrome"));
    assert_eq!(session.operating_system.as_deref(), Some("Windows"));
    assert_eq!(session.device_type.as_deref(), Some("Desktop"));
    assert_eq!(session.country.as_deref(), Some("US"));
    assert_eq!(session.referrer.as_deref(), Some("https://google.com"));

    let views = storage.recent_page_views(10).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].browser.as_deref(), Some("Chrome"));
}

#[tokio::test]
async fn test_repeat_page_views_update_session() {
    let (_dir, storage, service) = setup().await;
    let ip = "198.51.100.2";

    service.record_page_view(page_view("/", "s-1"), meta(ip)).await.unwrap();
    let update = service
        .record_page_view(page_view("/projects", "s-1"), meta(ip))
        .await
        .unwrap();
    assert!(matches!(update, SessionUpdate::Updated(_)));
    service.record_page_view(page_view("/", "s-1"), meta(ip)).await.unwrap();

    let session = storage.find_session("s-1").await.unwrap().unwrap();
    assert_eq!(session.page_views, 3);
    assert_eq!(session.exit_page.as_deref(), Some("/"));
    assert_eq!(session.entry_page.as_deref(), Some("/"));
    assert_eq!(session.pages_visited, vec!["/", "/projects"]);
    assert!(session.end_time.unwrap() >= session.start_time);

    assert_eq!(storage.recent_page_views(10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_returning_visitor_by_ip() {
    let (_dir, storage, service) = setup().await;

    service
        .record_page_view(page_view("/", "visit-1"), meta("203.0.113.10"))
        .await
        .unwrap();
    service
        .record_page_view(page_view("/", "visit-2"), meta("203.0.113.10"))
        .await
        .unwrap();
    service
        .record_page_view(page_view("/", "visit-3"), meta("203.0.113.99"))
        .await
        .unwrap();

    let second = storage.find_session("visit-2").await.unwrap().unwrap();
    let third = storage.find_session("visit-3").await.unwrap().unwrap();
    assert!(second.is_returning_visitor);
    assert!(!third.is_returning_visitor);
}

#[tokio::test]
async fn test_missing_ip_is_never_returning() {
    let (_dir, storage, service) = setup().await;
    let no_ip = RequestMeta::default();

    service.record_page_view(page_view("/", "anon-1"), no_ip.clone()).await.unwrap();
    service.record_page_view(page_view("/", "anon-2"), no_ip).await.unwrap();

    let session = storage.find_session("anon-2").await.unwrap().unwrap();
    assert!(!session.is_returning_visitor);
    assert_eq!(session.browser, None);
    assert_eq!(session.device_type, None);
}

#[tokio::test]
async fn test_click_without_session_does_not_create_one() {
    let (_dir, storage, service) = setup().await;

    let update = service
        .record_click(click("ghost", "cta"), meta("192.0.2.1"))
        .await
        .unwrap();
    assert_eq!(update, SessionUpdate::Missing);

    assert!(storage.find_session("ghost").await.unwrap().is_none());
    let clicks = storage.recent_click_events(10).await.unwrap();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].x_position, Some(120));
    assert_eq!(clicks[0].element_id.as_deref(), Some("cta"));
}

#[tokio::test]
async fn test_click_increments_existing_session() {
    let (_dir, storage, service) = setup().await;

    service
        .record_page_view(page_view("/", "s-click"), meta("192.0.2.2"))
        .await
        .unwrap();
    service.record_click(click("s-click", "a"), meta("192.0.2.2")).await.unwrap();
    service.record_click(click("s-click", "b"), meta("192.0.2.2")).await.unwrap();

    let session = storage.find_session("s-click").await.unwrap().unwrap();
    assert_eq!(session.clicks, 2);
    assert_eq!(session.page_views, 1);
}

#[tokio::test]
async fn test_missing_fields_are_rejected_without_writes() {
    let (_dir, storage, service) = setup().await;

    let err = service
        .record_page_view(
            PageViewRequest {
                page: Some("/".to_string()),
                session_id: None,
                duration: None,
            },
            meta("192.0.2.3"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::Validation(_)));
    assert_eq!(err.message(), "Page and sessionId are required");

    let err = service
        .record_click(
            ClickRequest {
                element_type: Some("  ".to_string()),
                ..click("s", "x")
            },
            meta("192.0.2.3"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.message(), "SessionId, page, and elementType are required");

    assert!(storage.recent_page_views(10).await.unwrap().is_empty());
    assert!(storage.recent_click_events(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_first_page_views_share_one_session() {
    let (_dir, storage, service) = setup().await;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .record_page_view(page_view(&format!("/p{}", i), "race"), meta("192.0.2.50"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = storage.find_session("race").await.unwrap().unwrap();
    assert!(session.page_views >= 1 && session.page_views <= 4);
    assert_eq!(storage.recent_page_views(10).await.unwrap().len(), 4);
}
