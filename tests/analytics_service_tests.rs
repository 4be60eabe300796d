//! Dashboard aggregation and activity feed integration tests

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use portfolio::config::AnalyticsConfig;
use portfolio::services::{ActivityKind, AnalyticsService, BreakdownItem, Period};
use portfolio::storage::{NewClickEvent, NewPageView, SeaOrmStorage, UserSession};

async fn setup() -> (TempDir, Arc<SeaOrmStorage>, AnalyticsService) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("analytics_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let service = AnalyticsService::new(storage.clone(), AnalyticsConfig::default());
    (temp_dir, storage, service)
}

fn view(page: &str, session_id: &str, at: DateTime<Utc>) -> NewPageView {
    NewPageView {
        page: page.to_string(),
        referrer: None,
        user_agent: None,
        ip_address: None,
        session_id: session_id.to_string(),
        timestamp: at,
        duration: None,
        device_type: Some("Desktop".to_string()),
        browser: Some("Chrome".to_string()),
        operating_system: Some("Windows".to_string()),
        country: None,
        city: None,
    }
}

fn click(session_id: &str, element_id: Option<&str>, text: Option<&str>, at: DateTime<Utc>) -> NewClickEvent {
    NewClickEvent {
        session_id: session_id.to_string(),
        page: "/".to_string(),
        element_type: "link".to_string(),
        element_id: element_id.map(str::to_string),
        element_text: text.map(str::to_string),
        target_url: None,
        x_position: None,
        y_position: None,
        timestamp: at,
        user_agent: None,
        ip_address: None,
    }
}

fn session(session_id: &str, start: DateTime<Utc>, duration: Option<i64>, page_views: i32, returning: bool) -> UserSession {
    UserSession {
        id: 0,
        session_id: session_id.to_string(),
        ip_address: None,
        user_agent: None,
        start_time: start,
        end_time: Some(start),
        total_duration: duration,
        page_views,
        clicks: 0,
        entry_page: Some("/".to_string()),
        exit_page: None,
        referrer: None,
        device_type: None,
        browser: None,
        operating_system: None,
        country: None,
        city: None,
        is_returning_visitor: returning,
        pages_visited: vec!["/".to_string()],
    }
}

fn item(label: &str, value: i64) -> BreakdownItem {
    BreakdownItem {
        label: label.to_string(),
        value,
        extra: None,
    }
}

#[tokio::test]
async fn test_empty_store_gives_zeroes() {
    let (_dir, _storage, service) = setup().await;

    let stats = service.get_dashboard_stats(Period::Week).await.unwrap();
    assert_eq!(stats.total_page_views, 0);
    assert_eq!(stats.unique_visitors, 0);
    assert_eq!(stats.total_clicks, 0);
    assert_eq!(stats.avg_session_duration, 0.0);
    assert_eq!(stats.avg_page_views_per_session, 0.0);
    assert!(stats.popular_pages.is_empty());
    assert!(stats.page_view_trend.is_empty());
}

#[tokio::test]
async fn test_window_boundary_is_inclusive() {
    let (_dir, storage, service) = setup().await;
    let cutoff = Utc::now() - Duration::hours(24);

    storage.insert_page_view(&view("/old", "a", cutoff - Duration::seconds(1))).await.unwrap();
    storage.insert_page_view(&view("/edge", "b", cutoff)).await.unwrap();
    storage.insert_page_view(&view("/new", "b", cutoff + Duration::hours(1))).await.unwrap();
    storage.insert_click_event(&click("a", Some("x"), None, cutoff - Duration::minutes(5))).await.unwrap();
    storage.insert_click_event(&click("b", Some("x"), None, cutoff + Duration::minutes(5))).await.unwrap();

    let stats = service.dashboard_since(cutoff).await.unwrap();
    assert_eq!(stats.total_page_views, 2);
    assert_eq!(stats.unique_visitors, 1);
    assert_eq!(stats.total_clicks, 1);
    assert!(stats.popular_pages.iter().all(|p| p.label != "/old"));
}

#[tokio::test]
async fn test_day_period_excludes_older_events() {
    let (_dir, storage, service) = setup().await;
    let now = Utc::now();

    storage.insert_page_view(&view("/stale", "a", now - Duration::hours(25))).await.unwrap();
    storage.insert_page_view(&view("/fresh", "b", now - Duration::hours(2))).await.unwrap();

    let stats = service.get_dashboard_stats(Period::Day).await.unwrap();
    assert_eq!(stats.total_page_views, 1);
    assert_eq!(stats.popular_pages, vec![item("/fresh", 1)]);

    let week = service.get_dashboard_stats(Period::Week).await.unwrap();
    assert_eq!(week.total_page_views, 2);
}

#[tokio::test]
async fn test_breakdowns_sorted_by_value_then_label() {
    let (_dir, storage, service) = setup().await;
    let now = Utc::now();

    for (page, n) in [("/b", 2), ("/a", 2), ("/c", 3), ("/d", 1)] {
        for i in 0..n {
            let mut v = view(page, &format!("{}-{}", page, i), now - Duration::minutes(10));
            if page == "/d" {
                v.device_type = Some("Mobile".to_string());
                v.country = Some("FR".to_string());
            }
            storage.insert_page_view(&v).await.unwrap();
        }
    }

    let stats = service.dashboard_since(now - Duration::hours(1)).await.unwrap();
    assert_eq!(
        stats.popular_pages,
        vec![item("/c", 3), item("/a", 2), item("/b", 2), item("/d", 1)]
    );
    assert_eq!(stats.device_stats, vec![item("Desktop", 7), item("Mobile", 1)]);
    assert_eq!(stats.browser_stats, vec![item("Chrome", 8)]);
    assert_eq!(stats.country_stats, vec![item("FR", 1)]);
    assert_eq!(stats.unique_visitors, 8);
}

#[tokio::test]
async fn test_top_n_caps_lists() {
    let (_dir, storage, _) = setup().await;
    let service = AnalyticsService::new(
        storage.clone(),
        AnalyticsConfig {
            top_n: 2,
            ..AnalyticsConfig::default()
        },
    );
    let now = Utc::now();
    for page in ["/1", "/2", "/3", "/4"] {
        storage.insert_page_view(&view(page, "s", now)).await.unwrap();
    }

    let stats = service.dashboard_since(now - Duration::minutes(1)).await.unwrap();
    assert_eq!(stats.popular_pages.len(), 2);
    assert_eq!(stats.total_page_views, 4);
}

#[tokio::test]
async fn test_top_clicked_elements_carry_text() {
    let (_dir, storage, service) = setup().await;
    let now = Utc::now();

    for _ in 0..3 {
        storage.insert_click_event(&click("s", Some("github"), Some("GitHub"), now)).await.unwrap();
    }
    storage.insert_click_event(&click("s", Some("resume"), None, now)).await.unwrap();
    storage.insert_click_event(&click("s", None, Some("anonymous"), now)).await.unwrap();

    let stats = service.dashboard_since(now - Duration::minutes(1)).await.unwrap();
    assert_eq!(stats.total_clicks, 5);
    assert_eq!(
        stats.top_clicked_elements,
        vec![
            BreakdownItem {
                label: "github".to_string(),
                value: 3,
                extra: Some("GitHub".to_string()),
            },
            item("resume", 1),
        ]
    );
}

#[tokio::test]
async fn test_session_aggregates() {
    let (_dir, storage, service) = setup().await;
    let now = Utc::now();

    let mut first = session("s1", now - Duration::minutes(30), Some(120), 4, false);
    first.exit_page = Some("/contact".to_string());
    first.referrer = Some("https://news.ycombinator.com".to_string());
    storage.insert_session(&first).await.unwrap();

    let mut second = session("s2", now - Duration::minutes(20), Some(60), 2, true);
    second.referrer = Some(String::new());
    storage.insert_session(&second).await.unwrap();

    storage.insert_session(&session("s3", now - Duration::minutes(10), None, 3, false)).await.unwrap();
    storage.insert_session(&session("old", now - Duration::days(30), Some(999), 9, true)).await.unwrap();

    let stats = service.dashboard_since(now - Duration::hours(1)).await.unwrap();
    assert_eq!(stats.avg_session_duration, 90.0);
    assert_eq!(stats.avg_page_views_per_session, 3.0);
    assert_eq!(stats.returning_visitors, 1);
    assert_eq!(stats.new_visitors, 2);
    assert_eq!(stats.entry_pages, vec![item("/", 3)]);
    assert_eq!(stats.exit_pages, vec![item("/contact", 1)]);
    assert_eq!(stats.referrer_stats, vec![item("https://news.ycombinator.com", 1)]);
}

#[tokio::test]
async fn test_hourly_trend_buckets() {
    let (_dir, storage, service) = setup().await;
    let base = Utc::now() - Duration::hours(5);

    storage.insert_page_view(&view("/", "a", base)).await.unwrap();
    storage.insert_page_view(&view("/", "a", base + Duration::hours(2))).await.unwrap();
    storage.insert_page_view(&view("/", "a", base + Duration::hours(2))).await.unwrap();

    let stats = service.dashboard_since(base - Duration::minutes(1)).await.unwrap();
    let expected_first = base.format("%Y-%m-%d %H").to_string();
    let expected_second = (base + Duration::hours(2)).format("%Y-%m-%d %H").to_string();

    assert_eq!(stats.page_view_trend.len(), 2);
    assert_eq!(stats.page_view_trend[0].time, expected_first);
    assert_eq!(stats.page_view_trend[0].count, 1);
    assert_eq!(stats.page_view_trend[1].time, expected_second);
    assert_eq!(stats.page_view_trend[1].count, 2);
    assert!(stats.click_trend.is_empty());
}

#[tokio::test]
async fn test_recent_activity_merges_and_limits() {
    let (_dir, storage, service) = setup().await;
    let now = Utc::now();

    for i in 0..8 {
        storage
            .insert_page_view(&view(&format!("/v{}", i), "s", now - Duration::minutes(i * 2)))
            .await
            .unwrap();
        storage
            .insert_click_event(&click("s", Some("btn"), Some("Go"), now - Duration::minutes(i * 2 + 1)))
            .await
            .unwrap();
    }

    let items = service.get_recent_activity(Some(10)).await.unwrap();
    assert_eq!(items.len(), 10);
    assert!(items.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(items.iter().filter(|i| i.kind == ActivityKind::PageView).count(), 5);
    assert_eq!(items.iter().filter(|i| i.kind == ActivityKind::Click).count(), 5);
    assert_eq!(items[0].page, "/v0");
    assert_eq!(items[1].element.as_deref(), Some("Go"));
    assert_eq!(items[0].device.as_deref(), Some("Desktop"));
}

#[tokio::test]
async fn test_recent_activity_limit_is_clamped() {
    let (_dir, storage, _) = setup().await;
    let service = AnalyticsService::new(
        storage.clone(),
        AnalyticsConfig {
            default_activity_limit: 4,
            max_activity_limit: 6,
            ..AnalyticsConfig::default()
        },
    );
    let now = Utc::now();
    for i in 0..10 {
        storage.insert_page_view(&view("/", "s", now - Duration::seconds(i))).await.unwrap();
        storage.insert_click_event(&click("s", Some("b"), None, now - Duration::seconds(i))).await.unwrap();
    }

    assert_eq!(service.get_recent_activity(None).await.unwrap().len(), 4);
    assert_eq!(service.get_recent_activity(Some(1000)).await.unwrap().len(), 6);
}
