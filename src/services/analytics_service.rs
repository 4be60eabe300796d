//! Analytics service layer
//!
//! Dashboard aggregation and the recent-activity feed. Counts and top-N
//! breakdowns are pushed down to the database; averages and hourly trend
//! buckets are computed here from the rows the storage layer returns.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::errors::Result;
use crate::storage::{ClickEvent, LabelCount, PageView, SeaOrmStorage, SessionSnapshot, TopElement};

/// 趋势分桶的 key 格式（UTC，小时补零）
const TREND_BUCKET_FORMAT: &str = "%Y-%m-%d %H";

// ============ 公共类型定义 ============

/// 看板统计窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Period {
    Hour,
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Period {
    /// 解析查询参数；无法识别时退回 `Week`
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|v| Period::from_str(v.trim()).ok())
            .unwrap_or_default()
    }

    /// 窗口起点。月/年按日历月回退
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let cutoff = match self {
            Period::Hour => now.checked_sub_signed(Duration::hours(1)),
            Period::Day => now.checked_sub_signed(Duration::days(1)),
            Period::Week => now.checked_sub_signed(Duration::weeks(1)),
            Period::Month => now.checked_sub_months(Months::new(1)),
            Period::Year => now.checked_sub_months(Months::new(12)),
        };
        cutoff.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownItem {
    pub label: String,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl From<LabelCount> for BreakdownItem {
    fn from(row: LabelCount) -> Self {
        Self {
            label: row.label,
            value: row.count,
            extra: None,
        }
    }
}

impl From<TopElement> for BreakdownItem {
    fn from(row: TopElement) -> Self {
        Self {
            label: row.element_id,
            value: row.count,
            extra: row.element_text,
        }
    }
}

/// 趋势数据点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub time: String,
    pub count: u64,
}

/// 看板汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_page_views: u64,
    pub unique_visitors: u64,
    pub total_clicks: u64,
    pub avg_session_duration: f64,
    pub avg_page_views_per_session: f64,
    pub returning_visitors: u64,
    pub new_visitors: u64,
    pub popular_pages: Vec<BreakdownItem>,
    pub top_clicked_elements: Vec<BreakdownItem>,
    pub entry_pages: Vec<BreakdownItem>,
    pub exit_pages: Vec<BreakdownItem>,
    pub device_stats: Vec<BreakdownItem>,
    pub browser_stats: Vec<BreakdownItem>,
    pub country_stats: Vec<BreakdownItem>,
    pub referrer_stats: Vec<BreakdownItem>,
    pub page_view_trend: Vec<TrendPoint>,
    pub click_trend: Vec<TrendPoint>,
}

/// 活动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    PageView,
    Click,
}

/// 最近活动条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<PageView> for ActivityItem {
    fn from(view: PageView) -> Self {
        Self {
            kind: ActivityKind::PageView,
            page: view.page,
            element: None,
            timestamp: view.timestamp,
            device: view.device_type,
            country: view.country,
        }
    }
}

impl From<ClickEvent> for ActivityItem {
    fn from(click: ClickEvent) -> Self {
        Self {
            kind: ActivityKind::Click,
            page: click.page,
            element: click.element_text.or(click.element_id),
            timestamp: click.timestamp,
            device: None,
            country: None,
        }
    }
}

/// 会话均值
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionSummary {
    pub avg_duration: f64,
    pub avg_page_views: f64,
    pub returning: u64,
    pub new: u64,
}

// ============ 纯计算函数 ============

/// 按 UTC 小时分桶，结果按 key 升序
pub fn hourly_buckets(timestamps: &[DateTime<Utc>]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for ts in timestamps {
        *buckets
            .entry(ts.format(TREND_BUCKET_FORMAT).to_string())
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(time, count)| TrendPoint { time, count })
        .collect()
}

/// 会话时长只统计有值的会话；没有会话时均值为 0
pub fn summarize_sessions(snapshots: &[SessionSnapshot]) -> SessionSummary {
    if snapshots.is_empty() {
        return SessionSummary::default();
    }

    let durations: Vec<i64> = snapshots.iter().filter_map(|s| s.total_duration).collect();
    let avg_duration = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<i64>() as f64 / durations.len() as f64
    };

    let total_views: i64 = snapshots.iter().map(|s| i64::from(s.page_views)).sum();
    let returning = snapshots.iter().filter(|s| s.is_returning_visitor).count() as u64;

    SessionSummary {
        avg_duration,
        avg_page_views: total_views as f64 / snapshots.len() as f64,
        returning,
        new: snapshots.len() as u64 - returning,
    }
}

fn into_items<T: Into<BreakdownItem>>(rows: Vec<T>) -> Vec<BreakdownItem> {
    rows.into_iter().map(Into::into).collect()
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    settings: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>, settings: AnalyticsConfig) -> Self {
        Self { storage, settings }
    }

    /// 按统计窗口生成看板数据
    pub async fn get_dashboard_stats(&self, period: Period) -> Result<DashboardStats> {
        let now = Utc::now();
        let since = period.cutoff(now);
        debug!("Dashboard requested: period={}, since={}", period, since);
        self.dashboard_since(since).await
    }

    /// 统计 `since` 之后（含）的全部数据
    pub async fn dashboard_since(&self, since: DateTime<Utc>) -> Result<DashboardStats> {
        let storage = &self.storage;
        let top_n = self.settings.top_n.max(1);

        let (total_page_views, unique_visitors, total_clicks, snapshots) = tokio::try_join!(
            storage.count_page_views_since(since),
            storage.count_unique_visitors_since(since),
            storage.count_clicks_since(since),
            storage.session_snapshots_since(since),
        )?;

        let (popular_pages, top_clicked_elements, entry_pages, exit_pages) = tokio::try_join!(
            storage.popular_pages_since(since, top_n),
            storage.top_clicked_elements_since(since, top_n),
            storage.entry_pages_since(since, top_n),
            storage.exit_pages_since(since, top_n),
        )?;

        let (device_stats, browser_stats, country_stats, referrer_stats) = tokio::try_join!(
            storage.device_breakdown_since(since, top_n),
            storage.browser_breakdown_since(since, top_n),
            storage.country_breakdown_since(since, top_n),
            storage.top_referrers_since(since, top_n),
        )?;

        let (view_times, click_times) = tokio::try_join!(
            storage.page_view_timestamps_since(since),
            storage.click_timestamps_since(since),
        )?;

        let sessions = summarize_sessions(&snapshots);

        Ok(DashboardStats {
            total_page_views,
            unique_visitors,
            total_clicks,
            avg_session_duration: sessions.avg_duration,
            avg_page_views_per_session: sessions.avg_page_views,
            returning_visitors: sessions.returning,
            new_visitors: sessions.new,
            popular_pages: into_items(popular_pages),
            top_clicked_elements: into_items(top_clicked_elements),
            entry_pages: into_items(entry_pages),
            exit_pages: into_items(exit_pages),
            device_stats: into_items(device_stats),
            browser_stats: into_items(browser_stats),
            country_stats: into_items(country_stats),
            referrer_stats: into_items(referrer_stats),
            page_view_trend: hourly_buckets(&view_times),
            click_trend: hourly_buckets(&click_times),
        })
    }

    /// 合并最近的页面浏览和点击，按时间倒序
    pub async fn get_recent_activity(&self, limit: Option<u64>) -> Result<Vec<ActivityItem>> {
        let limit = self.effective_limit(limit);
        let per_source = limit / 2;

        let (views, clicks) = tokio::try_join!(
            self.storage.recent_page_views(per_source),
            self.storage.recent_click_events(per_source),
        )?;

        let mut items: Vec<ActivityItem> = views
            .into_iter()
            .map(ActivityItem::from)
            .chain(clicks.into_iter().map(ActivityItem::from))
            .collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(limit as usize);

        info!("Recent activity: {} items (limit {})", items.len(), limit);
        Ok(items)
    }

    fn effective_limit(&self, requested: Option<u64>) -> u64 {
        let max = self.settings.max_activity_limit.max(1);
        requested
            .unwrap_or(self.settings.default_activity_limit)
            .clamp(1, max)
    }
}
