//! Analytics 相关的数据库查询
//!
//! 时间窗口统一为 `timestamp >= since`（会话按 `start_time`）。
//! 供 AnalyticsService 组装看板数据。

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

use super::SeaOrmStorage;
use super::retry;
use crate::errors::Result;

use migration::entities::{click_event, page_view, user_session};

// ============ 查询结果类型 ============

/// 分组计数结果行
#[derive(Debug, FromQueryResult)]
struct LabelCountRow {
    label: Option<String>,
    count: i64,
}

/// 点击元素分组结果行
#[derive(Debug, FromQueryResult)]
struct ElementCountRow {
    element_id: Option<String>,
    element_text: Option<String>,
    count: i64,
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// 点击最多的元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopElement {
    pub element_id: String,
    pub element_text: Option<String>,
    pub count: i64,
}

/// 会话均值统计所需的列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub total_duration: Option<i64>,
    pub page_views: i32,
    pub is_returning_visitor: bool,
}

fn into_label_counts(rows: Vec<LabelCountRow>) -> Vec<LabelCount> {
    rows.into_iter()
        .filter_map(|row| {
            row.label.map(|label| LabelCount {
                label,
                count: row.count,
            })
        })
        .collect()
}

// ============ SeaOrmStorage Analytics 方法 ============

impl SeaOrmStorage {
    pub async fn count_page_views_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        Ok(
            retry::with_retry("count_page_views_since", self.retry_config, || async move {
                page_view::Entity::find()
                    .filter(page_view::Column::Timestamp.gte(since))
                    .count(db)
                    .await
            })
            .await?,
        )
    }

    /// 窗口内页面浏览涉及的不同 session_id 数量
    pub async fn count_unique_visitors_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        Ok(
            retry::with_retry("count_unique_visitors_since", self.retry_config, || async move {
                page_view::Entity::find()
                    .select_only()
                    .column(page_view::Column::SessionId)
                    .distinct()
                    .filter(page_view::Column::Timestamp.gte(since))
                    .count(db)
                    .await
            })
            .await?,
        )
    }

    pub async fn count_clicks_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        Ok(
            retry::with_retry("count_clicks_since", self.retry_config, || async move {
                click_event::Entity::find()
                    .filter(click_event::Column::Timestamp.gte(since))
                    .count(db)
                    .await
            })
            .await?,
        )
    }

    /// 窗口内开始的会话（只取均值计算用到的列）
    pub async fn session_snapshots_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SessionSnapshot>> {
        let db = &self.db;

        let rows: Vec<(Option<i64>, i32, bool)> =
            retry::with_retry("session_snapshots_since", self.retry_config, || async move {
                user_session::Entity::find()
                    .select_only()
                    .column(user_session::Column::TotalDuration)
                    .column(user_session::Column::PageViews)
                    .column(user_session::Column::IsReturningVisitor)
                    .filter(user_session::Column::StartTime.gte(since))
                    .into_tuple()
                    .all(db)
                    .await
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(total_duration, page_views, is_returning_visitor)| SessionSnapshot {
                    total_duration,
                    page_views,
                    is_returning_visitor,
                },
            )
            .collect())
    }

    /// 热门页面
    pub async fn popular_pages_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.page_view_breakdown(page_view::Column::Page, since, limit)
            .await
    }

    /// 设备类型分布
    pub async fn device_breakdown_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.page_view_breakdown(page_view::Column::DeviceType, since, limit)
            .await
    }

    /// 浏览器分布
    pub async fn browser_breakdown_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.page_view_breakdown(page_view::Column::Browser, since, limit)
            .await
    }

    /// 国家分布
    pub async fn country_breakdown_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.page_view_breakdown(page_view::Column::Country, since, limit)
            .await
    }

    async fn page_view_breakdown(
        &self,
        column: page_view::Column,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        let db = &self.db;

        let rows = retry::with_retry("page_view_breakdown", self.retry_config, || async move {
            page_view::Entity::find()
                .select_only()
                .column_as(column, "label")
                .column_as(page_view::Column::Id.count(), "count")
                .filter(page_view::Column::Timestamp.gte(since))
                .filter(column.is_not_null())
                .group_by(column)
                .order_by_desc(Expr::cust("count"))
                .order_by_asc(Expr::cust("label"))
                .limit(limit)
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(into_label_counts(rows))
    }

    /// 点击最多的元素（element_id 为空的点击不参与排名）
    pub async fn top_clicked_elements_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TopElement>> {
        let db = &self.db;

        let rows = retry::with_retry("top_clicked_elements_since", self.retry_config, || async move {
            click_event::Entity::find()
                .select_only()
                .column(click_event::Column::ElementId)
                .column(click_event::Column::ElementText)
                .column_as(click_event::Column::Id.count(), "count")
                .filter(click_event::Column::Timestamp.gte(since))
                .filter(click_event::Column::ElementId.is_not_null())
                .group_by(click_event::Column::ElementId)
                .group_by(click_event::Column::ElementText)
                .order_by_desc(Expr::cust("count"))
                .order_by_asc(click_event::Column::ElementId)
                .limit(limit)
                .into_model::<ElementCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                row.element_id.map(|element_id| TopElement {
                    element_id,
                    element_text: row.element_text,
                    count: row.count,
                })
            })
            .collect())
    }

    /// 入口页面
    pub async fn entry_pages_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.session_breakdown(user_session::Column::EntryPage, since, limit)
            .await
    }

    /// 退出页面
    pub async fn exit_pages_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.session_breakdown(user_session::Column::ExitPage, since, limit)
            .await
    }

    /// 来源（排除空字符串）
    pub async fn top_referrers_since(
        &self,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        self.session_breakdown(user_session::Column::Referrer, since, limit)
            .await
    }

    async fn session_breakdown(
        &self,
        column: user_session::Column,
        since: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LabelCount>> {
        let db = &self.db;

        let rows = retry::with_retry("session_breakdown", self.retry_config, || async move {
            user_session::Entity::find()
                .select_only()
                .column_as(column, "label")
                .column_as(user_session::Column::Id.count(), "count")
                .filter(user_session::Column::StartTime.gte(since))
                .filter(column.is_not_null())
                .filter(column.ne(""))
                .group_by(column)
                .order_by_desc(Expr::cust("count"))
                .order_by_asc(Expr::cust("label"))
                .limit(limit)
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(into_label_counts(rows))
    }

    /// 窗口内全部页面浏览时间戳（用于按小时分桶）
    pub async fn page_view_timestamps_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let db = &self.db;

        Ok(
            retry::with_retry("page_view_timestamps_since", self.retry_config, || async move {
                page_view::Entity::find()
                    .select_only()
                    .column(page_view::Column::Timestamp)
                    .filter(page_view::Column::Timestamp.gte(since))
                    .into_tuple()
                    .all(db)
                    .await
            })
            .await?,
        )
    }

    /// 窗口内全部点击时间戳（用于按小时分桶）
    pub async fn click_timestamps_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        let db = &self.db;

        Ok(
            retry::with_retry("click_timestamps_since", self.retry_config, || async move {
                click_event::Entity::find()
                    .select_only()
                    .column(click_event::Column::Timestamp)
                    .filter(click_event::Column::Timestamp.gte(since))
                    .into_tuple()
                    .all(db)
                    .await
            })
            .await?,
        )
    }
}
