//! Page view and click collection with session stitching
//!
//! Every accepted event is appended to its log table first; the visitor's
//! session row is then created or updated from it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::{PortfolioError, Result};
use crate::storage::{NewClickEvent, NewPageView, SeaOrmStorage, UserSession};

use super::user_agent::{self, ClientInfo};

/// 从 HTTP 请求头中提取的元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
}

/// POST /track/pageview 请求体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewRequest {
    pub page: Option<String>,
    pub session_id: Option<String>,
    /// 停留时长（秒）
    pub duration: Option<i64>,
}

/// POST /track/click 请求体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    pub session_id: Option<String>,
    pub page: Option<String>,
    pub element_type: Option<String>,
    pub element_id: Option<String>,
    pub element_text: Option<String>,
    pub target_url: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// 会话变更结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Created(UserSession),
    Updated(UserSession),
    /// 点击事件找不到会话时不新建
    Missing,
}

pub struct TrackingService {
    storage: Arc<SeaOrmStorage>,
}

impl TrackingService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 记录页面浏览，并创建或推进对应会话
    pub async fn record_page_view(
        &self,
        request: PageViewRequest,
        meta: RequestMeta,
    ) -> Result<SessionUpdate> {
        let (Some(page), Some(session_id)) = (
            non_blank(request.page),
            non_blank(request.session_id),
        ) else {
            return Err(PortfolioError::validation("Page and sessionId are required"));
        };

        let now = Utc::now();
        let client = user_agent::classify(meta.user_agent.as_deref());
        let (device_type, browser, operating_system) = client_labels(client);

        let view = NewPageView {
            page: page.clone(),
            referrer: meta.referrer.clone(),
            user_agent: meta.user_agent.clone(),
            ip_address: meta.ip_address.clone(),
            session_id: session_id.clone(),
            timestamp: now,
            duration: request.duration.filter(|d| *d >= 0),
            device_type,
            browser,
            operating_system,
            country: meta.country.clone(),
            city: None,
        };
        self.storage.insert_page_view(&view).await?;

        debug!("Page view recorded: session={}, page={}", session_id, page);

        if let Some(mut session) = self.storage.find_session(&session_id).await? {
            session.record_page_view(&page, now);
            let session = self.storage.save_session(&session).await?;
            return Ok(SessionUpdate::Updated(session));
        }

        let is_returning = match meta.ip_address.as_deref() {
            Some(ip) => self.storage.has_session_for_ip(ip).await?,
            None => false,
        };
        let session = new_session(&session_id, &page, &meta, client, is_returning, now);

        match self.storage.insert_session(&session).await {
            Ok(created) => {
                info!(
                    "Session started: {} (returning: {})",
                    created.session_id, created.is_returning_visitor
                );
                Ok(SessionUpdate::Created(created))
            }
            Err(insert_err) => {
                // 并发的首个请求可能已抢先插入同一 session_id
                let Some(mut existing) = self.storage.find_session(&session_id).await? else {
                    return Err(insert_err);
                };
                warn!(
                    "Session {} was created concurrently, applying page view to it",
                    session_id
                );
                existing.record_page_view(&page, now);
                let session = self.storage.save_session(&existing).await?;
                Ok(SessionUpdate::Updated(session))
            }
        }
    }

    /// 记录点击；已有会话时累加点击数
    pub async fn record_click(
        &self,
        request: ClickRequest,
        meta: RequestMeta,
    ) -> Result<SessionUpdate> {
        let (Some(session_id), Some(page), Some(element_type)) = (
            non_blank(request.session_id),
            non_blank(request.page),
            non_blank(request.element_type),
        ) else {
            return Err(PortfolioError::validation(
                "SessionId, page, and elementType are required",
            ));
        };

        let now = Utc::now();
        let click = NewClickEvent {
            session_id: session_id.clone(),
            page,
            element_type,
            element_id: request.element_id,
            element_text: request.element_text,
            target_url: request.target_url,
            x_position: request.x.map(to_coordinate),
            y_position: request.y.map(to_coordinate),
            timestamp: now,
            user_agent: meta.user_agent,
            ip_address: meta.ip_address,
        };
        self.storage.insert_click_event(&click).await?;

        debug!(
            "Click recorded: session={}, element={}",
            session_id, click.element_type
        );

        match self.storage.find_session(&session_id).await? {
            Some(mut session) => {
                session.record_click(now);
                let session = self.storage.save_session(&session).await?;
                Ok(SessionUpdate::Updated(session))
            }
            None => {
                debug!("Click for unknown session {}, no session created", session_id);
                Ok(SessionUpdate::Missing)
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_coordinate(value: f64) -> i32 {
    value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

fn client_labels(client: Option<ClientInfo>) -> (Option<String>, Option<String>, Option<String>) {
    match client {
        Some(info) => (
            Some(info.device_label()),
            Some(info.browser_label()),
            Some(info.os_label()),
        ),
        None => (None, None, None),
    }
}

fn new_session(
    session_id: &str,
    page: &str,
    meta: &RequestMeta,
    client: Option<ClientInfo>,
    is_returning: bool,
    now: DateTime<Utc>,
) -> UserSession {
    let (device_type, browser, operating_system) = client_labels(client);
    UserSession {
        id: 0,
        session_id: session_id.to_string(),
        ip_address: meta.ip_address.clone(),
        user_agent: meta.user_agent.clone(),
        start_time: now,
        end_time: Some(now),
        total_duration: Some(0),
        page_views: 1,
        clicks: 0,
        entry_page: Some(page.to_string()),
        exit_page: None,
        referrer: meta.referrer.clone(),
        device_type,
        browser,
        operating_system,
        country: meta.country.clone(),
        city: None,
        is_returning_visitor: is_returning,
        pages_visited: vec![page.to_string()],
    }
}
