//! Page view, click and session persistence for SeaOrmStorage

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::trace;

use super::SeaOrmStorage;
use super::converters::{
    model_to_click_event, model_to_page_view, model_to_session, new_click_event_to_active_model,
    new_page_view_to_active_model, session_to_active_model,
};
use super::retry;
use crate::errors::Result;
use crate::storage::models::{ClickEvent, NewClickEvent, NewPageView, PageView, UserSession};

use migration::entities::{click_event, page_view, user_session};

impl SeaOrmStorage {
    pub async fn insert_page_view(&self, view: &NewPageView) -> Result<PageView> {
        let db = &self.db;
        let active_model = new_page_view_to_active_model(view);

        let model = retry::with_retry("insert_page_view", self.retry_config, || {
            let am = active_model.clone();
            async move { am.insert(db).await }
        })
        .await?;

        trace!("Page view {} stored for session {}", model.id, model.session_id);
        Ok(model_to_page_view(model))
    }

    pub async fn insert_click_event(&self, click: &NewClickEvent) -> Result<ClickEvent> {
        let db = &self.db;
        let active_model = new_click_event_to_active_model(click);

        let model = retry::with_retry("insert_click_event", self.retry_config, || {
            let am = active_model.clone();
            async move { am.insert(db).await }
        })
        .await?;

        trace!("Click {} stored for session {}", model.id, model.session_id);
        Ok(model_to_click_event(model))
    }

    pub async fn find_session(&self, session_id: &str) -> Result<Option<UserSession>> {
        let db = &self.db;

        let model = retry::with_retry("find_session", self.retry_config, || async move {
            user_session::Entity::find()
                .filter(user_session::Column::SessionId.eq(session_id))
                .one(db)
                .await
        })
        .await?;

        Ok(model.map(model_to_session))
    }

    /// 是否已有来自同一 IP 的会话（回访判断）
    pub async fn has_session_for_ip(&self, ip_address: &str) -> Result<bool> {
        let db = &self.db;

        let existing = retry::with_retry("has_session_for_ip", self.retry_config, || async move {
            user_session::Entity::find()
                .filter(user_session::Column::IpAddress.eq(ip_address))
                .one(db)
                .await
        })
        .await?;

        Ok(existing.is_some())
    }

    /// 插入新会话；session_id 冲突时返回数据库错误
    pub async fn insert_session(&self, session: &UserSession) -> Result<UserSession> {
        let db = &self.db;
        let active_model = session_to_active_model(session, true)?;

        let model = retry::with_retry("insert_session", self.retry_config, || {
            let am = active_model.clone();
            async move { am.insert(db).await }
        })
        .await?;

        Ok(model_to_session(model))
    }

    /// 整行写回（last-write-wins）
    pub async fn save_session(&self, session: &UserSession) -> Result<UserSession> {
        let db = &self.db;
        let active_model = session_to_active_model(session, false)?;

        let model = retry::with_retry("save_session", self.retry_config, || {
            let am = active_model.clone();
            async move { am.update(db).await }
        })
        .await?;

        Ok(model_to_session(model))
    }

    /// 最近的页面浏览，按时间倒序
    pub async fn recent_page_views(&self, limit: u64) -> Result<Vec<PageView>> {
        let db = &self.db;

        let models = retry::with_retry("recent_page_views", self.retry_config, || async move {
            page_view::Entity::find()
                .order_by_desc(page_view::Column::Timestamp)
                .order_by_desc(page_view::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;
        Ok(models.into_iter().map(model_to_page_view).collect())
    }

    /// 最近的点击，按时间倒序
    pub async fn recent_click_events(&self, limit: u64) -> Result<Vec<ClickEvent>> {
        let db = &self.db;

        let models = retry::with_retry("recent_click_events", self.retry_config, || async move {
            click_event::Entity::find()
                .order_by_desc(click_event::Column::Timestamp)
                .order_by_desc(click_event::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;
        Ok(models.into_iter().map(model_to_click_event).collect())
    }
}
