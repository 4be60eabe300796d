//! Model ↔ domain conversions
//!
//! Ordered string lists are persisted as JSON array text. A malformed list
//! column decodes to an empty list rather than failing the whole read.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use tracing::warn;

use crate::errors::Result;
use crate::storage::models::{
    ClickEvent, NewClickEvent, NewPageView, PageView, Project, ProjectDraft, UserSession,
};
use migration::entities::{click_event, page_view, project, user_session};

pub fn encode_list(items: &[String]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

pub fn decode_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed list column {:?}: {}", raw, e);
        Vec::new()
    })
}

pub fn model_to_project(model: project::Model) -> Project {
    Project {
        id: model.id,
        title: model.title,
        description: model.description,
        tech_stack: decode_list(&model.tech_stack),
        github_url: model.github_url,
        demo_url: model.demo_url,
        images: decode_list(&model.images),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 构建新项目的 ActiveModel（id 由数据库分配）
pub fn draft_to_new_project(
    draft: &ProjectDraft,
    now: DateTime<Utc>,
) -> Result<project::ActiveModel> {
    Ok(project::ActiveModel {
        id: NotSet,
        title: Set(draft.title.clone()),
        description: Set(draft.description.clone()),
        tech_stack: Set(encode_list(&draft.tech_stack)?),
        github_url: Set(draft.github_url.clone()),
        demo_url: Set(draft.demo_url.clone()),
        images: Set(encode_list(&draft.images)?),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// 构建整体替换用的 ActiveModel（保留 created_at）
pub fn draft_to_project_update(
    id: i64,
    draft: &ProjectDraft,
    now: DateTime<Utc>,
) -> Result<project::ActiveModel> {
    Ok(project::ActiveModel {
        id: Set(id),
        title: Set(draft.title.clone()),
        description: Set(draft.description.clone()),
        tech_stack: Set(encode_list(&draft.tech_stack)?),
        github_url: Set(draft.github_url.clone()),
        demo_url: Set(draft.demo_url.clone()),
        images: Set(encode_list(&draft.images)?),
        created_at: NotSet,
        updated_at: Set(now),
    })
}

pub fn model_to_page_view(model: page_view::Model) -> PageView {
    PageView {
        id: model.id,
        page: model.page,
        referrer: model.referrer,
        user_agent: model.user_agent,
        ip_address: model.ip_address,
        session_id: model.session_id,
        timestamp: model.timestamp,
        duration: model.duration,
        device_type: model.device_type,
        browser: model.browser,
        operating_system: model.operating_system,
        country: model.country,
        city: model.city,
    }
}

pub fn new_page_view_to_active_model(view: &NewPageView) -> page_view::ActiveModel {
    page_view::ActiveModel {
        id: NotSet,
        page: Set(view.page.clone()),
        referrer: Set(view.referrer.clone()),
        user_agent: Set(view.user_agent.clone()),
        ip_address: Set(view.ip_address.clone()),
        session_id: Set(view.session_id.clone()),
        timestamp: Set(view.timestamp),
        duration: Set(view.duration),
        device_type: Set(view.device_type.clone()),
        browser: Set(view.browser.clone()),
        operating_system: Set(view.operating_system.clone()),
        country: Set(view.country.clone()),
        city: Set(view.city.clone()),
    }
}

pub fn model_to_click_event(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        session_id: model.session_id,
        page: model.page,
        element_type: model.element_type,
        element_id: model.element_id,
        element_text: model.element_text,
        target_url: model.target_url,
        x_position: model.x_position,
        y_position: model.y_position,
        timestamp: model.timestamp,
        user_agent: model.user_agent,
        ip_address: model.ip_address,
    }
}

pub fn new_click_event_to_active_model(click: &NewClickEvent) -> click_event::ActiveModel {
    click_event::ActiveModel {
        id: NotSet,
        session_id: Set(click.session_id.clone()),
        page: Set(click.page.clone()),
        element_type: Set(click.element_type.clone()),
        element_id: Set(click.element_id.clone()),
        element_text: Set(click.element_text.clone()),
        target_url: Set(click.target_url.clone()),
        x_position: Set(click.x_position),
        y_position: Set(click.y_position),
        timestamp: Set(click.timestamp),
        user_agent: Set(click.user_agent.clone()),
        ip_address: Set(click.ip_address.clone()),
    }
}

pub fn model_to_session(model: user_session::Model) -> UserSession {
    UserSession {
        id: model.id,
        session_id: model.session_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        start_time: model.start_time,
        end_time: model.end_time,
        total_duration: model.total_duration,
        page_views: model.page_views,
        clicks: model.clicks,
        entry_page: model.entry_page,
        exit_page: model.exit_page,
        referrer: model.referrer,
        device_type: model.device_type,
        browser: model.browser,
        operating_system: model.operating_system,
        country: model.country,
        city: model.city,
        is_returning_visitor: model.is_returning_visitor,
        pages_visited: decode_list(&model.pages_visited),
    }
}

/// 会话转 ActiveModel；`is_new` 时不设置 id
pub fn session_to_active_model(
    session: &UserSession,
    is_new: bool,
) -> Result<user_session::ActiveModel> {
    Ok(user_session::ActiveModel {
        id: if is_new { NotSet } else { Set(session.id) },
        session_id: Set(session.session_id.clone()),
        ip_address: Set(session.ip_address.clone()),
        user_agent: Set(session.user_agent.clone()),
        start_time: Set(session.start_time),
        end_time: Set(session.end_time),
        total_duration: Set(session.total_duration),
        page_views: Set(session.page_views),
        clicks: Set(session.clicks),
        entry_page: Set(session.entry_page.clone()),
        exit_page: Set(session.exit_page.clone()),
        referrer: Set(session.referrer.clone()),
        device_type: Set(session.device_type.clone()),
        browser: Set(session.browser.clone()),
        operating_system: Set(session.operating_system.clone()),
        country: Set(session.country.clone()),
        city: Set(session.city.clone()),
        is_returning_visitor: Set(session.is_returning_visitor),
        pages_visited: Set(encode_list(&session.pages_visited)?),
    })
}
