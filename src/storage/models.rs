use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 作品集项目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建/更新项目时的可写字段
///
/// 客户端传入的 id 会被忽略。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub images: Vec<String>,
}

/// 页面浏览记录（只追加）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub id: i64,
    pub page: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Option<i64>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub operating_system: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// 待写入的页面浏览记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPageView {
    pub page: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Option<i64>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub operating_system: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// 点击事件记录（只追加）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub id: i64,
    pub session_id: String,
    pub page: String,
    pub element_type: String,
    pub element_id: Option<String>,
    pub element_text: Option<String>,
    pub target_url: Option<String>,
    pub x_position: Option<i32>,
    pub y_position: Option<i32>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// 待写入的点击事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClickEvent {
    pub session_id: String,
    pub page: String,
    pub element_type: String,
    pub element_id: Option<String>,
    pub element_text: Option<String>,
    pub target_url: Option<String>,
    pub x_position: Option<i32>,
    pub y_position: Option<i32>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// 访客会话
///
/// 首次页面浏览时创建，之后每次浏览/点击都会更新。`id` 由存储层在插入时分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: i64,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_duration: Option<i64>,
    pub page_views: i32,
    pub clicks: i32,
    pub entry_page: Option<String>,
    pub exit_page: Option<String>,
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub operating_system: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub is_returning_visitor: bool,
    pub pages_visited: Vec<String>,
}

impl UserSession {
    /// 记录一次页面访问（已有会话）
    pub fn record_page_view(&mut self, page: &str, at: DateTime<Utc>) {
        self.page_views += 1;
        self.exit_page = Some(page.to_string());
        if !self.pages_visited.iter().any(|p| p == page) {
            self.pages_visited.push(page.to_string());
        }
        self.touch(at);
    }

    /// 记录一次点击
    pub fn record_click(&mut self, at: DateTime<Utc>) {
        self.clicks += 1;
        self.touch(at);
    }

    /// 推进结束时间并重新计算会话时长（秒）
    fn touch(&mut self, at: DateTime<Utc>) {
        let end = self.end_time.map_or(at, |prev| prev.max(at));
        self.end_time = Some(end);
        self.total_duration = Some((end - self.start_time).num_seconds().max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_session(start: DateTime<Utc>) -> UserSession {
        UserSession {
            id: 1,
            session_id: "s-1".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: None,
            start_time: start,
            end_time: Some(start),
            total_duration: Some(0),
            page_views: 1,
            clicks: 0,
            entry_page: Some("/".to_string()),
            exit_page: None,
            referrer: None,
            device_type: None,
            browser: None,
            operating_system: None,
            country: None,
            city: None,
            is_returning_visitor: false,
            pages_visited: vec!["/".to_string()],
        }
    }

    #[test]
    fn test_record_page_view_keeps_pages_distinct() {
        let start = Utc::now();
        let mut session = new_session(start);

        session.record_page_view("/projects", start + Duration::seconds(10));
        session.record_page_view("/projects", start + Duration::seconds(20));
        session.record_page_view("/", start + Duration::seconds(30));

        assert_eq!(session.page_views, 4);
        assert_eq!(session.exit_page.as_deref(), Some("/"));
        assert_eq!(session.pages_visited, vec!["/", "/projects"]);
        assert_eq!(session.total_duration, Some(30));
    }

    #[test]
    fn test_record_click_does_not_rewind_end_time() {
        let start = Utc::now();
        let mut session = new_session(start);
        session.record_page_view("/about", start + Duration::seconds(60));

        // 乱序到达的旧事件不应缩短会话
        session.record_click(start + Duration::seconds(5));

        assert_eq!(session.clicks, 1);
        assert_eq!(session.end_time, Some(start + Duration::seconds(60)));
        assert_eq!(session.total_duration, Some(60));
    }

    #[test]
    fn test_project_draft_accepts_partial_json() {
        let draft: ProjectDraft =
            serde_json::from_str(r#"{"title":"Demo","techStack":["Rust"]}"#).unwrap();
        assert_eq!(draft.title, "Demo");
        assert_eq!(draft.tech_stack, vec!["Rust"]);
        assert!(draft.images.is_empty());
        assert!(draft.github_url.is_none());
    }
}
