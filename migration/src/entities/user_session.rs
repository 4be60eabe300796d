//! Visitor session entity, keyed by the client-supplied session id

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub session_id: String,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: Option<DateTimeUtc>,
    /// Seconds between start_time and end_time
    pub total_duration: Option<i64>,
    pub page_views: i32,
    pub clicks: i32,
    pub entry_page: Option<String>,
    pub exit_page: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub operating_system: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub is_returning_visitor: bool,
    /// JSON array of distinct pages, in first-visit order
    #[sea_orm(column_type = "Text")]
    pub pages_visited: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
