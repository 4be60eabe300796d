//! Click event log entity (append-only)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "click_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub page: String,
    pub element_type: String,
    pub element_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub element_text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub target_url: Option<String>,
    pub x_position: Option<i32>,
    pub y_position: Option<i32>,
    pub timestamp: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
