//! Portfolio project entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// JSON array of tech-stack tags
    #[sea_orm(column_type = "Text")]
    pub tech_stack: String,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    /// JSON array of image references
    #[sea_orm(column_type = "Text")]
    pub images: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
