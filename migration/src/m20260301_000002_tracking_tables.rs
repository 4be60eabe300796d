//! 访问统计表迁移
//!
//! 创建三张表：
//! - page_views: 页面浏览日志（只追加）
//! - click_events: 点击事件日志（只追加）
//! - user_sessions: 按 session_id 聚合的会话记录

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PageViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PageViews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PageViews::Page).string_len(512).not_null())
                    .col(ColumnDef::new(PageViews::Referrer).text().null())
                    .col(ColumnDef::new(PageViews::UserAgent).text().null())
                    .col(ColumnDef::new(PageViews::IpAddress).string_len(45).null())
                    .col(
                        ColumnDef::new(PageViews::SessionId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PageViews::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PageViews::Duration).big_integer().null())
                    .col(ColumnDef::new(PageViews::DeviceType).string_len(32).null())
                    .col(ColumnDef::new(PageViews::Browser).string_len(32).null())
                    .col(
                        ColumnDef::new(PageViews::OperatingSystem)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(PageViews::Country).string_len(64).null())
                    .col(ColumnDef::new(PageViews::City).string_len(100).null())
                    .to_owned(),
            )
            .await?;

        // 时间范围查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_views_timestamp")
                    .table(PageViews::Table)
                    .col(PageViews::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_views_session_id")
                    .table(PageViews::Table)
                    .col(PageViews::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClickEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClickEvents::SessionId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickEvents::Page).string_len(512).not_null())
                    .col(
                        ColumnDef::new(ClickEvents::ElementType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickEvents::ElementId).string_len(255).null())
                    .col(ColumnDef::new(ClickEvents::ElementText).text().null())
                    .col(ColumnDef::new(ClickEvents::TargetUrl).text().null())
                    .col(ColumnDef::new(ClickEvents::XPosition).integer().null())
                    .col(ColumnDef::new(ClickEvents::YPosition).integer().null())
                    .col(
                        ColumnDef::new(ClickEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickEvents::UserAgent).text().null())
                    .col(ColumnDef::new(ClickEvents::IpAddress).string_len(45).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_timestamp")
                    .table(ClickEvents::Table)
                    .col(ClickEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_session_id")
                    .table(ClickEvents::Table)
                    .col(ClickEvents::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::SessionId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .col(ColumnDef::new(UserSessions::UserAgent).text().null())
                    .col(
                        ColumnDef::new(UserSessions::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::EndTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::TotalDuration)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::PageViews)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserSessions::Clicks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserSessions::EntryPage)
                            .string_len(512)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::ExitPage)
                            .string_len(512)
                            .null(),
                    )
                    .col(ColumnDef::new(UserSessions::Referrer).text().null())
                    .col(
                        ColumnDef::new(UserSessions::DeviceType)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(UserSessions::Browser).string_len(32).null())
                    .col(
                        ColumnDef::new(UserSessions::OperatingSystem)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(UserSessions::Country).string_len(64).null())
                    .col(ColumnDef::new(UserSessions::City).string_len(100).null())
                    .col(
                        ColumnDef::new(UserSessions::IsReturningVisitor)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UserSessions::PagesVisited).text().not_null())
                    .to_owned(),
            )
            .await?;

        // session_id 全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_sessions_session_id")
                    .table(UserSessions::Table)
                    .col(UserSessions::SessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_sessions_start_time")
                    .table(UserSessions::Table)
                    .col(UserSessions::StartTime)
                    .to_owned(),
            )
            .await?;

        // 回访判断按 IP 查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_sessions_ip_address")
                    .table(UserSessions::Table)
                    .col(UserSessions::IpAddress)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClickEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PageViews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PageViews {
    #[sea_orm(iden = "page_views")]
    Table,
    Id,
    Page,
    Referrer,
    UserAgent,
    IpAddress,
    SessionId,
    Timestamp,
    Duration,
    DeviceType,
    Browser,
    OperatingSystem,
    Country,
    City,
}

#[derive(DeriveIden)]
enum ClickEvents {
    #[sea_orm(iden = "click_events")]
    Table,
    Id,
    SessionId,
    Page,
    ElementType,
    ElementId,
    ElementText,
    TargetUrl,
    XPosition,
    YPosition,
    Timestamp,
    UserAgent,
    IpAddress,
}

#[derive(DeriveIden)]
enum UserSessions {
    #[sea_orm(iden = "user_sessions")]
    Table,
    Id,
    SessionId,
    IpAddress,
    UserAgent,
    StartTime,
    EndTime,
    TotalDuration,
    PageViews,
    Clicks,
    EntryPage,
    ExitPage,
    Referrer,
    DeviceType,
    Browser,
    OperatingSystem,
    Country,
    City,
    IsReturningVisitor,
    PagesVisited,
}
