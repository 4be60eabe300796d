pub mod click_event;
pub mod page_view;
pub mod project;
pub mod user_session;

pub use click_event::Entity as ClickEventEntity;
pub use page_view::Entity as PageViewEntity;
pub use project::Entity as ProjectEntity;
pub use user_session::Entity as UserSessionEntity;
