//! Service layer for business logic
//!
//! Shared by the HTTP handlers and the startup code; every service holds an
//! explicit storage handle.

mod analytics_service;
mod project_service;
mod tracking_service;
pub mod user_agent;

pub use analytics_service::*;
pub use project_service::*;
pub use tracking_service::*;
pub use user_agent::{ClientInfo, classify};
