pub mod analytics;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod projects;
pub mod routes;
pub mod types;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{error_from_portfolio, error_response, json_response};
pub use routes::{api_routes, json_config};
pub use types::*;
