//! API 路由配置
//!
//! `/api` 下按资源拆分：`/projects` 与 `/analytics`。

use actix_web::{HttpRequest, error, http::StatusCode, web};

use crate::api::middleware::WriteGuard;

use super::analytics::analytics_routes;
use super::error_code::ErrorCode;
use super::helpers::error_response;
use super::projects::projects_routes;

/// 请求体上限
const MAX_JSON_BODY: usize = 256 * 1024;

/// JSON 解析失败时返回统一的错误信封
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY)
        .error_handler(|err, _req: &HttpRequest| {
            let message = format!("Invalid JSON body: {}", err);
            let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
            error::InternalError::from_response(err, response).into()
        })
}

/// `/api` 作用域
///
/// 写操作经过 `WriteGuard`；采集接口不做认证。
pub fn api_routes(write_guard: WriteGuard) -> actix_web::Scope {
    web::scope("/api")
        .app_data(json_config())
        .service(projects_routes().wrap(write_guard))
        .service(analytics_routes())
}
