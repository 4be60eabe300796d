//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::errors::PortfolioError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 信封响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 PortfolioError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 5xx 的内部细节只写日志，不返回给客户端。
pub fn error_from_portfolio(err: &PortfolioError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return error_response(status, ErrorCode::from(err), "Internal server error");
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 在已映射错误码之上指定业务错误码
pub fn error_with_code(err: &PortfolioError, code: ErrorCode) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return error_response(status, code, "Internal server error");
    }
    error_response(status, code, err.message())
}

/// 成功时直接输出 JSON 数据，失败时映射为错误信封
pub fn json_result<T: Serialize>(status: StatusCode, result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::build(status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(data),
        Err(e) => error_from_portfolio(&e),
    }
}
