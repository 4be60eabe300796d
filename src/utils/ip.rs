//! 客户端 IP 提取
//!
//! 依次检查常见的代理转发请求头，取第一个有效值的第一段；
//! 都没有时退回到 TCP 连接的对端地址。

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;

/// 按优先级排列的转发请求头
pub const FORWARDED_HEADERS: [&str; 10] = [
    "X-Forwarded-For",
    "X-Real-IP",
    "Proxy-Client-IP",
    "WL-Proxy-Client-IP",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_X_FORWARDED",
    "HTTP_X_CLUSTER_CLIENT_IP",
    "HTTP_CLIENT_IP",
    "HTTP_FORWARDED_FOR",
    "HTTP_FORWARDED",
];

/// 从转发请求头中取客户端 IP
///
/// 空值和 `unknown`（不区分大小写）视为缺失；逗号分隔时取第一段。
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    FORWARDED_HEADERS.iter().find_map(|name| {
        let value = headers.get(*name)?.to_str().ok()?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
            return None;
        }
        let first = value.split(',').next()?.trim();
        if first.is_empty() {
            return None;
        }
        trace!("Client IP from {}: {}", name, first);
        Some(first.to_string())
    })
}

/// 请求的客户端 IP：转发头优先，其次对端地址
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_forwarded_ip_from_headers(req.headers())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}
