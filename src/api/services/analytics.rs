//! 访问统计端点：事件采集、看板、最近活动

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::trace;

use crate::config::AnalyticsConfig;
use crate::errors::PortfolioError;
use crate::services::{
    AnalyticsService, ClickRequest, PageViewRequest, Period, RequestMeta, TrackingService,
};
use crate::utils::extract_client_ip;

use super::error_code::ErrorCode;
use super::helpers::error_with_code;
use super::types::{ActivityQuery, DashboardQuery, ServiceStatus, StatusResponse};

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// UA 只在缺失时为 None，空串照常参与分类
fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

/// 从请求头收集来源、UA、客户端 IP 和国家代码
pub fn request_meta(req: &HttpRequest, settings: &AnalyticsConfig) -> RequestMeta {
    RequestMeta {
        referrer: header_value(req, "Referer"),
        user_agent: user_agent(req),
        ip_address: extract_client_ip(req),
        country: header_value(req, &settings.country_header),
    }
}

fn tracking_error(err: &PortfolioError) -> HttpResponse {
    let code = match err {
        PortfolioError::Validation(_) => ErrorCode::TrackingInvalidPayload,
        _ => ErrorCode::TrackingFailed,
    };
    error_with_code(err, code)
}

/// POST /analytics/track/pageview
pub async fn track_page_view(
    req: HttpRequest,
    body: web::Json<PageViewRequest>,
    service: web::Data<Arc<TrackingService>>,
    settings: web::Data<AnalyticsConfig>,
) -> impl Responder {
    let meta = request_meta(&req, &settings);
    match service.record_page_view(body.into_inner(), meta).await {
        Ok(_) => HttpResponse::Ok().json(StatusResponse::success()),
        Err(e) => tracking_error(&e),
    }
}

/// POST /analytics/track/click
pub async fn track_click(
    req: HttpRequest,
    body: web::Json<ClickRequest>,
    service: web::Data<Arc<TrackingService>>,
    settings: web::Data<AnalyticsConfig>,
) -> impl Responder {
    let meta = request_meta(&req, &settings);
    match service.record_click(body.into_inner(), meta).await {
        Ok(_) => HttpResponse::Ok().json(StatusResponse::success()),
        Err(e) => tracking_error(&e),
    }
}

/// GET /analytics/dashboard?period=
pub async fn get_dashboard(
    query: web::Query<DashboardQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> impl Responder {
    let period = Period::parse(query.period.as_deref());
    trace!("API: dashboard for period {}", period);
    match service.get_dashboard_stats(period).await {
        Ok(stats) => HttpResponse::build(StatusCode::OK).json(stats),
        Err(e) => error_with_code(&e, ErrorCode::AnalyticsQueryFailed),
    }
}

/// GET /analytics/activity?limit=
pub async fn get_activity(
    query: web::Query<ActivityQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> impl Responder {
    match service.get_recent_activity(query.limit).await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => error_with_code(&e, ErrorCode::AnalyticsQueryFailed),
    }
}

/// GET /analytics/health
pub async fn analytics_health() -> impl Responder {
    HttpResponse::Ok().json(ServiceStatus {
        status: "healthy".to_string(),
        service: "analytics".to_string(),
    })
}

/// 统计路由 `/analytics`
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/track/pageview", web::post().to(track_page_view))
        .route("/track/click", web::post().to(track_click))
        .route("/dashboard", web::get().to(get_dashboard))
        .route("/activity", web::get().to(get_activity))
        .route("/health", web::get().to(analytics_health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_request_meta_reads_headers() {
        let req = TestRequest::default()
            .insert_header(("Referer", "https://example.com/"))
            .insert_header(("User-Agent", "curl/8.4.0"))
            .insert_header(("X-Forwarded-For", "203.0.113.5"))
            .insert_header(("CF-IPCountry", "DE"))
            .to_http_request();

        let meta = request_meta(&req, &AnalyticsConfig::default());
        assert_eq!(meta.referrer.as_deref(), Some("https://example.com/"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.4.0"));
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.5"));
        assert_eq!(meta.country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_request_meta_custom_country_header() {
        let req = TestRequest::default()
            .insert_header(("X-Geo-Country", "JP"))
            .insert_header(("CF-IPCountry", "DE"))
            .to_http_request();
        let settings = AnalyticsConfig {
            country_header: "X-Geo-Country".to_string(),
            ..AnalyticsConfig::default()
        };

        let meta = request_meta(&req, &settings);
        assert_eq!(meta.country.as_deref(), Some("JP"));
        assert_eq!(meta.user_agent, None);
    }

    #[test]
    fn test_request_meta_keeps_empty_user_agent() {
        let req = TestRequest::default()
            .insert_header(("User-Agent", ""))
            .insert_header(("Referer", ""))
            .to_http_request();

        let meta = request_meta(&req, &AnalyticsConfig::default());
        assert_eq!(meta.user_agent.as_deref(), Some(""));
        assert_eq!(meta.referrer, None);
    }
}
