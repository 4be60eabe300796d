use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{error, info, trace};

use crate::storage::SeaOrmStorage;

use super::error_code::ErrorCode;
use super::types::{ApiResponse, HealthResponse, HealthStorageCheck};

/// 存储探测超时
const STORAGE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// Health Service
///
/// 直接调用 storage 方法，不经过业务 service。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = storage.backend_name().to_string();

        // 只查 count，不加载全表
        let storage_status =
            match tokio::time::timeout(STORAGE_PROBE_TIMEOUT, storage.count_projects()).await {
                Ok(Ok(count)) => {
                    trace!("Storage health check passed, {} projects found", count);
                    HealthStorageCheck {
                        status: "healthy".to_string(),
                        backend,
                        projects_count: Some(count),
                        error: None,
                    }
                }
                Ok(Err(e)) => {
                    error!("Storage health check failed: {}", e);
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        projects_count: None,
                        error: Some(format!("database error: {}", e.message())),
                    }
                }
                Err(_) => {
                    error!("Storage health check timeout");
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        projects_count: None,
                        error: Some("timeout".to_string()),
                    }
                }
            };

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = storage_status.status == "healthy";

        let health_data = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            storage: storage_status,
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        let (status, code, message) = if is_healthy {
            (StatusCode::OK, ErrorCode::Success, "OK")
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Service Unavailable",
            )
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            health_data.status,
            uptime
        );

        HttpResponse::build(status).json(ApiResponse {
            code: code as i32,
            message: message.to_string(),
            data: Some(health_data),
        })
    }

    /// 存活探针，不访问存储
    pub async fn liveness_check() -> impl Responder {
        HttpResponse::NoContent().finish()
    }
}

/// 健康检查路由 `/health`
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
