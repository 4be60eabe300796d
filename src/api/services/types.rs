//! API 类型定义

use serde::{Deserialize, Serialize};

/// 统一的错误/状态响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 采集接口的成功响应 `{"status":"success"}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// GET /analytics/health 响应
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
}

/// GET /analytics/dashboard 查询参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct DashboardQuery {
    pub period: Option<String>,
}

/// GET /analytics/activity 查询参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ActivityQuery {
    pub limit: Option<u64>,
}

/// GET /health 存储检查
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health 响应
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// 运行秒数
    pub uptime: u64,
    pub storage: HealthStorageCheck,
    pub response_time_ms: u64,
}
