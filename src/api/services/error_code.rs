//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::PortfolioError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 项目错误
/// - 6000-6199: 统计采集 / 查询错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 项目错误 3000-3099
    ProjectNotFound = 3000,
    ProjectDatabaseError = 3005,

    // 采集错误 6000-6099
    TrackingInvalidPayload = 6000,
    TrackingFailed = 6001,

    // 查询错误 6100-6199
    AnalyticsQueryFailed = 6100,
}

impl From<&PortfolioError> for ErrorCode {
    fn from(err: &PortfolioError) -> Self {
        match err {
            PortfolioError::Validation(_) => ErrorCode::BadRequest,
            PortfolioError::NotFound(_) => ErrorCode::NotFound,
            PortfolioError::Unauthorized(_) => ErrorCode::Unauthorized,
            PortfolioError::DatabaseConfig(_)
            | PortfolioError::DatabaseConnection(_)
            | PortfolioError::DatabaseOperation(_)
            | PortfolioError::FileOperation(_)
            | PortfolioError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
