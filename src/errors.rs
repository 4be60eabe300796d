use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Serialization(String),
}

impl PortfolioError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PortfolioError::DatabaseConfig(_) => "E001",
            PortfolioError::DatabaseConnection(_) => "E002",
            PortfolioError::DatabaseOperation(_) => "E003",
            PortfolioError::FileOperation(_) => "E004",
            PortfolioError::Validation(_) => "E005",
            PortfolioError::NotFound(_) => "E006",
            PortfolioError::Unauthorized(_) => "E007",
            PortfolioError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PortfolioError::DatabaseConfig(_) => "Database Configuration Error",
            PortfolioError::DatabaseConnection(_) => "Database Connection Error",
            PortfolioError::DatabaseOperation(_) => "Database Operation Error",
            PortfolioError::FileOperation(_) => "File Operation Error",
            PortfolioError::Validation(_) => "Validation Error",
            PortfolioError::NotFound(_) => "Resource Not Found",
            PortfolioError::Unauthorized(_) => "Unauthorized",
            PortfolioError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PortfolioError::DatabaseConfig(msg)
            | PortfolioError::DatabaseConnection(msg)
            | PortfolioError::DatabaseOperation(msg)
            | PortfolioError::FileOperation(msg)
            | PortfolioError::Validation(msg)
            | PortfolioError::NotFound(msg)
            | PortfolioError::Unauthorized(msg)
            | PortfolioError::Serialization(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            PortfolioError::Validation(_) => StatusCode::BAD_REQUEST,
            PortfolioError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出（用于 CLI 与启动日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PortfolioError {}

// 便捷的构造函数
impl PortfolioError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PortfolioError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PortfolioError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PortfolioError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PortfolioError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PortfolioError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PortfolioError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        PortfolioError::Unauthorized(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PortfolioError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for PortfolioError {
    fn from(err: sea_orm::DbErr) -> Self {
        PortfolioError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PortfolioError {
    fn from(err: std::io::Error) -> Self {
        PortfolioError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            PortfolioError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortfolioError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortfolioError::unauthorized("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PortfolioError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = PortfolioError::not_found("Project 7 not found");
        assert_eq!(err.code(), "E006");
        assert_eq!(
            err.to_string(),
            "Resource Not Found: Project 7 not found"
        );
    }

    #[test]
    fn test_from_db_err() {
        let err: PortfolioError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, PortfolioError::DatabaseOperation(_)));
        assert!(err.message().contains("boom"));
    }
}
