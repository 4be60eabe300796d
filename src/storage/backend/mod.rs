//! SeaORM storage backend
//!
//! Database storage for projects and tracking data using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod analytics;
mod connection;
mod converters;
mod projects;
pub mod retry;
mod tracking;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::errors::{PortfolioError, Result};

pub use analytics::{LabelCount, SessionSnapshot, TopElement};
pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(PortfolioError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// 使用默认连接池大小和重试策略连接
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        Self::connect(
            database_url,
            backend_name,
            crate::config::DatabaseConfig::default().pool_size,
            retry::RetryConfig::default(),
        )
        .await
    }

    pub async fn connect(
        database_url: &str,
        backend_name: &str,
        pool_size: u32,
        retry_config: retry::RetryConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(PortfolioError::database_config("database_url is not set"));
        }

        let backend_name = match backend_name {
            "mariadb" => "mysql",
            other => other,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（关闭连接池等场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("portfolio.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("sqlite://data/site.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(
            infer_backend_from_url("postgres://u:p@localhost/site").unwrap(),
            "postgres"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/site").unwrap(),
            "mysql"
        );
        assert!(matches!(
            infer_backend_from_url("redis://localhost"),
            Err(PortfolioError::DatabaseConfig(_))
        ));
    }
}
