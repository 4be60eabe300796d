//! Project management service
//!
//! Thin layer over the storage CRUD calls that turns a missing row into a
//! structured `NotFound` error and seeds the default project list.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{PortfolioError, Result};
use crate::storage::{Project, ProjectDraft, SeaOrmStorage};

/// 内置的默认项目列表
const SEED_PROJECTS: &str = include_str!("../../assets/seed_projects.json");

pub struct ProjectService {
    storage: Arc<SeaOrmStorage>,
}

impl ProjectService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        self.storage.list_projects().await
    }

    pub async fn get(&self, id: i64) -> Result<Project> {
        self.storage
            .find_project(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// 新建项目，客户端传入的 id 不参与
    pub async fn create(&self, draft: ProjectDraft) -> Result<Project> {
        self.storage.insert_project(&draft).await
    }

    /// 替换项目的全部可写字段
    pub async fn update(&self, id: i64, draft: ProjectDraft) -> Result<Project> {
        self.storage
            .update_project(id, &draft)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.storage.delete_project(id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    /// 项目表为空时写入默认项目，返回写入条数
    pub async fn seed_if_empty(&self) -> Result<usize> {
        let existing = self.storage.count_projects().await?;
        if existing > 0 {
            debug!("Skipping project seed, {} projects present", existing);
            return Ok(0);
        }

        let drafts = default_projects()?;
        let inserted = self.storage.insert_projects(&drafts).await?;
        info!("Seeded {} default projects", inserted);
        Ok(inserted)
    }
}

/// 解析内置的默认项目列表
pub fn default_projects() -> Result<Vec<ProjectDraft>> {
    serde_json::from_str(SEED_PROJECTS).map_err(|e| {
        PortfolioError::serialization(format!("Invalid bundled seed projects: {}", e))
    })
}

fn not_found(id: i64) -> PortfolioError {
    PortfolioError::not_found(format!("Project {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projects_parse() {
        let projects = default_projects().unwrap();
        assert_eq!(projects.len(), 6);
        assert!(projects.iter().all(|p| !p.title.is_empty()));
        assert!(projects.iter().all(|p| !p.tech_stack.is_empty()));
        assert_eq!(projects[0].title, "AI Portfolio Assistant");
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found(42);
        assert!(matches!(err, PortfolioError::NotFound(_)));
        assert_eq!(err.message(), "Project 42 not found");
    }
}
