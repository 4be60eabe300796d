//! Project CRUD operations for SeaOrmStorage

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, TransactionTrait};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{draft_to_new_project, draft_to_project_update, model_to_project};
use super::retry;
use crate::errors::{PortfolioError, Result};
use crate::storage::models::{Project, ProjectDraft};

use migration::entities::project;

impl SeaOrmStorage {
    /// 按 id 升序返回全部项目
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let db = &self.db;

        let models = retry::with_retry("list_projects", self.retry_config, || async move {
            project::Entity::find()
                .order_by_asc(project::Column::Id)
                .all(db)
                .await
        })
        .await?;

        debug!("Loaded {} projects", models.len());
        Ok(models.into_iter().map(model_to_project).collect())
    }

    pub async fn find_project(&self, id: i64) -> Result<Option<Project>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("find_project({})", id),
            self.retry_config,
            || async move { project::Entity::find_by_id(id).one(db).await },
        )
        .await?;

        Ok(model.map(model_to_project))
    }

    pub async fn count_projects(&self) -> Result<u64> {
        let db = &self.db;

        Ok(
            retry::with_retry("count_projects", self.retry_config, || async move {
                project::Entity::find().count(db).await
            })
            .await?,
        )
    }

    pub async fn insert_project(&self, draft: &ProjectDraft) -> Result<Project> {
        let db = &self.db;
        let active_model = draft_to_new_project(draft, Utc::now())?;

        let model = retry::with_retry("insert_project", self.retry_config, || {
            let am = active_model.clone();
            async move { am.insert(db).await }
        })
        .await?;

        info!("Project created: {} ({})", model.id, model.title);
        Ok(model_to_project(model))
    }

    /// 整体替换可写字段；项目不存在时返回 `Ok(None)`
    pub async fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<Option<Project>> {
        let db = &self.db;
        let active_model = draft_to_project_update(id, draft, Utc::now())?;

        let result = retry::with_retry(
            &format!("update_project({})", id),
            self.retry_config,
            || {
                let am = active_model.clone();
                async move { am.update(db).await }
            },
        )
        .await;

        match result {
            Ok(model) => {
                info!("Project updated: {}", id);
                Ok(Some(model_to_project(model)))
            }
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 删除项目；返回是否确实删除了一行
    pub async fn delete_project(&self, id: i64) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("delete_project({})", id),
            self.retry_config,
            || async move { project::Entity::delete_by_id(id).exec(db).await },
        )
        .await?;

        if result.rows_affected > 0 {
            info!("Project deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// 批量插入（单个事务）
    pub async fn insert_projects(&self, drafts: &[ProjectDraft]) -> Result<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let active_models = drafts
            .iter()
            .map(|draft| draft_to_new_project(draft, now))
            .collect::<Result<Vec<_>>>()?;

        let txn = self.db.begin().await.map_err(|e| {
            PortfolioError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        project::Entity::insert_many(active_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                PortfolioError::database_operation(format!("Failed to insert projects: {}", e))
            })?;

        txn.commit().await.map_err(|e| {
            PortfolioError::database_operation(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Batch inserted {} projects", drafts.len());
        Ok(drafts.len())
    }
}
