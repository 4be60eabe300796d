use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::services::{AnalyticsService, ProjectService, TrackingService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub project_service: Arc<ProjectService>,
    pub tracking_service: Arc<TrackingService>,
    pub analytics_service: Arc<AnalyticsService>,
}

impl StartupContext {
    /// 在已有存储之上组装各个 service
    pub fn from_storage(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        Self {
            project_service: Arc::new(ProjectService::new(storage.clone())),
            tracking_service: Arc::new(TrackingService::new(storage.clone())),
            analytics_service: Arc::new(AnalyticsService::new(
                storage.clone(),
                config.analytics.clone(),
            )),
            storage,
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储连接、迁移和默认项目数据
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let context = StartupContext::from_storage(storage, config);

    if config.seed.enabled {
        let seeded = context
            .project_service
            .seed_if_empty()
            .await
            .context("Failed to seed default projects")?;
        if seeded > 0 {
            info!("Inserted {} default projects", seeded);
        }
    } else {
        debug!("Project seeding disabled");
    }

    if config.api.admin_password.is_empty() {
        warn!("api.admin_password is empty, project write endpoints are open");
    }

    info!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );
    Ok(context)
}
