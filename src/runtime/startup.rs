use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::deletion::DeletionPipeline;
use crate::services::LinkService;
use crate::storage::{Repository, RepositoryFactory};

/// 启动后共享的组件
pub struct StartupContext {
    pub repository: Arc<dyn Repository>,
    pub pipeline: DeletionPipeline,
    pub link_service: LinkService,
    pub drain_timeout: Duration,
}

impl StartupContext {
    /// 排空删除管道并关闭存储
    pub async fn shutdown(&self) {
        crate::system::shutdown(&self.pipeline, self.repository.clone(), self.drain_timeout).await;
    }
}

/// 打开存储（内存存储会先回放事件日志）并启动删除管道
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Preparing storage and deletion pipeline...");

    let repository = RepositoryFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", repository.get_type());

    let pipeline = DeletionPipeline::spawn(repository.clone());
    let link_service = LinkService::new(
        repository.clone(),
        pipeline.queue(),
        config.service.base_url.clone(),
    );

    debug!("Startup finished in {:?}", start_time.elapsed());
    Ok(StartupContext {
        repository,
        pipeline,
        link_service,
        drain_timeout: Duration::from_secs(config.deletion.shutdown_timeout_secs),
    })
}
