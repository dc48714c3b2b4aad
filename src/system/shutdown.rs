use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use crate::deletion::DeletionPipeline;
use crate::storage::Repository;

/// 等待 Ctrl+C，然后执行优雅关闭
pub async fn listen_for_shutdown(
    pipeline: &DeletionPipeline,
    repository: Arc<dyn Repository>,
    drain_timeout: Duration,
) {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining pending deletions..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }

    shutdown(pipeline, repository, drain_timeout).await;
}

/// 先排空删除管道，再关闭存储（内存存储在此 fsync 事件日志）
pub async fn shutdown(
    pipeline: &DeletionPipeline,
    repository: Arc<dyn Repository>,
    drain_timeout: Duration,
) {
    let processed = pipeline.shutdown(drain_timeout).await;
    info!("Deletion pipeline stopped, {} requests processed", processed);

    match repository.close().await {
        Ok(()) => info!("{} storage closed", repository.get_type()),
        Err(e) => error!("Failed to close {} storage: {}", repository.get_type(), e),
    }
}
