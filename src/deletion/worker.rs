use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::storage::{DeletionRequest, Repository};

/// 消费端共享的计数
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub pending: AtomicUsize,
    pub processed: AtomicUsize,
}

/// 唯一的消费循环：按入队顺序逐个执行删除
///
/// 收到关闭信号后关闭接收端，已缓冲的请求继续处理完再退出。
pub(crate) async fn run(
    repository: Arc<dyn Repository>,
    mut rx: mpsc::UnboundedReceiver<DeletionRequest>,
    mut shutdown: watch::Receiver<bool>,
    counters: Arc<Counters>,
) {
    debug!("Deletion worker started");

    loop {
        tokio::select! {
            biased;
            request = rx.recv() => match request {
                Some(request) => apply(repository.as_ref(), request, &counters).await,
                None => break,
            },
            _ = shutdown.changed() => {
                rx.close();
                while let Some(request) = rx.recv().await {
                    apply(repository.as_ref(), request, &counters).await;
                }
                break;
            }
        }
    }

    info!(
        "Deletion worker stopped after {} requests",
        counters.processed.load(Ordering::SeqCst)
    );
}

async fn apply(repository: &dyn Repository, request: DeletionRequest, counters: &Counters) {
    counters.pending.fetch_sub(1, Ordering::SeqCst);

    match repository.delete_batch(&request).await {
        Ok(deleted) => info!(
            "Deleted {} of {} requested URLs for {}",
            deleted,
            request.short_ids.len(),
            request.owner_id
        ),
        Err(e) => error!(
            "Failed to delete {} URLs for {}: {}",
            request.short_ids.len(),
            request.owner_id,
            e
        ),
    }

    counters.processed.fetch_add(1, Ordering::SeqCst);
}
