//! Asynchronous deletion pipeline
//!
//! 调用方把删除请求放进无界队列后立即返回，单个后台任务按 FIFO 顺序
//! 调用 `Repository::delete_batch`。删除是最终一致的。

mod worker;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::errors::{LinkvaultError, Result};
use crate::storage::{DeletionRequest, Repository};
use worker::Counters;

/// 生产端句柄，可任意克隆
#[derive(Clone)]
pub struct DeletionQueue {
    tx: mpsc::UnboundedSender<DeletionRequest>,
    counters: Arc<Counters>,
}

impl DeletionQueue {
    /// 入队，不等待删除完成；管道关闭后返回 `PipelineClosed`
    pub fn enqueue(&self, request: DeletionRequest) -> Result<()> {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.tx.send(request) {
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(LinkvaultError::pipeline_closed(format!(
                "删除队列已关闭，丢弃 {} 个短链接的删除请求",
                e.0.short_ids.len()
            )));
        }
        Ok(())
    }

    /// 已入队但尚未处理的请求数
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct DeletionPipeline {
    queue: DeletionQueue,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeletionPipeline {
    /// 启动消费任务，必须在 tokio 运行时内调用
    pub fn spawn(repository: Arc<dyn Repository>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(Counters::default());

        let handle = tokio::spawn(worker::run(
            repository,
            rx,
            shutdown_rx,
            counters.clone(),
        ));

        Self {
            queue: DeletionQueue { tx, counters },
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn queue(&self) -> DeletionQueue {
        self.queue.clone()
    }

    pub fn enqueue(&self, request: DeletionRequest) -> Result<()> {
        self.queue.enqueue(request)
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// 已处理（无论成功失败）的请求数
    pub fn processed(&self) -> usize {
        self.queue.counters.processed.load(Ordering::SeqCst)
    }

    /// 停止接收新请求，在 `timeout` 内处理完已缓冲的请求
    ///
    /// 返回处理过的请求总数。超时后中止消费任务，剩余请求丢弃。
    pub async fn shutdown(&self, timeout: Duration) -> usize {
        let handle = self.handle.lock().take();
        let Some(mut handle) = handle else {
            return self.processed();
        };

        let backlog = self.pending();
        info!("Draining deletion pipeline ({} pending)", backlog);
        let _ = self.shutdown_tx.send(true);

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Deletion worker terminated abnormally: {}", e),
            Err(_) => {
                handle.abort();
                warn!(
                    "Deletion pipeline drain timed out after {:?}, {} requests dropped",
                    timeout,
                    self.pending()
                );
            }
        }

        self.processed()
    }
}

impl Drop for DeletionPipeline {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            let _ = self.shutdown_tx.send(true);
            drop(handle);
        }
    }
}
