// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::execution_registry::ExecutionRegistry;
use crate::domain::services::task_store::TaskStore;
use crate::queue::task_queue::TaskQueue;
use crate::workers::crawl_executor::CrawlExecutor;
use crate::workers::crawl_worker::CrawlWorker;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 工作管理器
///
/// 维护固定数量的执行槽位，槽位占满时任务留在队列中保持 Pending
pub struct WorkerManager {
    queue: Arc<dyn TaskQueue>,
    store: Arc<TaskStore>,
    registry: Arc<ExecutionRegistry>,
    executor: Arc<CrawlExecutor>,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        store: Arc<TaskStore>,
        registry: Arc<ExecutionRegistry>,
        executor: Arc<CrawlExecutor>,
    ) -> Self {
        Self {
            queue,
            store,
            registry,
            executor,
            shutdown: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的槽位数量
    pub fn start_workers(&mut self, count: usize) {
        for worker_id in 0..count {
            let worker = CrawlWorker::new(
                worker_id,
                self.store.clone(),
                self.registry.clone(),
                self.executor.clone(),
            );

            let queue = self.queue.clone();
            let shutdown = self.shutdown.clone();
            let handle = tokio::spawn(async move {
                worker.run(queue, shutdown).await;
            });
            self.handles.push(handle);
        }
        info!("Started {} crawl workers", count);
    }

    /// 关闭工作进程
    ///
    /// 停止取新任务，取消所有运行中的爬取并等待槽位退出
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.shutdown.cancel();
        self.registry.cancel_all();

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Worker terminated abnormally: {}", e);
            }
        }

        info!("Workers shut down successfully");
    }
}
