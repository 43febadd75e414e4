// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::execution_registry::ExecutionRegistry;
use crate::domain::services::task_store::{StoreError, TaskStore};
use crate::queue::task_queue::TaskQueue;
use crate::workers::crawl_executor::{CrawlExecutor, CrawlOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 执行槽位
///
/// 从队列依次取出任务，唯一负责 Pending→Running 的切换并调用执行器
pub struct CrawlWorker {
    worker_id: usize,
    store: Arc<TaskStore>,
    registry: Arc<ExecutionRegistry>,
    executor: Arc<CrawlExecutor>,
}

impl CrawlWorker {
    pub fn new(
        worker_id: usize,
        store: Arc<TaskStore>,
        registry: Arc<ExecutionRegistry>,
        executor: Arc<CrawlExecutor>,
    ) -> Self {
        Self {
            worker_id,
            store,
            registry,
            executor,
        }
    }

    /// 运行槽位循环，直到关闭令牌被取消或队列关闭
    pub async fn run(&self, queue: Arc<dyn TaskQueue>, shutdown: CancellationToken) {
        info!("Crawl worker {} started", self.worker_id);

        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => break,
                next = queue.dequeue() => next,
            };

            match next {
                Some(task_id) => self.process(task_id).await,
                None => break,
            }
        }

        info!("Crawl worker {} stopped", self.worker_id);
    }

    async fn process(&self, task_id: Uuid) {
        let cancel = self.registry.register(task_id);

        let task = match self.store.update_task(task_id, |t| t.start()).await {
            Ok(task) => task,
            Err(StoreError::NotFound(_)) => {
                debug!(task_id = %task_id, "Task removed before it could start");
                self.registry.finish(task_id);
                return;
            }
            Err(StoreError::Domain(e)) => {
                warn!(task_id = %task_id, "Skipping task: {}", e);
                self.registry.finish(task_id);
                return;
            }
            Err(e) => {
                error!(task_id = %task_id, "Failed to start task: {}", e);
                self.registry.finish(task_id);
                return;
            }
        };

        match self.executor.execute(&task, &cancel).await {
            Ok(CrawlOutcome::Completed { found_links }) => {
                info!(task_id = %task_id, found_links, "Task completed");
            }
            Ok(CrawlOutcome::Failed { reason }) => {
                warn!(task_id = %task_id, "Task failed: {}", reason);
            }
            Ok(CrawlOutcome::Cancelled) => {
                info!(task_id = %task_id, "Task cancelled");
            }
            Err(StoreError::NotFound(_)) => {
                debug!(task_id = %task_id, "Task removed while running");
            }
            Err(e) => {
                error!(task_id = %task_id, "Task execution aborted: {}", e);
                let message = e.to_string();
                if let Err(e) = self.store.update_task(task_id, move |t| t.fail(message)).await {
                    error!(task_id = %task_id, "Failed to mark task as failed: {}", e);
                }
            }
        }

        self.registry.finish(task_id);
    }
}
