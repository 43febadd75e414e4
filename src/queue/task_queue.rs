// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use crate::domain::services::task_store::{StoreError, TaskStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 存储错误
    #[error(transparent)]
    Store(#[from] StoreError),

    /// 队列已关闭
    #[error("Queue closed")]
    Closed,
}

/// 任务队列特质
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 持久化任务并入队
    async fn enqueue(&self, task: Task) -> Result<Task, QueueError>;

    /// 重新入队一个已持久化的 Pending 任务
    async fn requeue(&self, task_id: Uuid) -> Result<(), QueueError>;

    /// 等待下一个任务ID，队列关闭时返回 `None`
    async fn dequeue(&self) -> Option<Uuid>;

    /// 排队中的任务数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    async fn enqueue(&self, task: Task) -> Result<Task, QueueError> {
        (**self).enqueue(task).await
    }

    async fn requeue(&self, task_id: Uuid) -> Result<(), QueueError> {
        (**self).requeue(task_id).await
    }

    async fn dequeue(&self) -> Option<Uuid> {
        (**self).dequeue().await
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// 进程内 FIFO 任务队列
///
/// 任务记录由 [`TaskStore`] 持久化，队列只保存ID
pub struct InMemoryTaskQueue {
    store: Arc<TaskStore>,
    sender: mpsc::UnboundedSender<Uuid>,
    receiver: Mutex<mpsc::UnboundedReceiver<Uuid>>,
    depth: AtomicUsize,
}

impl InMemoryTaskQueue {
    pub fn new(store: Arc<TaskStore>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            store,
            sender,
            receiver: Mutex::new(receiver),
            depth: AtomicUsize::new(0),
        }
    }

    fn push(&self, task_id: Uuid) -> Result<(), QueueError> {
        self.sender.send(task_id).map_err(|_| QueueError::Closed)?;
        self.depth.fetch_add(1, Ordering::SeqCst);
        debug!(task_id = %task_id, "Task enqueued");
        Ok(())
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, task: Task) -> Result<Task, QueueError> {
        let task = self.store.create_task(task).await?;
        self.push(task.id)?;
        Ok(task)
    }

    async fn requeue(&self, task_id: Uuid) -> Result<(), QueueError> {
        self.push(task_id)
    }

    async fn dequeue(&self) -> Option<Uuid> {
        // 接收端加锁，多个槽位按到达顺序依次取走
        let mut receiver = self.receiver.lock().await;
        let task_id = receiver.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(task_id)
    }

    fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}
