// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct ActiveExecution {
    cancel: CancellationToken,
    finished: CancellationToken,
}

/// 正在执行的任务登记表
///
/// 执行槽位在把任务切换为 Running 之前登记，执行结束后注销。
/// 取消请求通过每个任务独立的取消令牌带外传递，注销时触发 `finished`
/// 作为执行器已退出的确认。
pub struct ExecutionRegistry {
    root: CancellationToken,
    active: DashMap<Uuid, ActiveExecution>,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            active: DashMap::new(),
        }
    }

    /// 登记任务，返回执行器需要轮询的取消令牌
    pub fn register(&self, task_id: Uuid) -> CancellationToken {
        let cancel = self.root.child_token();
        self.active.insert(
            task_id,
            ActiveExecution {
                cancel: cancel.clone(),
                finished: CancellationToken::new(),
            },
        );
        cancel
    }

    /// 请求取消，返回执行器退出时会被触发的确认令牌
    pub fn cancel(&self, task_id: Uuid) -> Option<CancellationToken> {
        self.active.get(&task_id).map(|entry| {
            entry.cancel.cancel();
            entry.finished.clone()
        })
    }

    /// 注销任务并发出退出确认
    pub fn finish(&self, task_id: Uuid) {
        if let Some((_, execution)) = self.active.remove(&task_id) {
            execution.finished.cancel();
        }
    }

    pub fn is_active(&self, task_id: Uuid) -> bool {
        self.active.contains_key(&task_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 取消所有正在执行的任务
    pub fn cancel_all(&self) {
        self.root.cancel();
    }
}

impl Default for ExecutionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
