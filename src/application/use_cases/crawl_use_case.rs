// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    application::dto::crawl_request::CrawlRequestDto,
    domain::{
        models::{
            crawl_target::CrawlTarget,
            proxy_config::validate_proxy_url,
            task::{DomainError, Task},
            theme::ThemeCatalog,
        },
        services::log_sink::{LogLevel, LogSink},
    },
    queue::task_queue::{QueueError, TaskQueue},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::Validate;

#[derive(Error, Debug)]
pub enum CrawlUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// 临时爬取用例
///
/// 校验失败的请求同步拒绝，绝不入队
pub struct CrawlUseCase {
    catalog: Arc<ThemeCatalog>,
    queue: Arc<dyn TaskQueue>,
    log_sink: Arc<LogSink>,
}

impl CrawlUseCase {
    pub fn new(
        catalog: Arc<ThemeCatalog>,
        queue: Arc<dyn TaskQueue>,
        log_sink: Arc<LogSink>,
    ) -> Self {
        Self {
            catalog,
            queue,
            log_sink,
        }
    }

    /// 创建并入队一个 Pending 任务
    ///
    /// # 参数
    ///
    /// * `dto` - 爬取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(Task)` - 已持久化并入队的任务
    /// * `Err(CrawlUseCaseError)` - 请求不合法或入队失败
    pub async fn create_crawl(&self, dto: CrawlRequestDto) -> Result<Task, CrawlUseCaseError> {
        dto.validate()
            .map_err(|e| CrawlUseCaseError::ValidationError(e.to_string()))?;

        let proxy = match dto.proxy.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                validate_proxy_url(url)?;
                Some(url.to_string())
            }
            _ => None,
        };

        let target = CrawlTarget::build(
            &self.catalog,
            &dto.theme_id,
            dto.mode,
            dto.start_page,
            dto.end_page,
        )?;

        let task = self.queue.enqueue(Task::new(target, proxy)).await?;

        self.log_sink.push(
            LogLevel::Info,
            &format!(
                "创建爬取任务 {}: 主题 {}，第{}页到第{}页",
                task.id, task.theme_id, task.start_page, task.end_page
            ),
        );
        info!(task_id = %task.id, theme_id = %task.theme_id, "Crawl task created");
        Ok(task)
    }
}
