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

use crate::domain::models::crawl_target::CrawlMode;
use crate::domain::models::proxy_config::validate_proxy_url;
use crate::domain::models::task::Task;
use crate::domain::models::theme::ThemeCatalog;
use crate::domain::repositories::storage_repository::{result_key, StorageRepository};
use crate::domain::services::log_sink::{LogLevel, LogSink};
use crate::domain::services::proxy_config_store::ProxyConfigStore;
use crate::domain::services::task_store::StoreError;
use crate::domain::services::task_store::TaskStore;
use crate::engines::forum_parser::ForumParser;
use crate::engines::traits::{EngineError, FetchRequest, PageFetcher};
use crate::utils::retry_policy::RetryPolicy;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 取消标记，出现在被取消任务的日志中
pub const CANCELLED_MARKER: &str = "CANCELLED";

/// 一次执行的结局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Completed { found_links: usize },
    Failed { reason: String },
    Cancelled,
}

enum CrawlFailure {
    Cancelled,
    Fatal(String),
    Store(StoreError),
}

impl From<StoreError> for CrawlFailure {
    fn from(e: StoreError) -> Self {
        CrawlFailure::Store(e)
    }
}

enum FetchFailure {
    Cancelled,
    Exhausted(EngineError),
}

/// 执行器的可调参数
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub request_delay: Duration,
}

/// 爬取执行器
///
/// 把一个 Running 任务跑到 Completed 或 Failed。网络 I/O 期间不持有存储锁，
/// 每次请求前后检查取消令牌。
pub struct CrawlExecutor {
    fetcher: Arc<dyn PageFetcher>,
    parser: ForumParser,
    catalog: Arc<ThemeCatalog>,
    store: Arc<TaskStore>,
    proxy_store: Arc<ProxyConfigStore>,
    log_sink: Arc<LogSink>,
    storage: Arc<dyn StorageRepository>,
    options: ExecutorOptions,
}

impl CrawlExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: ForumParser,
        catalog: Arc<ThemeCatalog>,
        store: Arc<TaskStore>,
        proxy_store: Arc<ProxyConfigStore>,
        log_sink: Arc<LogSink>,
        storage: Arc<dyn StorageRepository>,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            fetcher,
            parser,
            catalog,
            store,
            proxy_store,
            log_sink,
            storage,
            options,
        }
    }

    /// 执行一个已切换为 Running 的任务
    ///
    /// # 参数
    ///
    /// * `task` - 任务快照
    /// * `cancel` - 取消令牌
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlOutcome)` - 任务已进入终态
    /// * `Err(StoreError)` - 任务状态无法写回
    #[instrument(skip(self, task, cancel), fields(task_id = %task.id, theme_id = %task.theme_id, mode = %task.mode))]
    pub async fn execute(
        &self,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, StoreError> {
        match self.crawl(task, cancel).await {
            Ok(magnets) => self.finish(task, magnets, cancel).await,
            Err(CrawlFailure::Cancelled) => self.abort_cancelled(task.id).await,
            Err(CrawlFailure::Fatal(reason)) => self.abort_failed(task.id, reason).await,
            Err(CrawlFailure::Store(e)) => Err(e),
        }
    }

    async fn crawl(
        &self,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<String>, CrawlFailure> {
        let theme = self
            .catalog
            .get(&task.theme_id)
            .cloned()
            .ok_or_else(|| CrawlFailure::Fatal(format!("unknown theme {}", task.theme_id)))?;

        let proxy = task
            .proxy
            .clone()
            .or_else(|| self.proxy_store.effective_proxy());
        if let Some(proxy_url) = proxy.as_deref() {
            validate_proxy_url(proxy_url)
                .map_err(|e| CrawlFailure::Fatal(format!("{}", e)))?;
        }

        self.log(task.id, LogLevel::Info, format!("开始爬取主题: {} (ID: {})", theme.name, theme.id))
            .await?;
        self.log(
            task.id,
            LogLevel::Info,
            format!(
                "爬取模式: {}",
                if task.mode == CrawlMode::Hot { "热门" } else { "普通" }
            ),
        )
        .await?;
        match task.mode {
            CrawlMode::Normal => {
                self.log(
                    task.id,
                    LogLevel::Info,
                    format!("爬取页数: 第{}页到第{}页", task.start_page, task.end_page),
                )
                .await?
            }
            CrawlMode::Hot => {}
        }
        if let Some(proxy_url) = proxy.as_deref() {
            self.log(task.id, LogLevel::Info, format!("使用代理: {}", proxy_url))
                .await?;
        }

        let pages: Vec<i32> = match task.mode {
            CrawlMode::Hot => vec![task.start_page],
            CrawlMode::Normal => (task.start_page..=task.end_page).collect(),
        };
        let page_count = pages.len();

        let mut magnets = BTreeSet::new();
        let mut total_threads = 0usize;

        for (page_index, page) in pages.into_iter().enumerate() {
            checkpoint(cancel)?;

            let listing_url = self.catalog.listing_url(&theme.id, task.mode, page);
            self.log(task.id, LogLevel::Info, format!("开始处理第 {} 页: {}", page, listing_url))
                .await?;

            let listing = match self.fetch(task.id, &listing_url, &proxy, cancel).await {
                Ok(html) => html,
                Err(FetchFailure::Cancelled) => return Err(CrawlFailure::Cancelled),
                Err(FetchFailure::Exhausted(e)) => {
                    return Err(CrawlFailure::Fatal(format!(
                        "无法访问第 {} 页 {}: {}",
                        page, listing_url, e
                    )))
                }
            };

            let threads = self.parser.extract_thread_urls(&listing);
            if threads.is_empty() {
                self.log(task.id, LogLevel::Warning, format!("第 {} 页未找到任何主题链接", page))
                    .await?;
                let progress = progress_percent(page_index + 1, 1, page_count, 1);
                self.store
                    .update_task(task.id, move |t| {
                        t.record_progress(progress);
                        Ok(())
                    })
                    .await?;
                continue;
            }

            total_threads += threads.len();
            let discovered = total_threads as i32;
            self.store
                .update_task(task.id, move |t| {
                    t.total_links = discovered;
                    Ok(())
                })
                .await?;
            self.log(
                task.id,
                LogLevel::Info,
                format!("第 {} 页找到 {} 个主题", page, threads.len()),
            )
            .await?;

            let thread_count = threads.len();
            for (thread_index, thread_url) in threads.iter().enumerate() {
                checkpoint(cancel)?;
                self.log(
                    task.id,
                    LogLevel::Info,
                    format!(
                        "处理第 {} 页 {}/{}: {}",
                        page,
                        thread_index + 1,
                        thread_count,
                        thread_url
                    ),
                )
                .await?;

                match self.fetch(task.id, thread_url, &proxy, cancel).await {
                    Ok(html) => {
                        let found = self.parser.extract_magnet_links(&html);
                        if !found.is_empty() {
                            self.log(
                                task.id,
                                LogLevel::Info,
                                format!("从 {} 提取到 {} 个磁力链接", thread_url, found.len()),
                            )
                            .await?;
                            magnets.extend(found);
                        }
                    }
                    Err(FetchFailure::Cancelled) => return Err(CrawlFailure::Cancelled),
                    Err(FetchFailure::Exhausted(e)) => {
                        self.log(
                            task.id,
                            LogLevel::Warning,
                            format!("跳过 {}: {}", thread_url, e),
                        )
                        .await?;
                    }
                }

                let progress =
                    progress_percent(page_index, thread_index + 1, page_count, thread_count);
                let found_so_far = magnets.len() as i32;
                self.store
                    .update_task(task.id, move |t| {
                        t.record_progress(progress);
                        t.found_links = found_so_far;
                        Ok(())
                    })
                    .await?;

                self.pause(cancel).await?;
            }
        }

        if total_threads == 0 {
            return Err(CrawlFailure::Fatal(
                "未找到任何主题链接，站点结构可能已变化".to_string(),
            ));
        }

        Ok(magnets)
    }

    /// 带重试的页面抓取，所有等待都可被取消
    async fn fetch(
        &self,
        task_id: Uuid,
        url: &str,
        proxy: &Option<String>,
        cancel: &CancellationToken,
    ) -> Result<String, FetchFailure> {
        let retry = &self.options.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(FetchFailure::Cancelled);
            }

            let request = FetchRequest::new(url, proxy.clone(), self.options.request_timeout);
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                result = self.fetcher.fetch(&request) => result,
            };

            match result {
                Ok(response) => return Ok(response.content),
                Err(e) if e.is_retryable() && retry.should_retry(attempt) => {
                    let wait = retry.calculate_backoff(attempt);
                    self.log_quietly(
                        task_id,
                        LogLevel::Warning,
                        format!(
                            "抓取 {} 失败 (第 {}/{} 次): {}，{:.1} 秒后重试",
                            url,
                            attempt,
                            retry.max_retries,
                            e,
                            wait.as_secs_f64()
                        ),
                    )
                    .await;
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                Err(e) => {
                    self.log_quietly(
                        task_id,
                        LogLevel::Error,
                        format!(
                            "抓取 {} 失败 (第 {}/{} 次): {}",
                            url, attempt, retry.max_retries, e
                        ),
                    )
                    .await;
                    return Err(FetchFailure::Exhausted(e));
                }
            }
        }
    }

    async fn pause(&self, cancel: &CancellationToken) -> Result<(), CrawlFailure> {
        if self.options.request_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(CrawlFailure::Cancelled),
            _ = tokio::time::sleep(self.options.request_delay) => Ok(()),
        }
    }

    async fn finish(
        &self,
        task: &Task,
        magnets: BTreeSet<String>,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, StoreError> {
        if cancel.is_cancelled() {
            return self.abort_cancelled(task.id).await;
        }

        let key = result_key(task.id);
        let mut body = String::new();
        for link in &magnets {
            body.push_str(link);
            body.push('\n');
        }

        if let Err(e) = self.storage.save(&key, body.as_bytes()).await {
            return self
                .abort_failed(task.id, format!("结果文件写入失败: {}", e))
                .await;
        }

        let found_links = magnets.len();
        self.log(
            task.id,
            LogLevel::Info,
            format!("总共找到 {} 个磁力链接，已保存到 {}", found_links, key),
        )
        .await?;

        let completed = self
            .store
            .update_task(task.id, move |t| t.complete(found_links as i32, key))
            .await;
        if let Err(e) = completed {
            // 记录已无法进入完成态，结果文件作废
            let key = result_key(task.id);
            if let Err(cleanup) = self.storage.delete(&key).await {
                warn!("Failed to remove result file {}: {}", key, cleanup);
            }
            return Err(e);
        }

        info!(found_links, "Crawl completed");
        Ok(CrawlOutcome::Completed { found_links })
    }

    async fn abort_cancelled(&self, task_id: Uuid) -> Result<CrawlOutcome, StoreError> {
        let line = self
            .log_sink
            .push(LogLevel::Error, &format!("{}: 任务已被取消", CANCELLED_MARKER));
        self.store
            .update_task(task_id, move |t| {
                t.push_log(line);
                t.fail("cancelled")
            })
            .await?;
        info!("Crawl cancelled");
        Ok(CrawlOutcome::Cancelled)
    }

    async fn abort_failed(&self, task_id: Uuid, reason: String) -> Result<CrawlOutcome, StoreError> {
        let line = self
            .log_sink
            .push(LogLevel::Error, &format!("爬取失败: {}", reason));
        let message = reason.clone();
        self.store
            .update_task(task_id, move |t| {
                t.push_log(line);
                t.fail(message)
            })
            .await?;
        Ok(CrawlOutcome::Failed { reason })
    }

    /// 写入全局日志缓冲与任务日志
    async fn log(&self, task_id: Uuid, level: LogLevel, message: String) -> Result<(), StoreError> {
        let line = self.log_sink.push(level, &message);
        self.store.append_log(task_id, line).await
    }

    async fn log_quietly(&self, task_id: Uuid, level: LogLevel, message: String) {
        if let Err(e) = self.log(task_id, level, message).await {
            warn!(task_id = %task_id, "Failed to append task log: {}", e);
        }
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), CrawlFailure> {
    if cancel.is_cancelled() {
        Err(CrawlFailure::Cancelled)
    } else {
        Ok(())
    }
}

/// 运行期间的进度：已完成的列表页加上当前页内已处理帖子的比例，封顶 99
fn progress_percent(
    pages_done: usize,
    threads_done: usize,
    page_count: usize,
    thread_count: usize,
) -> i32 {
    if page_count == 0 || thread_count == 0 {
        return 0;
    }
    let done = pages_done * thread_count + threads_done;
    let total = page_count * thread_count;
    ((done * 100 / total) as i32).min(99)
}
