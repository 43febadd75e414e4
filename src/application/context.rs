// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::crawl_use_case::CrawlUseCase;
use crate::application::use_cases::scheduled_task_use_case::ScheduledTaskUseCase;
use crate::config::settings::Settings;
use crate::domain::models::theme::ThemeCatalog;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::services::execution_registry::ExecutionRegistry;
use crate::domain::services::log_sink::LogSink;
use crate::domain::services::proxy_config_store::ProxyConfigStore;
use crate::domain::services::task_store::TaskStore;
use crate::engines::forum_parser::ForumParser;
use crate::engines::traits::PageFetcher;
use crate::infrastructure::repositories::proxy_config_repo_impl::ProxyConfigRepositoryImpl;
use crate::infrastructure::repositories::scheduled_task_repo_impl::ScheduledTaskRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::queue::scheduler::CrawlScheduler;
use crate::queue::task_queue::{InMemoryTaskQueue, TaskQueue};
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::crawl_executor::{CrawlExecutor, ExecutorOptions};
use crate::workers::manager::WorkerManager;
use anyhow::Context;
use chrono::FixedOffset;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 进程级组件
///
/// `main` 与集成测试共用同一套装配
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub catalog: Arc<ThemeCatalog>,
    pub log_sink: Arc<LogSink>,
    pub registry: Arc<ExecutionRegistry>,
    pub store: Arc<TaskStore>,
    pub proxy_store: Arc<ProxyConfigStore>,
    pub queue: Arc<dyn TaskQueue>,
    pub scheduler: Arc<CrawlScheduler>,
    pub executor: Arc<CrawlExecutor>,
    pub crawl_use_case: Arc<CrawlUseCase>,
    pub scheduled_task_use_case: Arc<ScheduledTaskUseCase>,
}

impl AppContext {
    /// 装配全部组件
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `db` - 已完成迁移的数据库连接
    /// * `fetcher` - 页面抓取器
    /// * `storage` - 结果文件存储
    pub async fn build(
        settings: Settings,
        db: DatabaseConnection,
        fetcher: Arc<dyn PageFetcher>,
        storage: Arc<dyn StorageRepository>,
    ) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);
        let db = Arc::new(db);

        let catalog = Arc::new(ThemeCatalog::builtin(&settings.crawler.base_url));
        let log_sink = Arc::new(LogSink::new(settings.logs.capacity));
        let registry = Arc::new(ExecutionRegistry::new());

        let store = Arc::new(TaskStore::new(
            Arc::new(TaskRepositoryImpl::new(db.clone())),
            Arc::new(ScheduledTaskRepositoryImpl::new(db.clone())),
            storage.clone(),
            registry.clone(),
            settings.runner.cancel_grace(),
        ));
        let proxy_store = Arc::new(
            ProxyConfigStore::load(Arc::new(ProxyConfigRepositoryImpl::new(db.clone())))
                .await
                .context("Failed to load proxy configuration")?,
        );

        let queue: Arc<dyn TaskQueue> = Arc::new(InMemoryTaskQueue::new(store.clone()));

        let utc_offset = match settings.scheduler.utc_offset_minutes {
            Some(minutes) => Some(
                FixedOffset::east_opt(minutes * 60)
                    .with_context(|| format!("Invalid scheduler.utc_offset_minutes: {}", minutes))?,
            ),
            None => None,
        };
        let scheduler = Arc::new(CrawlScheduler::new(
            store.clone(),
            queue.clone(),
            proxy_store.clone(),
            catalog.clone(),
            log_sink.clone(),
            Duration::from_secs(settings.scheduler.tick_seconds.max(1)),
            utc_offset,
        ));

        let parser = ForumParser::new(catalog.base_url()).context("Failed to build forum parser")?;
        let executor = Arc::new(CrawlExecutor::new(
            fetcher,
            parser,
            catalog.clone(),
            store.clone(),
            proxy_store.clone(),
            log_sink.clone(),
            storage,
            ExecutorOptions {
                retry: RetryPolicy::from_settings(&settings.crawler),
                request_timeout: settings.crawler.request_timeout(),
                request_delay: settings.crawler.request_delay(),
            },
        ));

        let crawl_use_case = Arc::new(CrawlUseCase::new(
            catalog.clone(),
            queue.clone(),
            log_sink.clone(),
        ));
        let scheduled_task_use_case =
            Arc::new(ScheduledTaskUseCase::new(catalog.clone(), scheduler.clone()));

        Ok(Self {
            settings,
            catalog,
            log_sink,
            registry,
            store,
            proxy_store,
            queue,
            scheduler,
            executor,
            crawl_use_case,
            scheduled_task_use_case,
        })
    }

    /// 启动恢复：上次遗留的 Running 任务置为失败，Pending 任务按创建顺序重新入队
    pub async fn recover(&self) -> anyhow::Result<usize> {
        let pending = self.store.recover_interrupted().await?;
        let count = pending.len();
        for task_id in pending {
            self.queue.requeue(task_id).await?;
        }
        if count > 0 {
            info!("Re-queued {} pending tasks", count);
        }
        Ok(count)
    }

    /// 创建未启动的执行槽位池
    pub fn worker_manager(&self) -> WorkerManager {
        WorkerManager::new(
            self.queue.clone(),
            self.store.clone(),
            self.registry.clone(),
            self.executor.clone(),
        )
    }
}
