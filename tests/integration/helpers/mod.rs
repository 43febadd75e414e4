// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod stub_fetcher;

use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use stub_fetcher::{listing_html, magnet, thread_html, StubFetcher};
use tempfile::TempDir;
use themecrawl::application::context::AppContext;
use themecrawl::config::settings::Settings;
use themecrawl::domain::models::task::{Task, TaskStatus};
use themecrawl::infrastructure::database::connection;
use themecrawl::infrastructure::storage::InMemoryStorage;
use themecrawl::presentation::routes;
use themecrawl::workers::manager::WorkerManager;
use uuid::Uuid;

pub const BASE_URL: &str = "https://forum.test";

#[derive(Debug, Clone)]
pub struct TestOptions {
    pub start_workers: bool,
    pub pool_size: usize,
    pub cancel_grace_ms: u64,
    pub max_retries: u32,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            start_workers: true,
            pool_size: 2,
            cancel_grace_ms: 2_000,
            max_retries: 2,
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub ctx: AppContext,
    pub db: DatabaseConnection,
    pub fetcher: Arc<StubFetcher>,
    pub storage: Arc<InMemoryStorage>,
    pub workers: Option<WorkerManager>,
    // 数据库文件随目录一起删除
    _db_dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(TestOptions::default()).await
}

pub async fn create_test_app_no_worker() -> TestApp {
    create_test_app_with(TestOptions {
        start_workers: false,
        ..TestOptions::default()
    })
    .await
}

pub async fn create_test_app_with(options: TestOptions) -> TestApp {
    let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db_dir.path().join("themecrawl.db");

    let mut settings = Settings::defaults().expect("Failed to load default settings");
    settings.database.url = format!("sqlite://{}?mode=rwc", db_path.display());
    settings.database.max_connections = Some(1);
    settings.database.min_connections = Some(1);
    settings.crawler.base_url = BASE_URL.to_string();
    settings.crawler.request_delay_ms = 0;
    settings.crawler.initial_backoff_ms = 1;
    settings.crawler.max_retries = options.max_retries;
    settings.runner.pool_size = options.pool_size;
    settings.runner.cancel_grace_ms = options.cancel_grace_ms;
    settings.scheduler.utc_offset_minutes = Some(0);

    let db = connection::create_pool(&settings.database)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let fetcher = Arc::new(StubFetcher::new());
    let storage = Arc::new(InMemoryStorage::new());
    let ctx = AppContext::build(settings, db.clone(), fetcher.clone(), storage.clone())
        .await
        .expect("Failed to build application context");

    let workers = if options.start_workers {
        let mut manager = ctx.worker_manager();
        manager.start_workers(options.pool_size);
        Some(manager)
    } else {
        None
    };

    let server = TestServer::new(routes::routes(ctx.clone())).expect("Failed to start test server");

    TestApp {
        server,
        ctx,
        db,
        fetcher,
        storage,
        workers,
        _db_dir: db_dir,
    }
}

/// 主题 36 第 1..=pages 页，每页两个帖子，每个帖子两个磁力链接，
/// 相邻帖子共享一个链接。返回去重后的链接数。
#[allow(dead_code)]
pub fn script_theme_36(fetcher: &StubFetcher, pages: u32) -> usize {
    let mut unique = std::collections::BTreeSet::new();
    for page in 1..=pages {
        let first = page * 10;
        let second = page * 10 + 1;
        fetcher.page(
            format!("{}/forum-36-{}.html", BASE_URL, page),
            listing_html(&[first, second]),
        );
        for thread in [first, second] {
            let links = vec![magnet(thread), magnet(page * 1000)];
            unique.extend(links.iter().cloned());
            fetcher.page(
                format!("{}/thread-{}-1-1.html", BASE_URL, thread),
                thread_html(&links),
            );
        }
    }
    unique.len()
}

/// 轮询直到任务满足条件
#[allow(dead_code)]
pub async fn wait_for_task<F>(ctx: &AppContext, task_id: Uuid, predicate: F) -> Task
where
    F: Fn(&Task) -> bool,
{
    for _ in 0..500 {
        if let Ok(task) = ctx.store.get_task(task_id).await {
            if predicate(&task) {
                return task;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Task {} did not reach the expected state in time", task_id);
}

#[allow(dead_code)]
pub async fn wait_for_terminal(ctx: &AppContext, task_id: Uuid) -> Task {
    wait_for_task(ctx, task_id, |t| t.status.is_terminal()).await
}

#[allow(dead_code)]
pub async fn wait_for_status(ctx: &AppContext, task_id: Uuid, status: TaskStatus) -> Task {
    wait_for_task(ctx, task_id, |t| t.status == status).await
}
