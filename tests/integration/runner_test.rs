// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::stub_fetcher::{listing_html, magnet, thread_html};
use super::helpers::{
    create_test_app, create_test_app_no_worker, create_test_app_with, script_theme_36,
    wait_for_status, wait_for_terminal, TestOptions, BASE_URL,
};
use serde_json::json;
use std::time::Duration;
use themecrawl::application::dto::crawl_request::CrawlRequestDto;
use themecrawl::domain::models::task::{Task, TaskStatus};
use themecrawl::domain::repositories::storage_repository::StorageRepository;
use themecrawl::domain::services::task_store::StoreError;
use tokio_util::sync::CancellationToken;
use themecrawl::workers::crawl_executor::CANCELLED_MARKER;

async fn submit(app: &super::helpers::TestApp, request: serde_json::Value) -> Task {
    let dto: CrawlRequestDto = serde_json::from_value(request).unwrap();
    app.ctx.crawl_use_case.create_crawl(dto).await.unwrap()
}

#[tokio::test]
async fn test_single_slot_runs_tasks_in_fifo_order() {
    let app = create_test_app_with(TestOptions {
        pool_size: 1,
        ..TestOptions::default()
    })
    .await;
    script_theme_36(&app.fetcher, 2);
    app.fetcher.set_delay(Duration::from_millis(30));

    let first = submit(&app, json!({ "theme_id": "36", "start_page": 1, "end_page": 1 })).await;
    let second = submit(&app, json!({ "theme_id": "36", "start_page": 2, "end_page": 2 })).await;

    // 槽位占满时第二个任务保持 Pending
    wait_for_status(&app.ctx, first.id, TaskStatus::Running).await;
    assert_eq!(
        app.ctx.store.get_task(second.id).await.unwrap().status,
        TaskStatus::Pending
    );

    let first = wait_for_terminal(&app.ctx, first.id).await;
    let second = wait_for_terminal(&app.ctx, second.id).await;
    assert_eq!(first.status, TaskStatus::Completed);
    assert_eq!(second.status, TaskStatus::Completed);
    assert!(first.end_time.unwrap() <= second.start_time.unwrap());
}

#[tokio::test]
async fn test_progress_is_monotonic_until_completed() {
    let app = create_test_app().await;
    script_theme_36(&app.fetcher, 3);
    app.fetcher.set_delay(Duration::from_millis(25));

    let task = submit(&app, json!({ "theme_id": "36", "start_page": 1, "end_page": 3 })).await;

    let mut observed = Vec::new();
    loop {
        let current = app.ctx.store.get_task(task.id).await.unwrap();
        observed.push(current.progress);
        if current.status.is_terminal() {
            assert_eq!(current.status, TaskStatus::Completed);
            break;
        }
        assert!(current.progress < 100);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(observed.windows(2).all(|w| w[0] <= w[1]), "{:?}", observed);
    assert_eq!(observed.last(), Some(&100));
    assert!(observed.iter().any(|p| *p > 0 && *p < 100));
}

#[tokio::test]
async fn test_hot_mode_crawls_single_listing() {
    let app = create_test_app().await;
    app.fetcher.page(
        format!(
            "{}/forum.php?mod=forumdisplay&fid=36&filter=heat&orderby=heats",
            BASE_URL
        ),
        listing_html(&[7]),
    );
    app.fetcher.page(
        format!("{}/thread-7-1-1.html", BASE_URL),
        thread_html(&[magnet(7), magnet(7)]),
    );

    let task = submit(&app, json!({ "theme_id": "36", "mode": "2" })).await;
    let task = wait_for_terminal(&app.ctx, task.id).await;

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.found_links, 1);
    assert_eq!(app.fetcher.requested_urls().len(), 2);

    let body = app
        .storage
        .get(task.result_path.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(String::from_utf8(body).unwrap(), format!("{}\n", magnet(7)));
}

#[tokio::test]
async fn test_listing_failure_fails_task_after_retries() {
    let app = create_test_app().await;
    let listing = format!("{}/forum-36-1.html", BASE_URL);
    app.fetcher.fail(listing.clone(), 503);

    let task = submit(&app, json!({ "theme_id": "36" })).await;
    let task = wait_for_terminal(&app.ctx, task.id).await;

    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.result_path.is_none());
    assert!(task.error_message.is_some());
    assert_eq!(app.fetcher.request_count(&listing), 2);
    assert!(task.logs.iter().any(|l| l.contains("WARNING: ")));
    assert!(task.logs.last().unwrap().contains("ERROR: "));
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_failed_thread_is_skipped() {
    let app = create_test_app().await;
    app.fetcher
        .page(format!("{}/forum-36-1.html", BASE_URL), listing_html(&[1, 2]));
    app.fetcher.fail(format!("{}/thread-1-1-1.html", BASE_URL), 404);
    app.fetcher.page(
        format!("{}/thread-2-1-1.html", BASE_URL),
        thread_html(&[magnet(2)]),
    );

    let task = submit(&app, json!({ "theme_id": "36" })).await;
    let task = wait_for_terminal(&app.ctx, task.id).await;

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.found_links, 1);
    assert_eq!(task.total_links, 2);
    // 404 不重试
    assert_eq!(
        app.fetcher
            .request_count(&format!("{}/thread-1-1-1.html", BASE_URL)),
        1
    );
    assert!(task
        .logs
        .iter()
        .any(|l| l.contains("WARNING: ") && l.contains("thread-1-1-1.html")));
}

#[tokio::test]
async fn test_listing_without_threads_fails_task() {
    let app = create_test_app().await;
    app.fetcher.page(
        format!("{}/forum-36-1.html", BASE_URL),
        "<html><body>maintenance</body></html>",
    );

    let task = submit(&app, json!({ "theme_id": "36" })).await;
    let task = wait_for_terminal(&app.ctx, task.id).await;

    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.result_path.is_none());
}

#[tokio::test]
async fn test_threads_without_magnets_complete_with_zero() {
    let app = create_test_app().await;
    app.fetcher
        .page(format!("{}/forum-36-1.html", BASE_URL), listing_html(&[5]));
    app.fetcher.page(
        format!("{}/thread-5-1-1.html", BASE_URL),
        "<html><body>no links here</body></html>",
    );

    let task = submit(&app, json!({ "theme_id": "36" })).await;
    let task = wait_for_terminal(&app.ctx, task.id).await;

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.found_links, 0);
    assert!(task.result_path.is_some());
}

#[tokio::test]
async fn test_proxy_resolution() {
    let app = create_test_app().await;
    script_theme_36(&app.fetcher, 1);

    // 任务未指定代理时使用全局配置
    app.ctx
        .proxy_store
        .set(true, "http://proxy.local:8080")
        .await
        .unwrap();
    let task = submit(&app, json!({ "theme_id": "36" })).await;
    assert_eq!(task.proxy, None);
    wait_for_terminal(&app.ctx, task.id).await;
    assert!(app
        .fetcher
        .requested_proxies()
        .iter()
        .all(|p| p.as_deref() == Some("http://proxy.local:8080")));

    // 任务自带代理优先
    let before = app.fetcher.requested_proxies().len();
    let task = submit(
        &app,
        json!({ "theme_id": "36", "proxy": "socks5://127.0.0.1:1080" }),
    )
    .await;
    wait_for_terminal(&app.ctx, task.id).await;
    let proxies = app.fetcher.requested_proxies();
    assert!(proxies[before..]
        .iter()
        .all(|p| p.as_deref() == Some("socks5://127.0.0.1:1080")));
}

#[tokio::test]
async fn test_shutdown_cancels_running_crawl() {
    let mut app = create_test_app_with(TestOptions {
        pool_size: 1,
        ..TestOptions::default()
    })
    .await;
    script_theme_36(&app.fetcher, 3);
    app.fetcher.set_delay(Duration::from_millis(200));

    let task = submit(&app, json!({ "theme_id": "36", "start_page": 1, "end_page": 3 })).await;
    wait_for_status(&app.ctx, task.id, TaskStatus::Running).await;

    let mut workers = app.workers.take().unwrap();
    workers.shutdown().await;

    let task = app.ctx.store.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error_message.as_deref(), Some("cancelled"));
    assert!(task.logs.iter().any(|l| l.contains(CANCELLED_MARKER)));
    assert_eq!(app.ctx.registry.active_count(), 0);
}

#[tokio::test]
async fn test_result_file_removed_when_completion_is_rejected() {
    let app = create_test_app_no_worker().await;
    script_theme_36(&app.fetcher, 1);

    // 任务仍是 Pending，完成态写回会被拒绝
    let task = submit(&app, json!({ "theme_id": "36" })).await;
    let result = app
        .ctx
        .executor
        .execute(&task, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(StoreError::Domain(_))));
    assert!(app.storage.is_empty().await);
    let task = app.ctx.store.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.result_path.is_none());
}
