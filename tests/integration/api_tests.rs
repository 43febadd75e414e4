// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, create_test_app_no_worker, script_theme_36, wait_for_terminal,
};
use axum::http::StatusCode;
use chrono::DateTime;
use serde_json::{json, Value};
use themecrawl::domain::models::task::TaskStatus;
use uuid::Uuid;

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app_no_worker().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/version").await;
    response.assert_status_ok();
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_list_themes() {
    let app = create_test_app_no_worker().await;

    let response = app.server.get("/api/themes").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let themes = body["data"].as_array().unwrap();
    assert_eq!(themes.len(), 7);
    assert_eq!(themes[0]["id"], "36");
    assert_eq!(themes[0]["supports_hot"], true);

    let theme_37 = themes.iter().find(|t| t["id"] == "37").unwrap();
    assert_eq!(theme_37["supports_hot"], false);
}

#[tokio::test]
async fn test_create_crawl_returns_pending_task() {
    let app = create_test_app_no_worker().await;

    let response = app
        .server
        .post("/api/crawl")
        .json(&json!({ "theme_id": "36", "mode": "1", "start_page": 2, "end_page": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["mode"], "1");
    assert_eq!(body["data"]["start_page"], 2);
    assert_eq!(body["data"]["end_page"], 4);
    assert_eq!(body["data"]["progress"], 0);
    assert!(body["data"]["result_path"].is_null());

    let task_id = body["data"]["task_id"].as_str().unwrap().to_string();
    let response = app.server.get(&format!("/api/tasks/{}", task_id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["task_id"], task_id.as_str());

    assert_eq!(app.ctx.queue.len(), 1);
}

#[tokio::test]
async fn test_hot_mode_on_unsupported_theme_is_rejected() {
    let app = create_test_app_no_worker().await;

    let response = app
        .server
        .post("/api/crawl")
        .json(&json!({ "theme_id": "37", "mode": "2" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("hot"));

    let body: Value = app.server.get("/api/tasks").await.json();
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(app.ctx.queue.len(), 0);
}

#[tokio::test]
async fn test_hot_mode_accepts_any_page_order() {
    let app = create_test_app_no_worker().await;

    let response = app
        .server
        .post("/api/crawl")
        .json(&json!({ "theme_id": "36", "mode": "2", "start_page": 5, "end_page": 2 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["data"]["mode"], "2");
    assert_eq!(app.ctx.queue.len(), 1);
}

#[tokio::test]
async fn test_invalid_crawl_requests_are_rejected() {
    let app = create_test_app_no_worker().await;

    for payload in [
        json!({ "theme_id": "36", "start_page": 5, "end_page": 2 }),
        json!({ "theme_id": "36", "start_page": 0 }),
        json!({ "theme_id": "36", "end_page": 101 }),
        json!({ "theme_id": "999" }),
        json!({ "theme_id": "36", "mode": "3" }),
        json!({ "theme_id": "36", "proxy": "localhost:1080" }),
    ] {
        let response = app.server.post("/api/crawl").json(&payload).await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "payload {} should be rejected",
            payload
        );
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    assert!(app.ctx.store.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_proxy_config_round_trip() {
    let app = create_test_app_no_worker().await;

    let body: Value = app.server.get("/api/proxy/config").await.json();
    assert_eq!(body["data"]["proxy_enabled"], false);
    assert_eq!(body["data"]["proxy_url"], "");

    let response = app
        .server
        .post("/api/proxy/config")
        .json(&json!({ "enabled": true, "proxy_url": "socks5://127.0.0.1:1080" }))
        .await;
    response.assert_status_ok();

    let body: Value = app.server.get("/api/proxy/config").await.json();
    assert_eq!(body["data"]["proxy_enabled"], true);
    assert_eq!(body["data"]["proxy_url"], "socks5://127.0.0.1:1080");

    let response = app
        .server
        .post("/api/proxy/config")
        .json(&json!({ "enabled": true, "proxy_url": "ftp://127.0.0.1:21" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = app.server.get("/api/proxy/config").await.json();
    assert_eq!(body["data"]["proxy_enabled"], true);
    assert_eq!(body["data"]["proxy_url"], "socks5://127.0.0.1:1080");

    // 禁用时允许清空地址
    let response = app
        .server
        .post("/api/proxy/config")
        .json(&json!({ "enabled": false, "proxy_url": "" }))
        .await;
    response.assert_status_ok();
    assert_eq!(app.ctx.proxy_store.effective_proxy(), None);

    // 禁用时不校验地址格式
    let response = app
        .server
        .post("/api/proxy/config")
        .json(&json!({ "enabled": false, "proxy_url": "127.0.0.1:7890" }))
        .await;
    response.assert_status_ok();
    let body: Value = app.server.get("/api/proxy/config").await.json();
    assert_eq!(body["data"]["proxy_enabled"], false);
    assert_eq!(body["data"]["proxy_url"], "127.0.0.1:7890");
    assert_eq!(app.ctx.proxy_store.effective_proxy(), None);
}

#[tokio::test]
async fn test_download_and_delete_errors() {
    let app = create_test_app_no_worker().await;
    let unknown = Uuid::new_v4();

    let response = app.server.get(&format!("/api/download/{}", unknown)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.delete(&format!("/api/tasks/{}", unknown)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.get("/api/tasks/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = app
        .server
        .post("/api/crawl")
        .json(&json!({ "theme_id": "36" }))
        .await
        .json();
    let task_id = body["data"]["task_id"].as_str().unwrap().to_string();

    let response = app.server.get(&format!("/api/download/{}", task_id)).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    // Pending 任务可直接删除
    let response = app.server.delete(&format!("/api/tasks/{}", task_id)).await;
    response.assert_status_ok();
    let response = app.server.get(&format!("/api/tasks/{}", task_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_to_end_crawl_and_download() {
    let app = create_test_app().await;
    let expected = script_theme_36(&app.fetcher, 3);

    let response = app
        .server
        .post("/api/crawl")
        .json(&json!({ "theme_id": "36", "mode": "1", "start_page": 1, "end_page": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let task_id: Uuid = body["data"]["task_id"].as_str().unwrap().parse().unwrap();

    let task = wait_for_terminal(&app.ctx, task_id).await;
    assert_eq!(task.status, TaskStatus::Completed, "logs: {:?}", task.logs);
    assert_eq!(task.progress, 100);
    assert_eq!(task.found_links, expected as i32);
    assert_eq!(task.total_links, 6);
    assert!(task.start_time.is_some());
    assert!(task.end_time.is_some());
    assert!(task.result_path.is_some());

    let response = app.server.get(&format!("/api/download/{}", task_id)).await;
    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    let disposition = response.header("content-disposition");
    assert!(disposition
        .to_str()
        .unwrap()
        .contains("magnet_links_36_1_1-3.txt"));

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), expected);
    assert!(lines.iter().all(|l| l.starts_with("magnet:?xt=urn:btih:")));
    assert!(text.ends_with('\n'));

    let body: Value = app.server.get("/api/logs?limit=5").await.json();
    let logs = body["data"].as_array().unwrap();
    assert_eq!(logs.len(), 5);
    assert!(logs[0].as_str().unwrap().contains("INFO: "));

    // 删除已完成任务同时删除结果文件
    let response = app.server.delete(&format!("/api/tasks/{}", task_id)).await;
    response.assert_status_ok();
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_scheduled_task_lifecycle() {
    let app = create_test_app_no_worker().await;

    let response = app
        .server
        .post("/api/scheduled-tasks")
        .json(&json!({
            "name": "hourly 36",
            "theme_id": "36",
            "mode": "1",
            "start_page": 1,
            "end_page": 2,
            "schedule_type": "interval",
            "schedule_value": "60"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["schedule_type"], "interval");
    assert_eq!(data["schedule_value"], "60");
    assert_eq!(data["enabled"], true);
    assert_eq!(data["run_count"], 0);
    assert!(!data["next_run"].is_null());
    let id = data["task_id"].as_str().unwrap().to_string();

    let body: Value = app.server.get("/api/scheduled-tasks").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .server
        .put(&format!("/api/scheduled-tasks/{}", id))
        .json(&json!({
            "name": "morning 36",
            "theme_id": "36",
            "schedule_type": "daily",
            "schedule_value": "08:00"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "morning 36");
    assert_eq!(body["data"]["schedule_type"], "daily");
    assert_eq!(body["data"]["schedule_value"], "08:00");

    let body: Value = app
        .server
        .post(&format!("/api/scheduled-tasks/{}/disable", id))
        .await
        .json();
    assert_eq!(body["data"]["enabled"], false);
    assert!(body["data"]["next_run"].is_null());

    let body: Value = app
        .server
        .post(&format!("/api/scheduled-tasks/{}/enable", id))
        .await
        .json();
    assert_eq!(body["data"]["enabled"], true);
    assert!(!body["data"]["next_run"].is_null());
    let next_run = body["data"]["next_run"].clone();

    let response = app
        .server
        .post(&format!("/api/scheduled-tasks/{}/run", id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["scheduled_task_id"], id.as_str());

    let body: Value = app.server.get("/api/scheduled-tasks").await.json();
    let definition = &body["data"][0];
    assert_eq!(definition["run_count"], 1);
    assert!(!definition["last_run"].is_null());
    let before = DateTime::parse_from_rfc3339(next_run.as_str().unwrap()).unwrap();
    let after = DateTime::parse_from_rfc3339(definition["next_run"].as_str().unwrap()).unwrap();
    assert!((after - before).num_milliseconds().abs() < 1_000);

    let response = app
        .server
        .delete(&format!("/api/scheduled-tasks/{}", id))
        .await;
    response.assert_status_ok();
    let response = app
        .server
        .delete(&format!("/api/scheduled-tasks/{}", id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_scheduled_tasks_are_rejected() {
    let app = create_test_app_no_worker().await;

    for (schedule_type, schedule_value) in [
        ("monthly", "1"),
        ("daily", "25:00"),
        ("weekly", "8:10:00"),
        ("interval", "0"),
    ] {
        let response = app
            .server
            .post("/api/scheduled-tasks")
            .json(&json!({
                "name": "broken",
                "theme_id": "36",
                "schedule_type": schedule_type,
                "schedule_value": schedule_value
            }))
            .await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "{} {} should be rejected",
            schedule_type,
            schedule_value
        );
    }

    let response = app
        .server
        .post("/api/scheduled-tasks")
        .json(&json!({
            "name": "hot 37",
            "theme_id": "37",
            "mode": "2",
            "schedule_type": "daily",
            "schedule_value": "08:00"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post(&format!("/api/scheduled-tasks/{}/enable", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = app.server.get("/api/scheduled-tasks").await.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}
