// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::presentation::handlers::{
    crawl_handler, log_handler, proxy_handler, scheduled_task_handler, task_handler,
    theme_handler,
};
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `ctx` - 进程级组件，以 `Extension` 注入各处理器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(ctx: AppContext) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version));

    let api_routes = Router::new()
        .route("/api/tasks", get(task_handler::list_tasks))
        .route(
            "/api/tasks/{task_id}",
            get(task_handler::get_task).delete(task_handler::delete_task),
        )
        .route("/api/download/{task_id}", get(task_handler::download_result))
        .route("/api/crawl", post(crawl_handler::create_crawl))
        .route("/api/logs", get(log_handler::recent_logs))
        .route("/api/themes", get(theme_handler::list_themes))
        .route(
            "/api/proxy/config",
            get(proxy_handler::get_proxy_config).post(proxy_handler::update_proxy_config),
        )
        .route(
            "/api/scheduled-tasks",
            get(scheduled_task_handler::list_scheduled_tasks)
                .post(scheduled_task_handler::create_scheduled_task),
        )
        .route(
            "/api/scheduled-tasks/{id}",
            axum::routing::put(scheduled_task_handler::update_scheduled_task)
                .delete(scheduled_task_handler::delete_scheduled_task),
        )
        .route(
            "/api/scheduled-tasks/{id}/enable",
            post(scheduled_task_handler::enable_scheduled_task),
        )
        .route(
            "/api/scheduled-tasks/{id}/disable",
            post(scheduled_task_handler::disable_scheduled_task),
        )
        .route(
            "/api/scheduled-tasks/{id}/run",
            post(scheduled_task_handler::run_scheduled_task),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(Extension(ctx))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
