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

use std::sync::Arc;
use themecrawl::application::context::AppContext;
use themecrawl::config::settings::Settings;
use themecrawl::engines::reqwest_engine::ReqwestEngine;
use themecrawl::infrastructure::database::connection;
use themecrawl::infrastructure::storage::create_storage_repository;
use themecrawl::presentation::routes;
use themecrawl::utils::telemetry;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting themecrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    // 4. Initialize components
    let storage = create_storage_repository(&settings.storage)?;
    let fetcher = Arc::new(ReqwestEngine::new(settings.crawler.user_agent.clone()));
    let ctx = AppContext::build(settings, db, fetcher, storage).await?;

    // 5. Recover tasks left behind by the previous process
    ctx.recover().await?;

    // 6. Start workers and scheduler
    let mut worker_manager = ctx.worker_manager();
    worker_manager.start_workers(ctx.settings.runner.pool_size.max(1));

    let shutdown = CancellationToken::new();
    let scheduler_handle = if ctx.settings.scheduler.enabled {
        Some(ctx.scheduler.start(shutdown.clone()))
    } else {
        info!("Scheduler disabled by configuration");
        None
    };

    // 7. Start HTTP server
    let addr = format!("{}:{}", ctx.settings.server.host, ctx.settings.server.port);
    let app = routes::routes(ctx.clone());
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 8. Stop background work
    shutdown.cancel();
    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            error!("Scheduler terminated abnormally: {}", e);
        }
    }
    worker_manager.shutdown().await;

    info!("themecrawl stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await
        }
    }
}
