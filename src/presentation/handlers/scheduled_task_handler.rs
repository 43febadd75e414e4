// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::application::dto::api_response::ApiResponse;
use crate::application::dto::scheduled_task_request::ScheduledTaskRequestDto;
use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::models::task::Task;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::api_json::{ApiJson, ApiPath};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

pub async fn list_scheduled_tasks(
    Extension(ctx): Extension<AppContext>,
) -> Result<Json<ApiResponse<Vec<ScheduledTask>>>, AppError> {
    let tasks = ctx.scheduled_task_use_case.list().await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

pub async fn create_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiJson(payload): ApiJson<ScheduledTaskRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let task = ctx.scheduled_task_use_case.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}

pub async fn update_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ScheduledTaskRequestDto>,
) -> Result<Json<ApiResponse<ScheduledTask>>, AppError> {
    let task = ctx.scheduled_task_use_case.update(id, payload).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn delete_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ctx.scheduled_task_use_case.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "task_id": id }
    })))
}

pub async fn enable_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ScheduledTask>>, AppError> {
    let task = ctx.scheduled_task_use_case.set_enabled(id, true).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn disable_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ScheduledTask>>, AppError> {
    let task = ctx.scheduled_task_use_case.set_enabled(id, false).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// 立即派生一个任务，不影响 `next_run`
pub async fn run_scheduled_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let task: Task = ctx.scheduled_task_use_case.run_now(id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}
