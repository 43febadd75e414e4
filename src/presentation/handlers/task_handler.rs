// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::application::dto::api_response::ApiResponse;
use crate::domain::models::task::{DomainError, Task, TaskStatus};
use crate::domain::services::task_store::StoreError;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::api_json::ApiPath;
use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// 按创建顺序列出全部任务
pub async fn list_tasks(
    Extension(ctx): Extension<AppContext>,
) -> Result<Json<ApiResponse<Vec<Task>>>, AppError> {
    let tasks = ctx.store.list_tasks().await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

pub async fn get_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Task>>, AppError> {
    let task = ctx.store.get_task(task_id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// 删除任务
///
/// 运行中的任务先被取消，执行器确认退出后才删除记录；
/// 宽限期内未确认时返回 409
pub async fn delete_task(
    Extension(ctx): Extension<AppContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ctx.store.delete_task(task_id).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "task_id": task_id }
    })))
}

/// 下载已完成任务的磁力链接文件
pub async fn download_result(
    Extension(ctx): Extension<AppContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let task = ctx.store.get_task(task_id).await?;

    let path = match (task.status, task.result_path.as_deref()) {
        (TaskStatus::Completed, Some(path)) => path.to_string(),
        _ => {
            return Err(DomainError::ValidationError(format!(
                "task {} is {}, results are only available once completed",
                task_id, task.status
            ))
            .into())
        }
    };

    let body = ctx
        .store
        .storage()
        .get(&path)
        .await
        .map_err(StoreError::from)?
        .ok_or(StoreError::NotFound(task_id))?;

    let disposition = format!("attachment; filename=\"{}\"", task.download_file_name());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
