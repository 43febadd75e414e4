// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::crawl_use_case::CrawlUseCaseError;
use crate::application::use_cases::scheduled_task_use_case::ScheduledTaskUseCaseError;
use crate::domain::models::schedule::ScheduleError;
use crate::domain::models::task::DomainError;
use crate::domain::services::task_store::StoreError;
use crate::queue::scheduler::SchedulerError;
use crate::queue::task_queue::QueueError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，渲染为 `{success: false, error}`
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 根据内部的类型化错误选择状态码
    pub fn status_code(&self) -> StatusCode {
        let err = &self.0;

        if let Some(e) = err.downcast_ref::<CrawlUseCaseError>() {
            return match e {
                CrawlUseCaseError::ValidationError(_) | CrawlUseCaseError::Domain(_) => {
                    StatusCode::BAD_REQUEST
                }
                CrawlUseCaseError::Queue(e) => queue_status(e),
            };
        }
        if let Some(e) = err.downcast_ref::<ScheduledTaskUseCaseError>() {
            return match e {
                ScheduledTaskUseCaseError::ValidationError(_)
                | ScheduledTaskUseCaseError::Schedule(_)
                | ScheduledTaskUseCaseError::Domain(_) => StatusCode::BAD_REQUEST,
                ScheduledTaskUseCaseError::Scheduler(e) => scheduler_status(e),
            };
        }
        if let Some(e) = err.downcast_ref::<SchedulerError>() {
            return scheduler_status(e);
        }
        if let Some(e) = err.downcast_ref::<QueueError>() {
            return queue_status(e);
        }
        if let Some(e) = err.downcast_ref::<StoreError>() {
            return store_status(e);
        }
        if err.downcast_ref::<DomainError>().is_some()
            || err.downcast_ref::<ScheduleError>().is_some()
            || err.downcast_ref::<validator::ValidationErrors>().is_some()
            || err.downcast_ref::<JsonRejection>().is_some()
            || err.downcast_ref::<QueryRejection>().is_some()
            || err.downcast_ref::<PathRejection>().is_some()
        {
            return StatusCode::BAD_REQUEST;
        }

        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Busy(_) => StatusCode::CONFLICT,
        StoreError::Domain(_) => StatusCode::BAD_REQUEST,
        StoreError::Repository(_) | StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn queue_status(e: &QueueError) -> StatusCode {
    match e {
        QueueError::Store(e) => store_status(e),
        QueueError::Closed => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn scheduler_status(e: &SchedulerError) -> StatusCode {
    match e {
        SchedulerError::Domain(_) => StatusCode::BAD_REQUEST,
        SchedulerError::Store(e) => store_status(e),
        SchedulerError::Queue(e) => queue_status(e),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = self.0.to_string();

        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
