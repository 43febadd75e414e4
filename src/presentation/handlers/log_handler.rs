// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::application::dto::api_response::ApiResponse;
use crate::application::dto::log_query::LogQueryDto;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::api_json::ApiQuery;
use axum::{extract::Extension, Json};
use validator::Validate;

/// 最近的全局日志，最新的在前
pub async fn recent_logs(
    Extension(ctx): Extension<AppContext>,
    ApiQuery(query): ApiQuery<LogQueryDto>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    query.validate()?;
    let limit = query.limit.unwrap_or(ctx.settings.logs.recent_limit);
    Ok(Json(ApiResponse::ok(ctx.log_sink.recent(limit))))
}
