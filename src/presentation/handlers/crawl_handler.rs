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

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::{
    application::{
        context::AppContext,
        dto::{api_response::ApiResponse, crawl_request::CrawlRequestDto},
    },
    presentation::{errors::AppError, extractors::api_json::ApiJson},
};

/// 创建新的爬取任务
///
/// 返回 201 与 Pending 状态的任务
pub async fn create_crawl(
    Extension(ctx): Extension<AppContext>,
    ApiJson(payload): ApiJson<CrawlRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let task = ctx.crawl_use_case.create_crawl(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}
