// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::application::dto::api_response::ApiResponse;
use crate::application::dto::proxy_config_request::ProxyConfigRequestDto;
use crate::domain::models::proxy_config::ProxyConfig;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::api_json::ApiJson;
use axum::{extract::Extension, Json};
use validator::Validate;

pub async fn get_proxy_config(
    Extension(ctx): Extension<AppContext>,
) -> Json<ApiResponse<ProxyConfig>> {
    Json(ApiResponse::ok(ctx.proxy_store.get()))
}

/// 更新代理配置，地址不合法时返回 400 且原配置保持不变
pub async fn update_proxy_config(
    Extension(ctx): Extension<AppContext>,
    ApiJson(payload): ApiJson<ProxyConfigRequestDto>,
) -> Result<Json<ApiResponse<ProxyConfig>>, AppError> {
    payload.validate()?;
    let config = ctx
        .proxy_store
        .set(payload.enabled, &payload.proxy_url)
        .await?;
    Ok(Json(ApiResponse::ok(config)))
}
