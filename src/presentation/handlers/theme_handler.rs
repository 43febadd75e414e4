// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::context::AppContext;
use crate::application::dto::api_response::ApiResponse;
use crate::domain::models::theme::Theme;
use axum::{extract::Extension, Json};

pub async fn list_themes(Extension(ctx): Extension<AppContext>) -> Json<ApiResponse<Vec<Theme>>> {
    Json(ApiResponse::ok(ctx.catalog.themes().to_vec()))
}
