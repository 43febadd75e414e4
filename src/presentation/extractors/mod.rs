// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 请求提取器模块
///
/// 包装 axum 的提取器，使解析失败也返回统一的错误响应
pub mod api_json;
