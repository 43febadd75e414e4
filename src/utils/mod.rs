// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供重试退避策略与 tracing 初始化
pub mod retry_policy;
pub mod telemetry;
