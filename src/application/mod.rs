// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求 DTO、用例与进程级组件装配
pub mod context;
pub mod dto;
pub mod use_cases;
