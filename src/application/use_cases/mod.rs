// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 把经过校验的请求转换为领域对象并交给队列或调度器
pub mod crawl_use_case;
pub mod scheduled_task_use_case;
