// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 执行登记表（execution_registry）：运行中任务的取消令牌
/// - 日志缓冲（log_sink）：进程级最近日志
/// - 代理配置存储（proxy_config_store）：校验并持久化代理配置
/// - 任务存储（task_store）：临时任务与定时任务的并发安全读写
pub mod execution_registry;
pub mod log_sink;
pub mod proxy_config_store;
pub mod task_store;
