// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 代理配置仓库（proxy_config_repository）：单行代理配置
/// - 定时任务仓库（scheduled_task_repository）：周期性爬取定义
/// - 存储仓库（storage_repository）：结果文件的存储
/// - 任务仓库（task_repository）：临时爬取任务
pub mod proxy_config_repository;
pub mod scheduled_task_repository;
pub mod storage_repository;
pub mod task_repository;
