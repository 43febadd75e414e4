// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 爬取目标（crawl_target）：主题、模式与页码区间
/// - 代理配置（proxy_config）：进程级代理开关与地址
/// - 调度规则（schedule）：每日/每周/间隔规则与下次运行时间计算
/// - 定时任务（scheduled_task）：周期性派生爬取任务的定义
/// - 任务（task）：一次临时爬取及其生命周期
/// - 主题（theme）：静态主题目录
pub mod crawl_target;
pub mod proxy_config;
pub mod schedule;
pub mod scheduled_task;
pub mod task;
pub mod theme;
