// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 执行槽位池、槽位循环与爬取执行器
pub mod crawl_executor;
pub mod crawl_worker;
pub mod manager;

pub use manager::WorkerManager;
