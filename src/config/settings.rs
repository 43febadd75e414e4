// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库、结果存储、执行池、调度器、爬虫和日志缓冲等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 结果文件存储配置
    pub storage: StorageSettings,
    /// 任务执行池配置
    pub runner: RunnerSettings,
    /// 定时调度器配置
    pub scheduler: SchedulerSettings,
    /// 爬虫抓取配置
    pub crawler: CrawlerSettings,
    /// 最近日志缓冲配置
    pub logs: LogSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 存储类型 (local)
    pub storage_type: String,
    /// 本地存储路径
    pub local_path: Option<String>,
}

/// 执行池配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    /// 并发执行槽位数量
    pub pool_size: usize,
    /// 删除运行中任务时等待执行器确认取消的宽限时间（毫秒）
    pub cancel_grace_ms: u64,
}

impl RunnerSettings {
    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms)
    }
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 是否启动定时调度循环
    pub enabled: bool,
    /// 调度器检查间隔（秒）
    pub tick_seconds: u64,
    /// 计算每日/每周时间点所用的 UTC 偏移（分钟），缺省使用服务器本地时区
    pub utc_offset_minutes: Option<i32>,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 目标站点根地址
    pub base_url: String,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 单个页面的最大重试次数
    pub max_retries: u32,
    /// 首次重试的退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 相邻请求之间的间隔（毫秒）
    pub request_delay_ms: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
}

impl CrawlerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 日志缓冲配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// 环形缓冲区容量
    pub capacity: usize,
    /// `/api/logs` 默认返回条数
    pub recent_limit: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `THEMECRAWL__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("THEMECRAWL")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 仅包含默认值的配置，供测试和嵌入场景使用
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError>
    {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://data/themecrawl.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("storage.storage_type", "local")?
            .set_default("storage.local_path", "./storage")?
            .set_default("runner.pool_size", 2)?
            .set_default("runner.cancel_grace_ms", 10_000)?
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.tick_seconds", 60)?
            .set_default("crawler.base_url", "https://sehuatang.org")?
            .set_default("crawler.request_timeout_secs", 30)?
            .set_default("crawler.max_retries", 3)?
            .set_default("crawler.initial_backoff_ms", 2_000)?
            .set_default("crawler.request_delay_ms", 500)?
            .set_default(
                "crawler.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/139.0.0.0 Safari/537.36",
            )?
            .set_default("logs.capacity", 500)?
            .set_default("logs.recent_limit", 50)
    }
}
