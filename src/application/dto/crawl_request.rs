// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::CrawlMode;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 临时爬取请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CrawlRequestDto {
    /// 主题ID
    #[validate(length(min = 1, message = "theme_id cannot be empty"))]
    pub theme_id: String,

    /// 爬取模式，"1" 普通 / "2" 热门
    #[serde(default)]
    pub mode: CrawlMode,

    /// 起始页，普通模式默认 1
    #[validate(range(min = 1, max = 100))]
    pub start_page: Option<i32>,

    /// 结束页，普通模式默认等于起始页
    #[validate(range(min = 1, max = 100))]
    pub end_page: Option<i32>,

    /// 代理地址，未提供时在开始爬取时使用全局代理配置
    pub proxy: Option<String>,
}
