// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::CrawlMode;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

/// 定时任务创建/编辑请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ScheduledTaskRequestDto {
    /// 定时任务名称
    #[validate(length(min = 1, max = 100, message = "name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "theme_id cannot be empty"))]
    pub theme_id: String,

    #[serde(default)]
    pub mode: CrawlMode,

    #[validate(range(min = 1, max = 100))]
    pub start_page: Option<i32>,

    #[validate(range(min = 1, max = 100))]
    pub end_page: Option<i32>,

    /// daily / weekly / interval
    pub schedule_type: String,

    /// `HH:MM`、`D:HH:MM`（或 `D`）、分钟数
    #[serde(deserialize_with = "string_or_number")]
    pub schedule_value: String,

    /// 创建时默认启用；编辑时不提供则保持原状态
    pub enabled: Option<bool>,
}

/// 间隔分钟数允许以数字提交
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer) {
        Ok(Raw::Text(s)) => Ok(s),
        Ok(Raw::Number(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom(
            "schedule_value must be a string or a non-negative integer",
        )),
    }
}
