// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 日志查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LogQueryDto {
    /// 返回条数，未提供时使用配置的默认值
    #[validate(range(min = 1, max = 10000))]
    pub limit: Option<usize>,
}
