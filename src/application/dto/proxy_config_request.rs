// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 代理配置更新请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ProxyConfigRequestDto {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    #[validate(length(max = 512))]
    pub proxy_url: String,
}
