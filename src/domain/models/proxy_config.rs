// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::DomainError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PROXY_URL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(?:http|https|socks5)://[\w\-.]+:(\d+)$"));

/// 进程级代理配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(rename = "proxy_enabled")]
    pub enabled: bool,
    pub proxy_url: String,
}

impl ProxyConfig {
    /// 构造代理配置
    ///
    /// 仅在启用时校验地址；禁用时地址原样保存。
    pub fn new(enabled: bool, proxy_url: &str) -> Result<Self, DomainError> {
        let proxy_url = proxy_url.trim();
        if enabled {
            validate_proxy_url(proxy_url)?;
        }
        Ok(Self {
            enabled,
            proxy_url: proxy_url.to_string(),
        })
    }

    /// 启用时返回代理地址
    pub fn effective_proxy(&self) -> Option<String> {
        (self.enabled && !self.proxy_url.is_empty()).then(|| self.proxy_url.clone())
    }
}

/// 校验代理地址：`scheme://host:port`，scheme 为 http/https/socks5，端口 1-65535
pub fn validate_proxy_url(url: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidProxyUrl(url.to_string());
    let pattern = PROXY_URL_PATTERN.as_ref().map_err(|_| invalid())?;
    let captures = pattern.captures(url).ok_or_else(invalid)?;
    let port = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .ok_or_else(invalid)?;
    if port == 0 {
        return Err(invalid());
    }
    Ok(())
}
