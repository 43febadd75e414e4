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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非 2xx 响应
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    /// 代理地址无法使用
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 站点返回了年龄确认页而不是目标页面
    #[error("Age verification page returned for {0}")]
    AgeGate(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 网络抖动、超时、5xx 与 429 返回 true，其余返回 false
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.is_body()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::HttpStatus(code) => *code >= 500 || *code == 429,
            EngineError::Timeout => true,
            EngineError::InvalidProxy(_) | EngineError::AgeGate(_) | EngineError::Other(_) => {
                false
            }
        }
    }
}

/// 页面抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 代理地址，形如 `socks5://host:port`
    pub proxy: Option<String>,
    /// 单次请求超时
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, proxy: Option<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            proxy,
            timeout,
        }
    }
}

/// 页面抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// 响应内容
    pub content: String,
}

/// 页面抓取特质
///
/// 爬取执行器只依赖本特质，测试中可替换为脚本化实现
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取一个页面，非 2xx 响应返回错误
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        (**self).fetch(request).await
    }
}
