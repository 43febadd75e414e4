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

use crate::engines::traits::{EngineError, FetchRequest, FetchResponse, PageFetcher};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

/// 年龄确认页的标志文本
const AGE_GATE_MARKER: &str = "满18岁";

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/139.0.0.0 Safari/537.36";

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎。每个代理地址复用一个客户端。
/// 返回年龄确认页时报 `EngineError::AgeGate`，不当作正常页面解析。
pub struct ReqwestEngine {
    user_agent: String,
    clients: DashMap<Option<String>, reqwest::Client>,
}

impl ReqwestEngine {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            clients: DashMap::new(),
        }
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<reqwest::Client, EngineError> {
        let key = proxy.map(str::to_string);
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .cookie_store(true);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| EngineError::InvalidProxy(format!("{}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        self.clients.insert(key, client.clone());
        Ok(client)
    }
}

impl Default for ReqwestEngine {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 2xx 响应
    /// * `Err(EngineError)` - 网络错误、超时、非 2xx 状态、代理不可用或年龄确认页
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let client = self.client_for(request.proxy.as_deref())?;

        let response = client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout
                } else {
                    EngineError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        debug!(url = %request.url, status = status.as_u16(), "Fetched page");
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        let content = response.text().await?;
        if content.contains(AGE_GATE_MARKER) {
            return Err(EngineError::AgeGate(request.url.clone()));
        }
        Ok(FetchResponse { content })
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
