// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use themecrawl::engines::traits::{EngineError, FetchRequest, FetchResponse, PageFetcher};

/// 脚本化页面
#[derive(Debug, Clone)]
pub enum StubPage {
    Html(String),
    Status(u16),
}

/// 按 URL 返回预设内容的抓取器，记录每次请求
#[derive(Default)]
pub struct StubFetcher {
    pages: Mutex<HashMap<String, StubPage>>,
    requests: Mutex<Vec<FetchRequest>>,
    delay: Mutex<Duration>,
}

#[allow(dead_code)]
impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages
            .lock()
            .insert(url.into(), StubPage::Html(html.into()));
    }

    pub fn fail(&self, url: impl Into<String>, status: u16) {
        self.pages.lock().insert(url.into(), StubPage::Status(status));
    }

    /// 每次请求前的等待时间
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.url.clone()).collect()
    }

    pub fn requested_proxies(&self) -> Vec<Option<String>> {
        self.requests.lock().iter().map(|r| r.proxy.clone()).collect()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        self.requests.lock().push(request.clone());

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.lock().get(&request.url).cloned();
        match page {
            Some(StubPage::Html(content)) => Ok(FetchResponse { content }),
            Some(StubPage::Status(code)) => Err(EngineError::HttpStatus(code)),
            None => Err(EngineError::HttpStatus(404)),
        }
    }
}

/// 列表页：每个帖子一个 `thread-N-1-1.html` 链接
pub fn listing_html(thread_ids: &[u32]) -> String {
    let rows: String = thread_ids
        .iter()
        .map(|id| format!(r#"<tr><th><a href="thread-{}-1-1.html">topic {}</a></th></tr>"#, id, id))
        .collect();
    format!("<html><body><table>{}</table></body></html>", rows)
}

/// 帖子页：每个磁力链接放在一个代码块里
pub fn thread_html(magnets: &[String]) -> String {
    let blocks: String = magnets
        .iter()
        .map(|m| format!(r#"<div class="blockcode">{}</div>"#, m))
        .collect();
    format!("<html><body>{}</body></html>", blocks)
}

/// 第 n 个测试用磁力链接
pub fn magnet(n: u32) -> String {
    format!("magnet:?xt=urn:btih:{:040x}", n)
}
