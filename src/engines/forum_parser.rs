// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// 帖子正文可能出现磁力链接的容器
const CONTENT_SELECTOR: &str = "div.blockcode, div.t_msgfont, div.postcontent, div.message, p";

/// 论坛页面解析器
///
/// 从列表页提取帖子第一页链接，从帖子页提取磁力链接
pub struct ForumParser {
    base_url: String,
    thread_pattern: Regex,
    magnet_pattern: Regex,
    anchor_selector: Selector,
    content_selector: Selector,
}

impl ForumParser {
    /// 创建解析器
    ///
    /// # 参数
    ///
    /// * `base_url` - 站点根地址，相对链接以此补全
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| EngineError::Other(format!("invalid base url {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(EngineError::Other(format!(
                "base url must be http(s) with a host: {}",
                base_url
            )));
        }

        let thread_pattern = Regex::new(
            r"(?:thread-(\d+)(?:-\d+-\d+)?\.html|(?:thread\.php\?|forum\.php\?mod=viewthread&(?:amp;)?)tid=(\d+))",
        )
        .map_err(|e| EngineError::Other(e.to_string()))?;
        let magnet_pattern = Regex::new(r"(?i)magnet:\?xt=urn:[a-z0-9]+:[a-z0-9]{32,}")
            .map_err(|e| EngineError::Other(e.to_string()))?;
        let anchor_selector =
            Selector::parse("a[href]").map_err(|e| EngineError::Other(e.to_string()))?;
        let content_selector =
            Selector::parse(CONTENT_SELECTOR).map_err(|e| EngineError::Other(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            thread_pattern,
            magnet_pattern,
            anchor_selector,
            content_selector,
        })
    }

    /// 提取帖子链接并规范化为 `{base}/thread-N-1-1.html`
    ///
    /// 支持 `thread-N-x-y.html`、`thread-N.html`、`thread.php?tid=N`
    /// 与 `forum.php?mod=viewthread&tid=N`，按首次出现顺序去重
    pub fn extract_thread_urls(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(captures) = self.thread_pattern.captures(href) else {
                continue;
            };
            let Some(thread_id) = captures.get(1).or_else(|| captures.get(2)) else {
                continue;
            };

            let thread_id = thread_id.as_str();
            if seen.insert(thread_id.to_string()) {
                urls.push(format!("{}/thread-{}-1-1.html", self.base_url, thread_id));
            }
        }

        urls
    }

    /// 提取帖子页中的磁力链接（未去重）
    pub fn extract_magnet_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for element in document.select(&self.content_selector) {
            let text: String = element.text().collect();
            links.extend(
                self.magnet_pattern
                    .find_iter(&text)
                    .map(|m| m.as_str().to_string()),
            );
        }

        for anchor in document.select(&self.anchor_selector) {
            if let Some(href) = anchor.value().attr("href") {
                if href.starts_with("magnet:") {
                    links.push(href.to_string());
                }
            }
        }

        links
    }
}
