// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::DomainError;
use crate::domain::models::theme::ThemeCatalog;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 最大允许页码
pub const MAX_PAGE: i32 = 100;

/// 爬取模式
///
/// 线上格式为 `"1"`（普通）和 `"2"`（热门），同时接受 `"normal"`/`"hot"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlMode {
    /// 按页码遍历列表页
    #[default]
    Normal,
    /// 抓取主题的热门排序列表
    Hot,
}

impl CrawlMode {
    pub fn as_wire(&self) -> &'static str {
        match self {
            CrawlMode::Normal => "1",
            CrawlMode::Hot => "2",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for CrawlMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "normal" => Ok(CrawlMode::Normal),
            "2" | "hot" => Ok(CrawlMode::Hot),
            other => Err(DomainError::ValidationError(format!(
                "unknown crawl mode: {}",
                other
            ))),
        }
    }
}

impl Serialize for CrawlMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for CrawlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
            Raw::Number(n) => n.to_string().parse().map_err(de::Error::custom),
        }
    }
}

/// 爬取目标：主题 + 模式 + 页码区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub theme_id: String,
    pub mode: CrawlMode,
    pub start_page: i32,
    pub end_page: i32,
}

impl CrawlTarget {
    /// 根据原始输入构造目标并校验
    ///
    /// 热门模式下页码被忽略，缺省为 1
    ///
    /// # 参数
    ///
    /// * `catalog` - 主题目录
    /// * `theme_id` - 主题ID
    /// * `mode` - 爬取模式
    /// * `start_page` / `end_page` - 可选页码
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlTarget)` - 合法目标
    /// * `Err(DomainError::ValidationError)` - 目标不合法
    pub fn build(
        catalog: &ThemeCatalog,
        theme_id: &str,
        mode: CrawlMode,
        start_page: Option<i32>,
        end_page: Option<i32>,
    ) -> Result<Self, DomainError> {
        let (start_page, end_page) = match mode {
            CrawlMode::Hot => (start_page.unwrap_or(1), end_page.unwrap_or(1)),
            CrawlMode::Normal => {
                let start = start_page.unwrap_or(1);
                (start, end_page.unwrap_or(start))
            }
        };

        let target = Self {
            theme_id: theme_id.trim().to_string(),
            mode,
            start_page,
            end_page,
        };
        target.validate(catalog)?;
        Ok(target)
    }

    /// 校验主题存在、热门支持与普通模式的页码区间
    pub fn validate(&self, catalog: &ThemeCatalog) -> Result<(), DomainError> {
        let theme = catalog.get(&self.theme_id).ok_or_else(|| {
            DomainError::ValidationError(format!("unknown theme: {}", self.theme_id))
        })?;

        if self.mode == CrawlMode::Hot && !theme.supports_hot {
            return Err(DomainError::ValidationError(format!(
                "theme {} does not support hot mode",
                theme.id
            )));
        }

        // 热门模式只抓一页列表，页码不参与校验
        if self.mode == CrawlMode::Normal
            && (self.start_page < 1 || self.end_page > MAX_PAGE || self.start_page > self.end_page)
        {
            return Err(DomainError::ValidationError(format!(
                "page range must satisfy 1 <= start_page <= end_page <= {}, got {}-{}",
                MAX_PAGE, self.start_page, self.end_page
            )));
        }

        Ok(())
    }

    /// 本目标需要抓取的列表页数量
    pub fn listing_pages(&self) -> i32 {
        match self.mode {
            CrawlMode::Hot => 1,
            CrawlMode::Normal => self.end_page - self.start_page + 1,
        }
    }
}
